pub mod health;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers::handle_analyze;
use crate::extraction::handlers::handle_extract;
use crate::ranking::handlers::handle_rank;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/rank", post(handle_rank))
        .route("/api/v1/resumes/analyze", post(handle_analyze))
        .route("/api/v1/resumes/extract", post(handle_extract))
        .layer(upload_limit)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::analysis::{ResumeAnalysis, ResumeAnalyzer, SectionScores};
    use crate::config::{Config, ScorerBackend};
    use crate::extraction::DocumentExtractor;
    use crate::ranking::heuristics::KeywordCriterionScorer;
    use crate::ranking::orchestrator::{RankingOrchestrator, ScoringPolicy};
    use crate::ranking::scoring::ScoringError;

    const BOUNDARY: &str = "ranker-test-boundary";

    struct FixedAnalyzer;

    #[async_trait]
    impl ResumeAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _resume_text: &str) -> Result<ResumeAnalysis, ScoringError> {
            Ok(ResumeAnalysis {
                candidate_name: Some("Jane Doe".to_string()),
                scores: SectionScores {
                    content_quality: 70.0,
                    resume_structure: 80.0,
                    ats_essentials: 60.0,
                    overall_score: 72.0,
                },
                subpoints: Default::default(),
                suggestions: Default::default(),
            })
        }
    }

    fn test_state() -> AppState {
        let config = Config {
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            scorer_backend: ScorerBackend::Keyword,
            scoring_max_concurrency: 2,
            scoring_timeout_secs: 5,
            scoring_retries: 0,
            scoring_retry_backoff_ms: 10,
            max_upload_bytes: 1024 * 1024,
        };
        let extractor = Arc::new(DocumentExtractor);
        AppState {
            orchestrator: RankingOrchestrator::new(
                extractor.clone(),
                Arc::new(KeywordCriterionScorer),
                ScoringPolicy::default(),
            ),
            extractor,
            analyzer: Arc::new(FixedAnalyzer),
            config,
        }
    }

    fn docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
            .collect();
        let xml = format!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", zip::write::FileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn multipart_request(
        uri: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, Vec<u8>)],
    ) -> Request<Body> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, filename, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn jane_docx() -> Vec<u8> {
        docx(&[
            "Jane Doe",
            "jane@example.com",
            "Experience",
            "6 years building Rust services",
        ])
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "ranker-api");
    }

    #[tokio::test]
    async fn test_rank_reports_partial_failure_with_200() {
        let request = multipart_request(
            "/api/v1/resumes/rank",
            &[
                ("jd_text", "Rust backend engineer"),
                ("tech_skills", "Rust, Kafka"),
                ("weight_skills", "0.6"),
                ("weight_experience", "0.4"),
            ],
            &[
                ("resumes", "notes.txt", b"plain text".to_vec()),
                ("resumes", "jane.docx", jane_docx()),
            ],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);

        let ranked = body["ranked_results"].as_array().unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0]["source_filename"], "jane.docx");
        assert_eq!(ranked[0]["candidate_email"], "jane@example.com");
        assert_eq!(ranked[0]["submission_index"], 1);
        assert!(ranked[0]["final_score"].is_number());

        let failed = body["failed_results"].as_array().unwrap();
        assert_eq!(failed[0]["source_filename"], "notes.txt");
        assert_eq!(failed[0]["error"]["kind"], "UNSUPPORTED_FORMAT");
        assert!(failed[0]["final_score"].is_null());

        assert_eq!(body["summary"]["submitted"], 2);
        assert_eq!(body["summary"]["failed"], 1);
        assert_eq!(body["applied_technical_keywords"][1], "kafka");
        assert_eq!(body["scorer_backend"], "keyword");
    }

    #[tokio::test]
    async fn test_rank_without_job_description_is_400() {
        let request = multipart_request(
            "/api/v1/resumes/rank",
            &[("tech_skills", "rust")],
            &[("resumes", "jane.docx", jane_docx())],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_rank_with_bad_weight_is_400() {
        let request = multipart_request(
            "/api/v1/resumes/rank",
            &[("jd_text", "Rust engineer"), ("weight_projects", "lots")],
            &[("resumes", "jane.docx", jane_docx())],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("weight_projects"));
    }

    #[tokio::test]
    async fn test_rank_with_overflowing_weight_is_400() {
        let request = multipart_request(
            "/api/v1/resumes/rank",
            &[("jd_text", "Rust engineer"), ("weight_skills", "1e308")],
            &[("resumes", "jane.docx", jane_docx())],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_extract_returns_text() {
        let request = multipart_request(
            "/api/v1/resumes/extract",
            &[],
            &[("resume", "jane.docx", jane_docx())],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["text"].as_str().unwrap().starts_with("Jane Doe\n"));
        assert_eq!(body["candidate_email"], "jane@example.com");
        assert!(body["character_count"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_extract_unsupported_format_is_415() {
        let request = multipart_request(
            "/api/v1/resumes/extract",
            &[],
            &[("resume", "resume.odt", b"odt".to_vec())],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_extract_without_file_is_400() {
        let request = multipart_request("/api/v1/resumes/extract", &[("note", "hi")], &[]);
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_returns_review() {
        let request = multipart_request(
            "/api/v1/resumes/analyze",
            &[],
            &[("resume", "jane.docx", jane_docx())],
        );
        let (status, body) = send(request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source_filename"], "jane.docx");
        assert_eq!(body["candidate_email"], "jane@example.com");
        assert_eq!(body["analysis"]["scores"]["overall_score"], 72.0);
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let request = multipart_request(
            "/api/v1/resumes/extract",
            &[],
            &[("resume", "huge.pdf", vec![b'x'; 2 * 1024 * 1024])],
        );
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
