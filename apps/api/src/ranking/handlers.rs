//! Axum route handlers for the Ranking API.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::errors::AppError;
use crate::ranking::models::{Criterion, CriterionWeights, RankingRequest, RankingResponse};
use crate::routes::upload::{read_upload_form, UploadForm};
use crate::state::AppState;

/// Multipart field carrying the resume files.
pub const RESUME_FILES_FIELD: &str = "resumes";

/// POST /api/v1/resumes/rank
///
/// Ranks every uploaded resume against the job description. Responds 200 whenever the request
/// itself is valid, even if some or all resumes failed; those are listed in `failed_results`.
pub async fn handle_rank(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<RankingResponse>, AppError> {
    let form = read_upload_form(multipart, RESUME_FILES_FIELD).await?;
    let request = ranking_request_from_form(form)?;
    let response = state.orchestrator.rank(request).await?;
    Ok(Json(response))
}

fn ranking_request_from_form(form: UploadForm) -> Result<RankingRequest, AppError> {
    let weights = CriterionWeights {
        skills: parse_weight(&form, Criterion::Skills)?,
        experience: parse_weight(&form, Criterion::Experience)?,
        education: parse_weight(&form, Criterion::Education)?,
        projects: parse_weight(&form, Criterion::Projects)?,
        achievements: parse_weight(&form, Criterion::Achievements)?,
    };
    let top_n = parse_top_n(form.text("top_n"))?;

    Ok(RankingRequest {
        job_description: form.text("jd_text").unwrap_or_default().to_string(),
        technical_keywords: normalize_keywords(form.text("tech_skills")),
        soft_skill_keywords: normalize_keywords(form.text("soft_skills")),
        weights,
        top_n,
        resumes: form.files,
    })
}

/// Splits a comma-separated list: trimmed, lowercased, empties dropped, order kept.
pub fn normalize_keywords(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Absent weights default to 0. Range checks happen in request validation.
fn parse_weight(form: &UploadForm, criterion: Criterion) -> Result<f64, AppError> {
    let field = format!("weight_{}", criterion.as_str());
    match form.text(&field) {
        None => Ok(0.0),
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| AppError::Validation(format!("{field} must be a number, got '{raw}'"))),
    }
}

fn parse_top_n(raw: Option<&str>) -> Result<Option<usize>, AppError> {
    raw.map(|raw| {
        raw.parse::<usize>().map_err(|_| {
            AppError::Validation(format!("top_n must be a positive integer, got '{raw}'"))
        })
    })
    .transpose()
}
