//! Text Extraction — turns one resume artifact into plain text plus a best-effort contact email.
//!
//! `TextExtractor` is the seam: the orchestrator only depends on the trait, so tests swap in
//! stubs and the format parsers stay behind `DocumentExtractor`.
//! Format parsing is CPU-bound and runs inside `tokio::task::spawn_blocking`.

pub mod artifact;
pub mod docx;
pub mod email;
pub mod handlers;
pub mod pdf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub use artifact::{DocumentFormat, ResumeArtifact};

use crate::ranking::models::ErrorKind;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type '{0}' (only .pdf and .docx are accepted)")]
    UnsupportedFormat(String),

    #[error("corrupt document: {0}")]
    CorruptDocument(String),

    #[error("document contains no extractable text")]
    EmptyContent,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            ExtractionError::CorruptDocument(_) => ErrorKind::CorruptDocument,
            ExtractionError::EmptyContent => ErrorKind::EmptyContent,
        }
    }
}

/// Plain-text view of one resume, owned by a single ranking pass.
#[derive(Debug, Clone)]
pub struct ExtractedResume {
    pub text: String,
    pub candidate_email: Option<String>,
    pub source_filename: String,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, artifact: &ResumeArtifact) -> Result<ExtractedResume, ExtractionError>;
}

/// Default extractor: PDF via `pdf-extract`, DOCX via the OOXML document part.
pub struct DocumentExtractor;

#[async_trait]
impl TextExtractor for DocumentExtractor {
    async fn extract(&self, artifact: &ResumeArtifact) -> Result<ExtractedResume, ExtractionError> {
        let filename = artifact.original_filename();
        let format = artifact
            .declared_format()
            .ok_or_else(|| ExtractionError::UnsupportedFormat(filename.to_string()))?;

        let bytes = artifact
            .read_bytes()
            .await
            .map_err(|e| ExtractionError::CorruptDocument(format!("unreadable upload: {e}")))?;

        // Parser panics on malformed input surface as a JoinError here.
        let raw = tokio::task::spawn_blocking(move || match format {
            DocumentFormat::Pdf => pdf::extract_text(&bytes),
            DocumentFormat::Docx => docx::extract_text(&bytes),
        })
        .await
        .map_err(|e| ExtractionError::CorruptDocument(format!("{format} parser aborted: {e}")))??;

        let extracted = into_extracted(&raw, filename)?;
        debug!(
            "Extracted {} chars from {} ({format}), email found: {}",
            extracted.text.len(),
            filename,
            extracted.candidate_email.is_some()
        );
        Ok(extracted)
    }
}

/// Trims raw parser output and locates the candidate email.
pub fn into_extracted(raw: &str, source_filename: &str) -> Result<ExtractedResume, ExtractionError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyContent);
    }
    Ok(ExtractedResume {
        candidate_email: email::find_email(text),
        text: text.to_string(),
        source_filename: source_filename.to_string(),
    })
}
