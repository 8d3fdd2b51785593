//! Axum route handlers for single-file text extraction.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::extraction::{ExtractedResume, ExtractionError};
use crate::routes::upload::read_upload_form;
use crate::state::AppState;

/// Multipart field carrying the single resume file.
pub const RESUME_FILE_FIELD: &str = "resume";

#[derive(Debug, Serialize)]
pub struct ExtractTextResponse {
    pub source_filename: String,
    pub candidate_email: Option<String>,
    pub character_count: usize,
    pub text: String,
}

/// POST /api/v1/resumes/extract
pub async fn handle_extract(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractTextResponse>, AppError> {
    let extracted = extract_single_upload(&state, multipart).await?;
    Ok(Json(ExtractTextResponse {
        source_filename: extracted.source_filename,
        candidate_email: extracted.candidate_email,
        character_count: extracted.text.chars().count(),
        text: extracted.text,
    }))
}

/// Reads the `resume` part, extracts it and releases the upload. Unlike a ranking batch, a
/// single-file failure fails the request.
pub async fn extract_single_upload(
    state: &AppState,
    multipart: Multipart,
) -> Result<ExtractedResume, AppError> {
    let form = read_upload_form(multipart, RESUME_FILE_FIELD).await?;
    let artifact = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Validation("a resume file is required".to_string()))?;

    if !artifact.is_supported() {
        return Err(ExtractionError::UnsupportedFormat(artifact.original_filename().to_string()).into());
    }

    let result = state.extractor.extract(&artifact).await;
    let filename = artifact.original_filename().to_string();
    if let Err(e) = artifact.release() {
        warn!("Failed to release artifact {filename}: {e}");
    }
    Ok(result?)
}
