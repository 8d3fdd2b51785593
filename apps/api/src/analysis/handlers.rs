//! Axum route handlers for the single-resume review API.

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::analysis::SingleResumeAnalysis;
use crate::errors::AppError;
use crate::extraction::handlers::extract_single_upload;
use crate::state::AppState;

/// POST /api/v1/resumes/analyze
///
/// Extracts one resume and returns a section-by-section quality review. No job description,
/// no weights.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SingleResumeAnalysis>, AppError> {
    let extracted = extract_single_upload(&state, multipart).await?;
    let analysis = state.analyzer.analyze(&extracted.text).await?;

    Ok(Json(SingleResumeAnalysis {
        source_filename: extracted.source_filename,
        candidate_email: extracted.candidate_email,
        analysis,
    }))
}
