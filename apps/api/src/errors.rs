use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::ranking::models::ErrorKind;
use crate::ranking::orchestrator::RankingError;
use crate::ranking::scoring::ScoringError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Only request-level failures reach this type. Per-resume failures inside a ranking batch are
/// reported in the ranking response instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RankingError> for AppError {
    fn from(e: RankingError) -> Self {
        match e {
            RankingError::InvalidRequest(msg) => AppError::Validation(msg),
        }
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorKind::InvalidRequest.code(),
                msg.clone(),
            ),
            AppError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
            AppError::Extraction(e) => {
                let status = match e {
                    ExtractionError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    ExtractionError::CorruptDocument(_) | ExtractionError::EmptyContent => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                };
                (status, e.kind().code(), e.to_string())
            }
            AppError::Scoring(e) => {
                tracing::error!("Scoring error: {e}");
                let status = match e {
                    ScoringError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    ScoringError::Unavailable { .. } | ScoringError::InvalidResponse(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                (
                    status,
                    e.kind().code(),
                    "The scoring service could not evaluate this resume".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::Internal.code(),
                    "An internal server error occurred".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
