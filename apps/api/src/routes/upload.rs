//! Multipart ingestion shared by the upload endpoints.
//!
//! Text parts become form fields; parts named `file_field` are spooled into `ResumeArtifact`s
//! in the order they arrive, which is the submission order.

use std::collections::HashMap;

use anyhow::Context;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use tracing::debug;

use crate::errors::AppError;
use crate::extraction::ResumeArtifact;

#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub files: Vec<ResumeArtifact>,
}

impl UploadForm {
    /// Trimmed value of a text field; blank values read as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }
}

pub async fn read_upload_form(
    mut multipart: Multipart,
    file_field: &str,
) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            // Browsers send an empty, unnamed part when no file was picked.
            if filename.is_empty() && bytes.is_empty() {
                continue;
            }
            debug!("Received upload {filename} ({} bytes)", bytes.len());
            let artifact = ResumeArtifact::spool(filename, bytes)
                .await
                .context("failed to spool uploaded resume")?;
            form.files.push(artifact);
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("malformed multipart body: {}", e.body_text()))
    }
}
