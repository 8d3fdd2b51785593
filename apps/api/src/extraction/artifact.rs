//! Uploaded resume artifacts and the storage that backs them.
//!
//! An artifact is created when a multipart upload is ingested and is consumed by exactly one
//! ranking (or analysis) pass. Accepted uploads are spooled to a named temp file; the file is
//! removed when the artifact is released or dropped, whichever comes first.

use std::fmt;
use std::io::{self, Write};
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

/// Document formats the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Derives the format from a filename extension (case-insensitive).
    /// Returns `None` for anything other than `.pdf` / `.docx`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = Path::new(filename)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(DocumentFormat::Pdf),
            "docx" => Some(DocumentFormat::Docx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
        })
    }
}

/// Where the artifact's bytes live.
#[derive(Debug)]
pub enum ArtifactSource {
    Memory(Bytes),
    Spooled(NamedTempFile),
}

#[derive(Debug)]
pub struct ResumeArtifact {
    original_filename: String,
    declared_format: Option<DocumentFormat>,
    source: ArtifactSource,
}

impl ResumeArtifact {
    /// Wraps bytes already held in memory. The format is taken from the filename.
    pub fn in_memory(original_filename: impl Into<String>, bytes: Bytes) -> Self {
        let original_filename = original_filename.into();
        Self {
            declared_format: DocumentFormat::from_filename(&original_filename),
            original_filename,
            source: ArtifactSource::Memory(bytes),
        }
    }

    /// Spools an uploaded file to a temp file.
    ///
    /// Uploads with an unsupported extension are rejected here: nothing is written to disk and
    /// the artifact carries no format, so ranking records `UNSUPPORTED_FORMAT` for it.
    pub async fn spool(original_filename: impl Into<String>, bytes: Bytes) -> io::Result<Self> {
        let original_filename = original_filename.into();
        let Some(format) = DocumentFormat::from_filename(&original_filename) else {
            return Ok(Self {
                original_filename,
                declared_format: None,
                source: ArtifactSource::Memory(Bytes::new()),
            });
        };

        let file = tokio::task::spawn_blocking(move || -> io::Result<NamedTempFile> {
            let mut file = tempfile::Builder::new()
                .prefix("resume-")
                .suffix(&format!(".{}", format.extension()))
                .tempfile()?;
            file.write_all(&bytes)?;
            file.flush()?;
            Ok(file)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

        Ok(Self {
            original_filename,
            declared_format: Some(format),
            source: ArtifactSource::Spooled(file),
        })
    }

    pub fn original_filename(&self) -> &str {
        &self.original_filename
    }

    pub fn declared_format(&self) -> Option<DocumentFormat> {
        self.declared_format
    }

    pub fn is_supported(&self) -> bool {
        self.declared_format.is_some()
    }

    /// Path of the backing temp file, if the artifact was spooled.
    pub fn spooled_path(&self) -> Option<&Path> {
        match &self.source {
            ArtifactSource::Spooled(file) => Some(file.path()),
            ArtifactSource::Memory(_) => None,
        }
    }

    pub async fn read_bytes(&self) -> io::Result<Bytes> {
        match &self.source {
            ArtifactSource::Memory(bytes) => Ok(bytes.clone()),
            ArtifactSource::Spooled(file) => tokio::fs::read(file.path()).await.map(Bytes::from),
        }
    }

    /// Consumes the artifact and deletes any backing temp file.
    pub fn release(self) -> io::Result<()> {
        match self.source {
            ArtifactSource::Memory(_) => Ok(()),
            ArtifactSource::Spooled(file) => file.close(),
        }
    }
}
