//! File text extraction. Turns an uploaded RFQ into plain text.
//!
//! Dispatch is by exact declared media type. Unsupported types are rejected
//! before the file is read.

use std::path::Path;

use thiserror::Error;

use crate::docx;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("I/O error reading upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("DOCX extraction failed: {0}")]
    Docx(String),

    #[error("Text file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    Docx,
    PlainText,
}

impl SourceFormat {
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "application/pdf" => Some(SourceFormat::Pdf),
            docx::MEDIA_TYPE => Some(SourceFormat::Docx),
            "text/plain" => Some(SourceFormat::PlainText),
            _ => None,
        }
    }
}

/// Reads the file at `path` and returns its text according to `media_type`.
pub async fn extract_text(path: &Path, media_type: &str) -> Result<String, ExtractError> {
    let format = SourceFormat::from_media_type(media_type)
        .ok_or_else(|| ExtractError::UnsupportedFileType(media_type.to_string()))?;

    let bytes = tokio::fs::read(path).await?;

    match format {
        SourceFormat::PlainText => Ok(String::from_utf8(bytes)?),
        SourceFormat::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
        })
        .await?,
        SourceFormat::Docx => tokio::task::spawn_blocking(move || {
            docx::extract_raw_text(&bytes).map_err(|e| ExtractError::Docx(format!("{e:#}")))
        })
        .await?,
    }
}
