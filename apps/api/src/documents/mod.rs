//! Document ingestion: uploads, URL downloads and plain-text extraction.

pub mod extract;
pub mod fetch;
pub mod upload;

use bytes::Bytes;

pub use extract::{extract_text, DocumentKind, ExtractionError};
pub use fetch::fetch_document;
pub use upload::{read_uploads, UploadedDocument};

use crate::errors::AppError;

/// Runs extraction on the blocking pool; PDF parsing is CPU-bound.
pub async fn extract_in_background(bytes: Bytes, kind: DocumentKind) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Extraction task failed: {e}")))??;
    Ok(text)
}

/// Detects the kind of an uploaded file and extracts its text.
pub async fn extract_upload(upload: &UploadedDocument) -> Result<String, AppError> {
    let kind = upload.kind()?;
    extract_in_background(upload.bytes.clone(), kind).await
}
