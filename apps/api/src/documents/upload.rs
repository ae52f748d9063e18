use axum::extract::Multipart;
use bytes::Bytes;

use crate::documents::{DocumentKind, ExtractionError};
use crate::errors::AppError;

/// One file part of a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub field: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedDocument {
    pub fn kind(&self) -> Result<DocumentKind, ExtractionError> {
        DocumentKind::detect(self.content_type.as_deref(), Some(&self.file_name))
    }
}

/// Drains every part of a multipart body, in order.
pub async fn read_uploads(mut multipart: Multipart) -> Result<Vec<UploadedDocument>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload '{file_name}': {e}")))?;

        uploads.push(UploadedDocument {
            field: name,
            file_name,
            content_type,
            bytes,
        });
    }

    Ok(uploads)
}

/// Removes and returns the first part submitted under `field`.
pub fn take_field(uploads: &mut Vec<UploadedDocument>, field: &str) -> Option<UploadedDocument> {
    let position = uploads.iter().position(|u| u.field == field)?;
    Some(uploads.remove(position))
}
