//! Text extraction for uploaded and downloaded documents.
//!
//! PDFs go through `pdf-extract` first and fall back to page-by-page `lopdf`
//! extraction when the primary extractor errors, panics or yields nothing.
//! Text order is whatever the extractor produces; there is no OCR and no
//! layout reconstruction.

use std::panic;

use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
}

impl DocumentKind {
    /// Resolves the kind from the declared media type, then the file extension.
    pub fn detect(content_type: Option<&str>, file_name: Option<&str>) -> Result<Self, ExtractionError> {
        let media_type = content_type
            .and_then(|c| c.split(';').next())
            .map(|c| c.trim().to_ascii_lowercase());

        match media_type.as_deref() {
            Some("application/pdf") => return Ok(DocumentKind::Pdf),
            Some("text/plain") | Some("text/markdown") => return Ok(DocumentKind::PlainText),
            _ => {}
        }

        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("txt") | Some("md") => Ok(DocumentKind::PlainText),
            _ => Err(ExtractionError::Unsupported(
                content_type.or(file_name).unwrap_or("unknown").to_string(),
            )),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document type: {0} (expected PDF or plain text)")]
    Unsupported(String),

    #[error("Error extracting text from PDF: {0}")]
    Malformed(String),

    #[error("Document is not valid UTF-8 text")]
    Encoding,

    #[error("No text could be extracted from the document")]
    Empty,
}

/// Extracts plain text. Never returns blank text: that is `ExtractionError::Empty`.
pub fn extract_text(bytes: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    let text = match kind {
        DocumentKind::PlainText => std::str::from_utf8(bytes)
            .map_err(|_| ExtractionError::Encoding)?
            .to_string(),
        DocumentKind::Pdf => extract_pdf(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    match primary_pdf_text(bytes) {
        Ok(text) if !text.trim().is_empty() => return Ok(text),
        Ok(_) => debug!("pdf-extract produced no text, trying lopdf"),
        Err(reason) => warn!("Primary PDF extraction failed ({reason}), trying lopdf"),
    }

    fallback_pdf_text(bytes).map_err(ExtractionError::Malformed)
}

fn primary_pdf_text(bytes: &[u8]) -> Result<String, String> {
    // pdf-extract panics on some malformed inputs
    match panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(format!("{e:?}")),
        Err(_) => Err("extractor panicked".to_string()),
    }
}

fn fallback_pdf_text(bytes: &[u8]) -> Result<String, String> {
    let document = lopdf::Document::load_mem(bytes).map_err(|e| e.to_string())?;
    let pages: Vec<String> = document
        .get_pages()
        .keys()
        .map(|page| document.extract_text(&[*page]).unwrap_or_default())
        .collect();
    Ok(pages.join("\n"))
}
