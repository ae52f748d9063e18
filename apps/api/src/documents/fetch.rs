use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::{info, warn};

use crate::documents::DocumentKind;
use crate::errors::AppError;

/// A document downloaded from a user-supplied URL.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// Last path segment of the URL, shown as the knowledge-base source.
    pub label: String,
    pub kind: DocumentKind,
    pub bytes: Bytes,
}

/// Downloads a document with a single GET. Any non-success status is a `Network` error.
pub async fn fetch_document(client: &Client, url: &str) -> Result<FetchedDocument, AppError> {
    let url = Url::parse(url.trim())
        .map_err(|e| AppError::Validation(format!("Invalid URL '{url}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "Unsupported URL scheme '{}': only http and https are allowed",
            url.scheme()
        )));
    }

    info!("Downloading document from {url}");
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AppError::Network(format!("Error downloading PDF: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        warn!("Document download from {url} returned {status}");
        return Err(AppError::Network(format!(
            "Failed to fetch PDF (status {})",
            status.as_u16()
        )));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let label = source_label(&url);
    // Generic media types defer to the URL's extension; anything unrecognised is read as PDF.
    let kind = DocumentKind::detect(content_type.as_deref(), Some(&label))
        .unwrap_or(DocumentKind::Pdf);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::Network(format!("Error downloading PDF: {e}")))?;

    Ok(FetchedDocument { label, kind, bytes })
}

fn source_label(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .or_else(|| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "document".to_string())
}
