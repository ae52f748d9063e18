use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::ExtractionError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every variant is recoverable: handlers convert failures at the call site and
/// leave session state exactly as it was before the request.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Recording error: {0}")]
    Recording(String),

    #[error("Invalid chat history format: {0}")]
    ImportFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("OPENAI_API_KEY is not configured")]
    ApiKeyMissing,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Http(_) => AppError::Network(format!("Error: {e}")),
            other => AppError::Api(format!("Error: {other}")),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::Extraction(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Extraction(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EXTRACTION_ERROR",
                msg.clone(),
            ),
            AppError::Network(msg) => {
                tracing::warn!("Network error: {msg}");
                (StatusCode::BAD_GATEWAY, "NETWORK_ERROR", msg.clone())
            }
            AppError::Api(msg) => {
                tracing::error!("LLM API error: {msg}");
                (StatusCode::BAD_GATEWAY, "API_ERROR", msg.clone())
            }
            AppError::Recording(msg) => (StatusCode::BAD_REQUEST, "RECORDING_ERROR", msg.clone()),
            AppError::ImportFormat(msg) => (
                StatusCode::BAD_REQUEST,
                "IMPORT_FORMAT_ERROR",
                format!("Invalid JSON format: {msg}"),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::ApiKeyMissing => (
                StatusCode::SERVICE_UNAVAILABLE,
                "API_KEY_MISSING",
                "Please set the OPENAI_API_KEY environment variable.".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
