use std::sync::Arc;

use reqwest::Client;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::session::SessionStore;
use crate::voice::AudioCache;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API key is configured: the service runs in degraded mode.
    pub llm: Option<Arc<dyn LanguageModel>>,
    /// Plain HTTP client for knowledge-base document downloads.
    pub http: Client,
    pub sessions: SessionStore,
    pub audio: AudioCache,
    pub config: Config,
}

impl AppState {
    pub fn llm(&self) -> Result<&dyn LanguageModel, AppError> {
        self.llm.as_deref().ok_or(AppError::ApiKeyMissing)
    }

    /// Owned handle for work that must outlive the request.
    pub fn shared_llm(&self) -> Result<Arc<dyn LanguageModel>, AppError> {
        self.llm.clone().ok_or(AppError::ApiKeyMissing)
    }
}
