use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// `OPENAI_API_KEY` is the only credential and it is optional: without it the
/// service starts in a degraded mode where every language-model feature
/// reports `API_KEY_MISSING` instead of failing at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub port: u16,
    pub rust_log: String,
    pub audio_cache_dir: PathBuf,
    pub max_recording_bytes: usize,
    pub event_concurrency: usize,
    pub http_timeout_secs: u64,
    /// Sessions not touched for this long are ended and their audio deleted.
    pub session_idle_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            port: parse_env("PORT", 8080).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            audio_cache_dir: optional_env("AUDIO_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cache")),
            max_recording_bytes: parse_env("MAX_RECORDING_BYTES", 10 * 1024 * 1024)
                .context("MAX_RECORDING_BYTES must be a byte count")?,
            event_concurrency: parse_env("EVENT_CONCURRENCY", 4_usize)
                .context("EVENT_CONCURRENCY must be a positive integer")?
                .max(1),
            http_timeout_secs: parse_env("HTTP_TIMEOUT_SECS", 120)
                .context("HTTP_TIMEOUT_SECS must be a number of seconds")?,
            session_idle_ttl_secs: parse_env("SESSION_IDLE_TTL_SECS", 4 * 60 * 60_u64)
                .context("SESSION_IDLE_TTL_SECS must be a number of seconds")?
                .max(60),
        })
    }

    pub fn api_key_loaded(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

/// Reads a variable, treating unset and blank values the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration used by handler tests: no network defaults, small limits.
    pub fn for_tests(audio_cache_dir: PathBuf) -> Self {
        Config {
            openai_api_key: Some("test-key".to_string()),
            openai_base_url: "http://127.0.0.1:9".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            audio_cache_dir,
            max_recording_bytes: 1024,
            event_concurrency: 2,
            http_timeout_secs: 5,
            session_idle_ttl_secs: 3600,
        }
    }
}
