mod career;
mod chat;
mod config;
mod documents;
mod errors;
mod events;
mod knowledge;
mod llm_client;
mod models;
mod routes;
mod session;
mod state;
mod voice;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LanguageModel, OpenAiClient};
use crate::routes::build_router;
use crate::session::store::spawn_idle_sweeper;
use crate::session::SessionStore;
use crate::state::AppState;
use crate::voice::AudioCache;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HR Assistant API v{}", env!("CARGO_PKG_VERSION"));

    let timeout = Duration::from_secs(config.http_timeout_secs);

    // Without a key the service still starts; model-backed routes answer 503.
    let llm: Option<Arc<dyn LanguageModel>> = match &config.openai_api_key {
        Some(key) => {
            let client = OpenAiClient::new(key.clone(), &config.openai_base_url, timeout)?;
            info!("LLM client initialized (model: {})", llm_client::CHAT_MODEL);
            Some(Arc::new(client))
        }
        None => {
            warn!("OPENAI_API_KEY is not set: chat, voice and career features are disabled");
            None
        }
    };

    let http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let audio = AudioCache::new(&config.audio_cache_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create audio cache at {}",
                config.audio_cache_dir.display()
            )
        })?;
    info!("Audio cache at {}", config.audio_cache_dir.display());

    let sessions = SessionStore::default();
    spawn_idle_sweeper(
        sessions.clone(),
        audio.clone(),
        Duration::from_secs(config.session_idle_ttl_secs),
    );
    info!(
        "Idle sessions expire after {}s",
        config.session_idle_ttl_secs
    );

    let state = AppState {
        llm,
        http,
        sessions,
        audio,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
