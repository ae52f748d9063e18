use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::{CHAT_MODEL, SPEECH_MODEL, SPEECH_VOICE, TRANSCRIPTION_MODEL};
use crate::models::career::CareerGoal;
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "hr-assistant-api"
    }))
}

/// GET /api/v1/status
/// Reports whether language-model features are available, and the fixed option sets.
pub async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    let api_key_loaded = state.config.api_key_loaded();
    let warning = (!api_key_loaded).then_some(
        "Please set the OPENAI_API_KEY environment variable. Chat and voice features are disabled.",
    );

    Json(json!({
        "api_key_loaded": api_key_loaded,
        "warning": warning,
        "models": {
            "chat": CHAT_MODEL,
            "transcription": TRANSCRIPTION_MODEL,
            "speech": SPEECH_MODEL,
            "voice": SPEECH_VOICE
        },
        "career_goals": CareerGoal::ALL
    }))
}
