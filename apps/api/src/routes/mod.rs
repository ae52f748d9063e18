pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::career::handlers as career;
use crate::chat::handlers as chat;
use crate::events::handlers as events;
use crate::knowledge::handlers as knowledge;
use crate::session::handlers as session;
use crate::state::AppState;
use crate::voice::handlers as voice;

/// Upper bound for any request body: multi-file PDF uploads and recordings.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/status", get(health::status_handler))
        // Sessions
        .route("/api/v1/sessions", post(session::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(session::handle_get_session).delete(session::handle_end_session),
        )
        .route(
            "/api/v1/sessions/:id/settings",
            put(session::handle_update_settings),
        )
        // Chat and conversation log
        .route("/api/v1/sessions/:id/chat", post(chat::handle_chat))
        .route(
            "/api/v1/sessions/:id/history",
            delete(chat::handle_clear_history),
        )
        .route(
            "/api/v1/sessions/:id/history/export",
            get(chat::handle_export_history),
        )
        .route(
            "/api/v1/sessions/:id/history/import",
            post(chat::handle_import_history),
        )
        // Knowledge base
        .route(
            "/api/v1/sessions/:id/knowledge/:slot",
            delete(knowledge::handle_clear_slot),
        )
        .route(
            "/api/v1/sessions/:id/knowledge/:slot/upload",
            post(knowledge::handle_upload_slot),
        )
        .route(
            "/api/v1/sessions/:id/knowledge/:slot/url",
            post(knowledge::handle_load_slot_url),
        )
        // Voice
        .route("/api/v1/sessions/:id/voice", post(voice::handle_voice_turn))
        .route(
            "/api/v1/sessions/:id/voice/reply",
            get(voice::handle_get_playback),
        )
        // Career planning
        .route("/api/v1/sessions/:id/career/match", post(career::handle_match))
        .route("/api/v1/sessions/:id/career/goal", put(career::handle_set_goal))
        .route(
            "/api/v1/sessions/:id/career/resources",
            post(career::handle_upload_resources),
        )
        .route(
            "/api/v1/sessions/:id/career/plan",
            post(career::handle_growth_plan),
        )
        // Event recommendations
        .route("/api/v1/sessions/:id/events", post(events::handle_upload_events))
        .route(
            "/api/v1/sessions/:id/events/recommendations",
            post(events::handle_recommendations),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
