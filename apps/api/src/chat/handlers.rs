use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::chat::chat_turn;
use crate::chat::transcript::{export_file_name, export_history, parse_history};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub history_len: usize,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
}

/// POST /api/v1/sessions/:id/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let llm = state.llm()?;
    let session = state.sessions.get(id).await?;
    // Held across the call: one turn at a time keeps the log alternating.
    let mut session = session.lock().await;

    let reply = chat_turn(llm, &mut session, &req.message).await?;

    Ok(Json(ChatResponse {
        reply,
        history_len: session.history.len(),
    }))
}

/// GET /api/v1/sessions/:id/history/export
pub async fn handle_export_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(id).await?;
    let payload = export_history(&session.lock().await.history)?;
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(Utc::now()));

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        payload,
    ))
}

/// POST /api/v1/sessions/:id/history/import
///
/// The body is the raw exported JSON. A malformed body leaves the log as it was.
pub async fn handle_import_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ImportResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let history = parse_history(&body)?;
    let imported = history.len();

    session.lock().await.history = history;
    info!("Session {id}: imported {imported} history entries");

    Ok(Json(ImportResponse { imported }))
}

/// DELETE /api/v1/sessions/:id/history
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state.sessions.get(id).await?;
    session.lock().await.history.clear();
    info!("Session {id}: chat cleared");
    Ok(StatusCode::NO_CONTENT)
}
