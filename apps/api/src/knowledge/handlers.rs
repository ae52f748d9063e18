use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::documents::{extract_in_background, extract_upload, fetch_document, read_uploads};
use crate::errors::AppError;
use crate::knowledge::SlotId;
use crate::state::AppState;

/// Maximum number of documents combined into one slot.
const MAX_FILES_PER_SLOT: usize = 3;

#[derive(Debug, Deserialize)]
pub struct LoadUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SlotLoadedResponse {
    pub slot: u8,
    pub source_label: String,
    pub chars: usize,
    pub files: usize,
}

/// POST /api/v1/sessions/:id/knowledge/:slot/upload
///
/// Every file must extract before the slot is touched.
pub async fn handle_upload_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, u8)>,
    multipart: Multipart,
) -> Result<Json<SlotLoadedResponse>, AppError> {
    let slot = SlotId::from_number(slot)?;
    let session = state.sessions.get(id).await?;

    let uploads = read_uploads(multipart).await?;
    if uploads.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }
    if uploads.len() > MAX_FILES_PER_SLOT {
        return Err(AppError::Validation(format!(
            "At most {MAX_FILES_PER_SLOT} files can be loaded into one knowledge base slot"
        )));
    }

    let mut texts = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        texts.push(extract_upload(upload).await?);
    }

    let source_label = uploads
        .iter()
        .map(|u| u.file_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let text = texts.join("\n\n");
    let chars = text.chars().count();

    session.lock().await.knowledge.load(slot, &source_label, text);
    info!(
        "Session {id}: KB {} loaded from {} file(s) ({chars} chars)",
        slot.number(),
        uploads.len()
    );

    Ok(Json(SlotLoadedResponse {
        slot: slot.number(),
        source_label,
        chars,
        files: uploads.len(),
    }))
}

/// POST /api/v1/sessions/:id/knowledge/:slot/url
pub async fn handle_load_slot_url(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, u8)>,
    Json(req): Json<LoadUrlRequest>,
) -> Result<Json<SlotLoadedResponse>, AppError> {
    let slot = SlotId::from_number(slot)?;
    let session = state.sessions.get(id).await?;

    let document = fetch_document(&state.http, &req.url).await?;
    let text = extract_in_background(document.bytes, document.kind).await?;
    let chars = text.chars().count();

    session
        .lock()
        .await
        .knowledge
        .load(slot, &document.label, text);
    info!(
        "Session {id}: KB {} loaded from {} ({chars} chars)",
        slot.number(),
        document.label
    );

    Ok(Json(SlotLoadedResponse {
        slot: slot.number(),
        source_label: document.label,
        chars,
        files: 1,
    }))
}

/// DELETE /api/v1/sessions/:id/knowledge/:slot
pub async fn handle_clear_slot(
    State(state): State<AppState>,
    Path((id, slot)): Path<(Uuid, u8)>,
) -> Result<StatusCode, AppError> {
    let slot = SlotId::from_number(slot)?;
    let session = state.sessions.get(id).await?;
    session.lock().await.knowledge.clear(slot);
    info!("Session {id}: KB {} cleared", slot.number());
    Ok(StatusCode::NO_CONTENT)
}
