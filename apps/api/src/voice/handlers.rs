use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::chat::chat_turn;
use crate::documents::{read_uploads, upload::take_field};
use crate::errors::AppError;
use crate::state::AppState;
use crate::voice::capture::{transcribe_clip, validate_clip};
use crate::voice::playback::synthesize_reply;

#[derive(Debug, Serialize)]
pub struct VoiceTurnResponse {
    pub transcript: String,
    pub reply: String,
    pub history_len: usize,
    pub audio_available: bool,
    /// Set when speech synthesis failed; the text reply still stands.
    pub audio_error: Option<String>,
}

/// POST /api/v1/sessions/:id/voice
///
/// Multipart field `audio`. Transcribe → chat turn → synthesize the reply.
pub async fn handle_voice_turn(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<VoiceTurnResponse>, AppError> {
    let llm = state.llm()?;
    let session = state.sessions.get(id).await?;

    let mut uploads = read_uploads(multipart).await?;
    let audio = take_field(&mut uploads, "audio")
        .ok_or_else(|| AppError::Recording("No audio recording received".to_string()))?;

    let mut session = session.lock().await;
    if !session.voice_mode {
        return Err(AppError::Validation(
            "Voice mode is disabled for this session".to_string(),
        ));
    }

    let clip = validate_clip(audio, state.config.max_recording_bytes)?;
    let transcript = transcribe_clip(llm, &state.audio, id, clip).await?;
    let reply = chat_turn(llm, &mut session, &transcript).await?;

    let audio_error = match synthesize_reply(llm, &state.audio, &mut session, &reply).await {
        Ok(_) => None,
        Err(e) => {
            warn!("Session {id}: TTS error: {e}");
            Some(format!("Couldn't generate speech: {e}"))
        }
    };

    Ok(Json(VoiceTurnResponse {
        transcript,
        reply,
        history_len: session.history.len(),
        audio_available: audio_error.is_none(),
        audio_error,
    }))
}

/// GET /api/v1/sessions/:id/voice/reply
pub async fn handle_get_playback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.get(id).await?;
    let path = session
        .lock()
        .await
        .playback
        .clone()
        .ok_or_else(|| AppError::NotFound("No synthesized reply available".to_string()))?;

    let audio = tokio::fs::read(&path).await.map_err(|e| {
        warn!("Playback artifact {} unreadable: {e}", path.display());
        AppError::NotFound("Synthesized reply is no longer available".to_string())
    })?;

    Ok(([(header::CONTENT_TYPE, "audio/mpeg")], audio))
}
