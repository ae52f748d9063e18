use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::UploadedDocument;
use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::voice::AudioCache;

const AUDIO_EXTENSIONS: &[&str] = &[
    "wav", "mp3", "mpeg", "mpga", "m4a", "mp4", "webm", "ogg", "flac",
];

/// A recorded question accepted for transcription.
#[derive(Debug, Clone)]
pub struct RecordedClip {
    pub extension: String,
    pub bytes: Bytes,
}

/// Checks a recorded upload: present, non-empty, within the size bound, and audio.
pub fn validate_clip(upload: UploadedDocument, max_bytes: usize) -> Result<RecordedClip, AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::Recording("No audio was captured".to_string()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::Recording(format!(
            "Recording is too long ({} bytes, limit {max_bytes})",
            upload.bytes.len()
        )));
    }

    let from_name = upload
        .file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()));
    let from_media_type = upload
        .content_type
        .as_deref()
        .and_then(|ct| ct.split(';').next())
        .and_then(|ct| ct.trim().strip_prefix("audio/"))
        .map(extension_for_subtype);

    let extension = from_name.or(from_media_type).ok_or_else(|| {
        AppError::Recording(format!(
            "Unsupported recording format: {}",
            upload.content_type.as_deref().unwrap_or(&upload.file_name)
        ))
    })?;

    Ok(RecordedClip {
        extension,
        bytes: upload.bytes,
    })
}

fn extension_for_subtype(subtype: &str) -> String {
    match subtype.to_ascii_lowercase().as_str() {
        "mpeg" | "mp3" => "mp3".to_string(),
        "webm" => "webm".to_string(),
        "ogg" => "ogg".to_string(),
        "mp4" | "x-m4a" | "m4a" => "m4a".to_string(),
        "flac" => "flac".to_string(),
        _ => "wav".to_string(),
    }
}

/// Transcribes a clip. The clip lives as an artifact only for the duration of the call.
pub async fn transcribe_clip(
    llm: &dyn LanguageModel,
    cache: &AudioCache,
    session: Uuid,
    clip: RecordedClip,
) -> Result<String, AppError> {
    let path = cache
        .store(session, "recording", &clip.extension, &clip.bytes)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store recording: {e}")))?;

    let file_name = format!("recording.{}", clip.extension);
    let result = llm.transcribe(clip.bytes, &file_name).await;
    cache.discard(&path).await;

    let text = result.map_err(|e| {
        warn!("Session {session}: transcription failed: {e}");
        AppError::from(e)
    })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Recording(
            "Couldn't transcribe your message".to_string(),
        ));
    }
    info!("Session {session}: transcribed {} chars", text.len());
    Ok(text.to_string())
}
