use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::LanguageModel;
use crate::session::Session;

/// Transient audio artifacts, one directory per session.
///
/// Artifacts follow create → use once → delete on replacement. Cleanup is best
/// effort; files can leak if the process dies mid-interaction.
#[derive(Debug, Clone)]
pub struct AudioCache {
    root: PathBuf,
}

impl AudioCache {
    pub async fn new(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn session_dir(&self, session: Uuid) -> PathBuf {
        self.root.join(session.to_string())
    }

    /// Writes a new artifact named `<prefix>_<timestamp>_<suffix>.<extension>`.
    pub async fn store(
        &self,
        session: Uuid,
        prefix: &str,
        extension: &str,
        bytes: &[u8],
    ) -> std::io::Result<PathBuf> {
        let dir = self.session_dir(session);
        tokio::fs::create_dir_all(&dir).await?;

        let unique = Uuid::new_v4().simple().to_string();
        let name = format!(
            "{prefix}_{}_{}.{extension}",
            Utc::now().format("%Y%m%d%H%M%S%3f"),
            &unique[..8]
        );
        let path = dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        debug!("Stored audio artifact {}", path.display());
        Ok(path)
    }

    pub async fn discard(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!("Error removing audio artifact {}: {e}", path.display());
        }
    }

    /// Deletes every artifact of the session except `keep`. Returns how many were removed.
    pub async fn cleanup_except(&self, session: Uuid, keep: &Path) -> usize {
        let mut entries = match tokio::fs::read_dir(self.session_dir(session)).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error cleaning audio cache: {e}");
                return 0;
            }
        };

        let mut removed = 0;
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Error cleaning audio cache: {e}");
                    break;
                }
            };
            let path = entry.path();
            if path == keep {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("Error removing audio artifact {}: {e}", path.display()),
            }
        }
        removed
    }

    pub async fn remove_session(&self, session: Uuid) {
        let dir = self.session_dir(session);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => debug!("Removed audio cache for session {session}"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("Error removing audio cache {}: {e}", dir.display()),
        }
    }
}

/// Synthesizes `reply` and makes it the session's playback artifact.
///
/// The previous artifact is only deleted once the new one is written.
pub async fn synthesize_reply(
    llm: &dyn LanguageModel,
    cache: &AudioCache,
    session: &mut Session,
    reply: &str,
) -> Result<PathBuf, AppError> {
    let audio = llm.synthesize(reply).await?;
    let path = cache
        .store(session.id, "response", "mp3", &audio)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to store synthesized audio: {e}")))?;

    let removed = cache.cleanup_except(session.id, &path).await;
    info!(
        "Session {}: playback replaced ({removed} stale artifact(s) removed)",
        session.id
    );
    session.playback = Some(path.clone());
    Ok(path)
}
