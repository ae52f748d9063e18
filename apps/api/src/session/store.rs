use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::Session;
use crate::voice::AudioCache;

/// A session is locked for the duration of one interaction.
pub type SharedSession = Arc<Mutex<Session>>;

/// How often the idle sweeper wakes up.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct SessionEntry {
    session: SharedSession,
    /// Milliseconds since the store's epoch at the last lookup.
    last_seen_ms: AtomicU64,
}

/// In-memory session registry. Nothing outlives the process.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    epoch: Instant,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self {
            sessions: Arc::default(),
            epoch: Instant::now(),
        }
    }
}

impl SessionStore {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(Session::new(id))),
            last_seen_ms: AtomicU64::new(self.now_ms()),
        };
        self.sessions.write().await.insert(id, entry);
        info!("Session {id} created");
        id
    }

    /// Looks a session up and marks it active.
    pub async fn get(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        entry.last_seen_ms.store(self.now_ms(), Ordering::Relaxed);
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid) -> Result<SharedSession, AppError> {
        let removed = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        info!("Session {id} ended");
        Ok(removed.session)
    }

    /// Drops sessions not looked up within `ttl`. Returns the removed ids.
    pub async fn sweep_idle(&self, ttl: Duration) -> Vec<Uuid> {
        let now = self.now_ms();
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);

        let mut sessions = self.sessions.write().await;
        let expired: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, entry)| {
                now.saturating_sub(entry.last_seen_ms.load(Ordering::Relaxed)) > ttl_ms
            })
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            sessions.remove(id);
            info!("Session {id} expired after inactivity");
        }
        expired
    }
}

/// Periodically ends idle sessions and deletes their audio artifacts.
pub fn spawn_idle_sweeper(sessions: SessionStore, audio: AudioCache, ttl: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL.min(ttl).max(Duration::from_millis(10)));
        loop {
            ticker.tick().await;
            for id in sessions.sweep_idle(ttl).await {
                audio.remove_session(id).await;
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_get_remove() {
        let store = SessionStore::default();
        let id = store.create().await;

        let session = store.get(id).await.unwrap();
        assert_eq!(session.lock().await.id, id);

        store.remove(id).await.unwrap();
        assert!(matches!(store.get(id).await, Err(AppError::NotFound(_))));
        assert!(matches!(store.remove(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sessions_are_independent() {
        let store = SessionStore::default();
        let a = store.create().await;
        let b = store.create().await;

        store.get(a).await.unwrap().lock().await.voice_mode = true;
        assert!(!store.get(b).await.unwrap().lock().await.voice_mode);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_only_idle_sessions() {
        let store = SessionStore::default();
        let idle = store.create().await;
        let active = store.create().await;
        let ttl = Duration::from_secs(600);

        tokio::time::advance(Duration::from_secs(400)).await;
        store.get(active).await.unwrap();
        assert!(store.sweep_idle(ttl).await.is_empty());

        tokio::time::advance(Duration::from_secs(300)).await;
        assert_eq!(store.sweep_idle(ttl).await, vec![idle]);
        assert!(matches!(store.get(idle).await, Err(AppError::NotFound(_))));
        assert!(store.get(active).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweeper_deletes_expired_audio() {
        let dir = tempfile::tempdir().unwrap();
        let audio = AudioCache::new(dir.path()).await.unwrap();
        let store = SessionStore::default();
        let id = store.create().await;
        let artifact = audio.store(id, "response", "mp3", b"x").await.unwrap();

        spawn_idle_sweeper(store.clone(), audio, Duration::from_millis(50));
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(store.get(id).await.is_err());
        assert!(!artifact.exists());
    }
}
