//! Per-user session state. Every workflow mutates one `Session` in place.

pub mod handlers;
pub mod store;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::career::CareerResource;
use crate::events::EventRecord;
use crate::knowledge::{KnowledgeBase, SlotSummary};
use crate::models::career::{CareerGoal, MatchAnalysisState};
use crate::models::conversation::ConversationEntry;

pub use store::{SessionStore, SharedSession};

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Append-only during a session; replaced wholesale on import.
    pub history: Vec<ConversationEntry>,
    pub knowledge: KnowledgeBase,
    pub voice_mode: bool,
    pub match_analysis: MatchAnalysisState,
    pub career_goal: Option<CareerGoal>,
    pub resources: Vec<CareerResource>,
    pub events: Option<Vec<EventRecord>>,
    /// Synthesized audio for the latest voice reply.
    pub playback: Option<PathBuf>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            history: Vec::new(),
            knowledge: KnowledgeBase::default(),
            voice_mode: false,
            match_analysis: MatchAnalysisState::NotStarted,
            career_goal: None,
            resources: Vec::new(),
            events: None,
            playback: None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            created_at: self.created_at,
            history: self.history.clone(),
            knowledge_base: self.knowledge.summaries(),
            voice_mode: self.voice_mode,
            match_analysis: self.match_analysis.clone(),
            career_goal: self.career_goal,
            resource_count: self.resources.len(),
            event_count: self.events.as_ref().map(Vec::len),
            playback_available: self.playback.is_some(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub history: Vec<ConversationEntry>,
    pub knowledge_base: Vec<SlotSummary>,
    pub voice_mode: bool,
    pub match_analysis: MatchAnalysisState,
    pub career_goal: Option<CareerGoal>,
    pub resource_count: usize,
    pub event_count: Option<usize>,
    pub playback_available: bool,
}
