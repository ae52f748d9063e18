//! Two-slot knowledge base injected into every chat turn.

pub mod handlers;
pub mod slots;

pub use slots::{KnowledgeBase, SlotId, SlotSummary};
