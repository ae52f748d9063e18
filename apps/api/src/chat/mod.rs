//! Chat orchestration and conversation-log import/export.

pub mod handlers;
pub mod orchestrator;
pub mod transcript;

pub use orchestrator::chat_turn;
