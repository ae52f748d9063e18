//! Event recommendations: CSV event table, per-event relevance verdicts, summary.

pub mod handlers;
pub mod prompts;
pub mod records;
pub mod relevance;

pub use records::EventRecord;
