// Shared prompt constants.
// Each workflow that needs LLM calls defines its own prompts.rs alongside it.
// This file contains the assistant persona used by every chat turn.

/// Persona sent as the system instruction of every chat turn.
pub const ASSISTANT_PERSONA: &str = "You are ValleyHelps, an HR assistant chatbot for Valley Water. \
    Be helpful, friendly, and concise. \
    When someone brings up a job or resume, inform them of the career planning tool. \
    If the topic is workshops or events, bring up the events exploration tool.";

/// Header placed between the persona and the injected knowledge-base context.
pub const KNOWLEDGE_BASE_HEADER: &str = "Knowledge Base:";

/// Output budget and sampling temperature for chat turns.
pub const CHAT_MAX_TOKENS: u32 = 500;
pub const CHAT_TEMPERATURE: f32 = 0.7;
