//! Chat Orchestrator: persona + knowledge base + history → one completion call.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{
    ASSISTANT_PERSONA, CHAT_MAX_TOKENS, CHAT_TEMPERATURE, KNOWLEDGE_BASE_HEADER,
};
use crate::llm_client::{ChatMessage, CompletionRequest, LanguageModel};
use crate::models::conversation::ConversationEntry;
use crate::session::Session;

/// The persona, followed by the knowledge-base section only when there is context.
pub fn build_system_instruction(knowledge_context: &str) -> String {
    if knowledge_context.is_empty() {
        ASSISTANT_PERSONA.to_string()
    } else {
        format!("{ASSISTANT_PERSONA}\n\n{KNOWLEDGE_BASE_HEADER}\n{knowledge_context}")
    }
}

/// System instruction, then every prior turn in order, then the new user turn.
pub fn build_chat_request(
    knowledge_context: &str,
    history: &[ConversationEntry],
    message: &str,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(build_system_instruction(knowledge_context)));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(message));

    CompletionRequest {
        messages,
        max_tokens: Some(CHAT_MAX_TOKENS),
        temperature: Some(CHAT_TEMPERATURE),
    }
}

/// Runs one chat turn against the session.
///
/// On success the user message and the reply are appended, in that order.
/// On failure the log is left untouched and the error carries the reason.
pub async fn chat_turn(
    llm: &dyn LanguageModel,
    session: &mut Session,
    message: &str,
) -> Result<String, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("Message cannot be empty".to_string()));
    }

    let request = build_chat_request(
        &session.knowledge.combined_context(),
        &session.history,
        message,
    );

    let reply = llm.complete(request).await.map_err(|e| {
        warn!("Session {}: chat turn failed: {e}", session.id);
        AppError::from(e)
    })?;

    session.history.push(ConversationEntry::user(message));
    session.history.push(ConversationEntry::assistant(reply.clone()));
    info!(
        "Session {}: chat turn complete ({} entries)",
        session.id,
        session.history.len()
    );

    Ok(reply)
}
