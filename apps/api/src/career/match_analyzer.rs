//! Match Analyzer: one completion call per session comparing a resume to a job description.
//!
//! The result is cached in the session as `MatchAnalysisState::Done` and never
//! recomputed. The score stays embedded in free text; nothing is parsed out of it.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::career::prompts::{MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::{CompletionRequest, LanguageModel};
use crate::models::career::MatchAnalysisState;
use crate::session::SharedSession;

#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub analysis: String,
    /// True when the analysis came from the session without a new call.
    pub cached: bool,
}

pub fn build_match_prompt(resume_text: &str, job_text: &str) -> String {
    MATCH_PROMPT_TEMPLATE
        .replace("{resume_text}", resume_text)
        .replace("{job_text}", job_text)
}

/// Returns the cached analysis, if the session already has one.
pub async fn cached_analysis(session: &SharedSession) -> Option<MatchResult> {
    session
        .lock()
        .await
        .match_analysis
        .analysis()
        .map(|text| MatchResult {
            analysis: text.to_string(),
            cached: true,
        })
}

/// Runs the analysis unless one is cached or in flight.
///
/// State transitions: `NotStarted | Failed → Pending → Done | Failed`.
/// The call runs on its own task, so it completes and records its outcome even
/// if the requesting client goes away.
pub async fn analyze_match(
    llm: Arc<dyn LanguageModel>,
    session: SharedSession,
    resume_text: String,
    job_text: String,
) -> Result<MatchResult, AppError> {
    let session_id = {
        let mut guard = session.lock().await;
        match &guard.match_analysis {
            MatchAnalysisState::Done(text) => {
                return Ok(MatchResult {
                    analysis: text.clone(),
                    cached: true,
                })
            }
            MatchAnalysisState::Pending => {
                return Err(AppError::Conflict(
                    "Match analysis is already in progress".to_string(),
                ))
            }
            MatchAnalysisState::NotStarted | MatchAnalysisState::Failed(_) => {
                guard.match_analysis = MatchAnalysisState::Pending;
            }
        }
        guard.id
    };

    info!("Session {session_id}: analyzing resume against job description");
    let task = tokio::spawn(async move {
        let request = CompletionRequest::single(MATCH_SYSTEM, build_match_prompt(&resume_text, &job_text));
        let result = llm.complete(request).await.map(|text| text.trim().to_string());

        let mut guard = session.lock().await;
        guard.match_analysis = match &result {
            Ok(text) => MatchAnalysisState::Done(text.clone()),
            Err(e) => MatchAnalysisState::Failed(e.to_string()),
        };
        result
    });

    let result = task
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Match analysis task failed: {e}")))?;

    match result {
        Ok(analysis) => {
            info!("Session {session_id}: analysis complete");
            Ok(MatchResult {
                analysis,
                cached: false,
            })
        }
        Err(e) => {
            warn!("Session {session_id}: analysis failed: {e}");
            Err(e.into())
        }
    }
}
