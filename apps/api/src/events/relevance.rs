//! Event Relevance Filter.
//!
//! One independent completion call per event asks for a strict Yes/No verdict.
//! Calls run with bounded concurrency; results are reassembled in input order,
//! so concurrency never changes the retained set or its order. A failed call
//! skips that event and is reported, without affecting its siblings.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::events::prompts::{
    RELEVANCE_PROMPT_TEMPLATE, RELEVANCE_SYSTEM, SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM,
};
use crate::events::EventRecord;
use crate::llm_client::{CompletionRequest, LanguageModel};
use crate::models::career::CareerGoal;

/// An event whose relevance check failed. It is excluded from the results.
#[derive(Debug, Clone, Serialize)]
pub struct EventFailure {
    pub index: usize,
    pub event_name: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RelevanceOutcome {
    pub relevant: Vec<EventRecord>,
    pub failures: Vec<EventFailure>,
}

pub fn build_relevance_prompt(event: &EventRecord, match_analysis: &str, goal: CareerGoal) -> String {
    RELEVANCE_PROMPT_TEMPLATE
        .replace("{career_goal}", goal.label())
        .replace("{match_analysis}", match_analysis)
        .replace("{event_name}", &event.name)
        .replace("{event_description}", &event.description)
}

/// Only an exact "yes" (trimmed, any case) counts as relevant.
pub fn is_relevant(verdict: &str) -> bool {
    verdict.trim().eq_ignore_ascii_case("yes")
}

pub async fn filter_relevant_events(
    llm: &dyn LanguageModel,
    events: &[EventRecord],
    match_analysis: &str,
    goal: CareerGoal,
    concurrency: usize,
) -> RelevanceOutcome {
    // Requests are built up front so the stream only carries owned values.
    let requests: Vec<(usize, CompletionRequest)> = events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let prompt = build_relevance_prompt(event, match_analysis, goal);
            (index, CompletionRequest::single(RELEVANCE_SYSTEM, prompt))
        })
        .collect();

    let verdicts: Vec<_> = stream::iter(requests)
        .map(|(index, request)| async move { (index, llm.complete(request).await) })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut outcome = RelevanceOutcome::default();
    for (index, verdict) in verdicts {
        let event = &events[index];
        match verdict {
            Ok(text) if is_relevant(&text) => outcome.relevant.push(event.clone()),
            Ok(_) => {}
            Err(e) => {
                warn!("Relevance check failed for event '{}': {e}", event.name);
                outcome.failures.push(EventFailure {
                    index,
                    event_name: event.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        "Relevance filter kept {}/{} events ({} failed)",
        outcome.relevant.len(),
        events.len(),
        outcome.failures.len()
    );
    outcome
}

pub fn build_summary_prompt(events: &[EventRecord], goal: CareerGoal) -> String {
    let event_details = events
        .iter()
        .map(|e| format!("{}: {}", e.name, e.description))
        .collect::<Vec<_>>()
        .join("\n");

    SUMMARY_PROMPT_TEMPLATE
        .replace("{career_goal}", goal.label())
        .replace("{event_details}", &event_details)
}

/// One extra completion call explaining how the retained events serve the goal.
pub async fn summarize_recommendations(
    llm: &dyn LanguageModel,
    events: &[EventRecord],
    goal: CareerGoal,
) -> Result<String, AppError> {
    let request = CompletionRequest::single(SUMMARY_SYSTEM, build_summary_prompt(events, goal));
    let summary = llm.complete(request).await?;
    Ok(summary.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;
    use crate::llm_client::LlmError;

    fn event(name: &str, description: &str) -> EventRecord {
        EventRecord {
            name: name.to_string(),
            description: description.to_string(),
            date: "TBD".to_string(),
            location: "TBD".to_string(),
        }
    }

    /// Answers "Yes" for events whose prompt mentions one of `relevant`.
    fn oracle(relevant: &'static [&'static str]) -> ScriptedModel {
        ScriptedModel::new(move |request| {
            let prompt = request.last_user_message().unwrap_or_default();
            if relevant.iter().any(|name| prompt.contains(&format!("Name: {name}\n"))) {
                Ok("Yes".to_string())
            } else {
                Ok("No".to_string())
            }
        })
    }

    #[test]
    fn test_verdict_parsing_is_strict() {
        assert!(is_relevant("Yes"));
        assert!(is_relevant("  yes\n"));
        assert!(is_relevant("YES"));
        assert!(!is_relevant("Yes."));
        assert!(!is_relevant("Yes, definitely"));
        assert!(!is_relevant("No"));
        assert!(!is_relevant(""));
    }

    #[test]
    fn test_relevance_prompt_contents() {
        let prompt = build_relevance_prompt(
            &event("Leadership 101", "Lead teams"),
            "Score: 70",
            CareerGoal::CareerAdvancement,
        );
        assert!(prompt.contains("career goal: \"Career Advancement\""));
        assert!(prompt.contains("\"Score: 70\""));
        assert!(prompt.contains("Name: Leadership 101\nDescription: Lead teams"));
    }

    #[tokio::test]
    async fn test_keeps_only_yes_events() {
        let llm = oracle(&["Leadership 101"]);
        let events = vec![
            event("Leadership 101", "Intro to leading teams"),
            event("Yoga Break", "Stretching"),
        ];

        let outcome =
            filter_relevant_events(&llm, &events, "analysis", CareerGoal::CareerAdvancement, 4)
                .await;

        assert_eq!(outcome.relevant, vec![events[0].clone()]);
        assert!(outcome.failures.is_empty());
        assert_eq!(llm.completion_calls(), 2);
    }

    #[tokio::test]
    async fn test_input_order_preserved_under_concurrency() {
        let llm = oracle(&["A", "C", "E"]);
        let events: Vec<_> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|n| event(n, "desc"))
            .collect();

        for concurrency in [1, 2, 8] {
            let outcome = filter_relevant_events(
                &llm,
                &events,
                "analysis",
                CareerGoal::ProfessionalGrowth,
                concurrency,
            )
            .await;
            let names: Vec<_> = outcome.relevant.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["A", "C", "E"]);
        }
    }

    #[tokio::test]
    async fn test_failed_check_skips_only_that_event() {
        let llm = ScriptedModel::new(|request| {
            let prompt = request.last_user_message().unwrap_or_default();
            if prompt.contains("Name: Broken\n") {
                Err(LlmError::Api {
                    status: 500,
                    message: "boom".to_string(),
                })
            } else {
                Ok("yes".to_string())
            }
        });
        let events = vec![event("First", "d"), event("Broken", "d"), event("Third", "d")];

        let outcome =
            filter_relevant_events(&llm, &events, "a", CareerGoal::JobPerformanceImprovement, 2)
                .await;

        let names: Vec<_> = outcome.relevant.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Third"]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert_eq!(outcome.failures[0].event_name, "Broken");
    }

    #[tokio::test]
    async fn test_empty_event_list_makes_no_calls() {
        let llm = ScriptedModel::replying("Yes");
        let outcome =
            filter_relevant_events(&llm, &[], "a", CareerGoal::CareerAdvancement, 4).await;
        assert!(outcome.relevant.is_empty());
        assert_eq!(llm.completion_calls(), 0);
    }

    #[tokio::test]
    async fn test_summary_lists_retained_events() {
        let llm = ScriptedModel::replying("  These events build leadership.  ");
        let events = vec![event("Leadership 101", "Lead teams"), event("Mentoring", "1:1s")];

        let summary = summarize_recommendations(&llm, &events, CareerGoal::CareerAdvancement)
            .await
            .unwrap();
        assert_eq!(summary, "These events build leadership.");

        let request = &llm.requests()[0];
        assert_eq!(request.system_prompt(), Some(SUMMARY_SYSTEM));
        assert!(request
            .last_user_message()
            .unwrap()
            .contains("Leadership 101: Lead teams\nMentoring: 1:1s"));
    }
}
