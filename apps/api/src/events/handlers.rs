use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::events::records::parse_events_csv;
use crate::events::relevance::{filter_relevant_events, summarize_recommendations, EventFailure};
use crate::events::EventRecord;
use crate::models::career::CareerGoal;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EventsLoadedResponse {
    pub events: usize,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub career_goal: CareerGoal,
    pub relevant_events: Vec<EventRecord>,
    pub failed_events: Vec<EventFailure>,
    pub summary: Option<String>,
    pub summary_error: Option<String>,
    pub message: Option<String>,
}

/// POST /api/v1/sessions/:id/events
///
/// Body is the CSV table. A table that fails to parse leaves the previous one loaded.
pub async fn handle_upload_events(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<EventsLoadedResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let events = parse_events_csv(&body)?;
    let count = events.len();

    session.lock().await.events = Some(events);
    info!("Session {id}: {count} event(s) loaded");

    Ok(Json(EventsLoadedResponse { events: count }))
}

/// POST /api/v1/sessions/:id/events/recommendations
pub async fn handle_recommendations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let llm = state.llm()?;
    let session = state.sessions.get(id).await?;

    let (events, analysis, goal) = {
        let session = session.lock().await;
        let events = session.events.clone().ok_or_else(|| {
            AppError::Validation(
                "No events data found. Please upload a CSV file first.".to_string(),
            )
        })?;
        let not_ready = || {
            AppError::Validation(
                "Please complete career planning first to see relevant events.".to_string(),
            )
        };
        let analysis = session
            .match_analysis
            .analysis()
            .ok_or_else(not_ready)?
            .to_string();
        let goal = session.career_goal.ok_or_else(not_ready)?;
        (events, analysis, goal)
    };

    let outcome = filter_relevant_events(
        llm,
        &events,
        &analysis,
        goal,
        state.config.event_concurrency,
    )
    .await;

    let (summary, summary_error, message) = if outcome.relevant.is_empty() {
        (
            None,
            None,
            Some("No matching events found for your career goals.".to_string()),
        )
    } else {
        match summarize_recommendations(llm, &outcome.relevant, goal).await {
            Ok(summary) => (Some(summary), None, None),
            Err(e) => {
                warn!("Session {id}: recommendation summary failed: {e}");
                (None, Some(e.to_string()), None)
            }
        }
    };

    Ok(Json(RecommendationsResponse {
        career_goal: goal,
        relevant_events: outcome.relevant,
        failed_events: outcome.failures,
        summary,
        summary_error,
        message,
    }))
}
