use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::career::growth::generate_growth_plan;
use crate::career::match_analyzer::{analyze_match, cached_analysis, MatchResult};
use crate::career::CareerResource;
use crate::documents::{extract_upload, read_uploads, upload::take_field};
use crate::errors::AppError;
use crate::models::career::CareerGoal;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GoalRequest {
    pub goal: CareerGoal,
}

#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub career_goal: CareerGoal,
}

#[derive(Debug, Serialize)]
pub struct ResourcesResponse {
    pub added: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct GrowthPlanResponse {
    pub career_goal: CareerGoal,
    pub plan: String,
}

/// POST /api/v1/sessions/:id/career/match
///
/// Multipart fields `resume` and `job_description` (PDF or text).
/// Once an analysis exists, the uploads are ignored and the cached text is returned.
pub async fn handle_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<MatchResult>, AppError> {
    let llm = state.shared_llm()?;
    let session = state.sessions.get(id).await?;

    if let Some(cached) = cached_analysis(&session).await {
        return Ok(Json(cached));
    }

    let mut uploads = read_uploads(multipart).await?;
    let missing = || {
        AppError::Validation(
            "Please upload your resume and desired job description for analysis.".to_string(),
        )
    };
    let resume = take_field(&mut uploads, "resume").ok_or_else(missing)?;
    let job = take_field(&mut uploads, "job_description").ok_or_else(missing)?;

    let resume_text = extract_upload(&resume).await?;
    let job_text = extract_upload(&job).await?;

    let result = analyze_match(llm, session, resume_text, job_text).await?;
    Ok(Json(result))
}

/// PUT /api/v1/sessions/:id/career/goal
pub async fn handle_set_goal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<GoalRequest>,
) -> Result<Json<GoalResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    session.lock().await.career_goal = Some(req.goal);
    info!("Session {id}: career goal set to '{}'", req.goal);
    Ok(Json(GoalResponse {
        career_goal: req.goal,
    }))
}

/// POST /api/v1/sessions/:id/career/resources
///
/// Company resources (PDF or text) for growth plans. All files must extract or none are added.
pub async fn handle_upload_resources(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ResourcesResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let uploads = read_uploads(multipart).await?;
    if uploads.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }

    let mut resources = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        resources.push(CareerResource {
            name: upload.file_name.clone(),
            text: extract_upload(upload).await?,
        });
    }

    let added = resources.len();
    let mut session = session.lock().await;
    session.resources.extend(resources);
    info!("Session {id}: {added} resource(s) loaded");

    Ok(Json(ResourcesResponse {
        added,
        total: session.resources.len(),
    }))
}

/// POST /api/v1/sessions/:id/career/plan
pub async fn handle_growth_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GrowthPlanResponse>, AppError> {
    let llm = state.llm()?;
    let session = state.sessions.get(id).await?;

    let (goal, analysis, resources) = {
        let session = session.lock().await;
        let analysis = session
            .match_analysis
            .analysis()
            .ok_or_else(|| {
                AppError::Validation("Complete the resume match analysis first.".to_string())
            })?
            .to_string();
        let goal = session
            .career_goal
            .ok_or_else(|| AppError::Validation("Select a career goal first.".to_string()))?;
        (goal, analysis, session.resources.clone())
    };

    let plan = generate_growth_plan(llm, goal, &analysis, &resources).await?;
    Ok(Json(GrowthPlanResponse {
        career_goal: goal,
        plan,
    }))
}
