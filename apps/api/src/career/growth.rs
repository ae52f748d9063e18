use tracing::info;

use crate::career::prompts::{GROWTH_PROMPT_TEMPLATE, GROWTH_SYSTEM, NO_RESOURCES};
use crate::career::CareerResource;
use crate::errors::AppError;
use crate::llm_client::{CompletionRequest, LanguageModel};
use crate::models::career::CareerGoal;

pub fn build_growth_prompt(
    goal: CareerGoal,
    match_analysis: &str,
    resources: &[CareerResource],
) -> String {
    let resources = if resources.is_empty() {
        NO_RESOURCES.to_string()
    } else {
        resources
            .iter()
            .map(|r| r.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    GROWTH_PROMPT_TEMPLATE
        .replace("{career_goal}", goal.label())
        .replace("{match_analysis}", match_analysis)
        .replace("{resources}", &resources)
}

/// One completion call producing a development plan. Not cached.
pub async fn generate_growth_plan(
    llm: &dyn LanguageModel,
    goal: CareerGoal,
    match_analysis: &str,
    resources: &[CareerResource],
) -> Result<String, AppError> {
    let prompt = build_growth_prompt(goal, match_analysis, resources);
    let plan = llm
        .complete(CompletionRequest::single(GROWTH_SYSTEM, prompt))
        .await?;
    info!("Generated growth plan for goal '{goal}'");
    Ok(plan.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    #[test]
    fn test_prompt_without_resources_uses_placeholder() {
        let prompt = build_growth_prompt(CareerGoal::CareerAdvancement, "Score: 60", &[]);
        assert!(prompt.contains("career goal: Career Advancement"));
        assert!(prompt.contains("Score: 60"));
        assert!(prompt.ends_with(NO_RESOURCES));
    }

    #[test]
    fn test_prompt_includes_every_resource() {
        let resources = vec![
            CareerResource {
                name: "mentoring.txt".into(),
                text: "Mentoring program".into(),
            },
            CareerResource {
                name: "tuition.pdf".into(),
                text: "Tuition reimbursement".into(),
            },
        ];
        let prompt = build_growth_prompt(CareerGoal::ProfessionalGrowth, "analysis", &resources);
        assert!(prompt.ends_with("Mentoring program\n\nTuition reimbursement"));
    }

    #[tokio::test]
    async fn test_generate_uses_growth_system_prompt() {
        let llm = ScriptedModel::replying(" Plan: take the leadership course. ");
        let plan = generate_growth_plan(&llm, CareerGoal::JobPerformanceImprovement, "a", &[])
            .await
            .unwrap();
        assert_eq!(plan, "Plan: take the leadership course.");
        assert_eq!(llm.requests()[0].system_prompt(), Some(GROWTH_SYSTEM));
    }
}
