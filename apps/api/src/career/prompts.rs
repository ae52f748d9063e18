// All LLM prompt constants for the career planning workflow.

/// System prompt for the one-shot resume/job-description comparison.
pub const MATCH_SYSTEM: &str = "You are an HR system focusing on internal employee growth.";

/// Match analysis prompt. Replace `{resume_text}` and `{job_text}` before sending.
pub const MATCH_PROMPT_TEMPLATE: &str = r#"Compare the following resume to the desired job description and provide a match score (0-100).
Additionally, identify missing skills or qualifications and suggest ways to bridge the gap.

Resume:
{resume_text}

Job Description:
{job_text}"#;

/// System prompt for growth plans.
pub const GROWTH_SYSTEM: &str = "You are an HR system providing career development advice.";

/// Growth plan prompt. Replace `{career_goal}`, `{match_analysis}` and `{resources}`.
pub const GROWTH_PROMPT_TEMPLATE: &str = r#"Based on the selected career goal: {career_goal}, and the match analysis below, suggest tailored growth plans.

Match analysis:
{match_analysis}

Include these available resources from the company:
{resources}"#;

/// Placeholder used when no company resources were uploaded.
pub const NO_RESOURCES: &str = "No resources uploaded.";
