//! Career planning: resume/job-description match analysis, career goal and growth plan.

pub mod growth;
pub mod handlers;
pub mod match_analyzer;
pub mod prompts;

use serde::Serialize;

/// Company resource text offered to the growth-plan prompt.
#[derive(Debug, Clone, Serialize)]
pub struct CareerResource {
    pub name: String,
    pub text: String,
}
