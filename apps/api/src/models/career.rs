use std::fmt;

use serde::{Deserialize, Serialize};

/// Fixed set of goals a user can pick after the match analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CareerGoal {
    #[serde(rename = "Job Performance Improvement")]
    JobPerformanceImprovement,
    #[serde(rename = "Career Advancement")]
    CareerAdvancement,
    #[serde(rename = "Professional Growth")]
    ProfessionalGrowth,
}

impl CareerGoal {
    pub const ALL: [CareerGoal; 3] = [
        CareerGoal::JobPerformanceImprovement,
        CareerGoal::CareerAdvancement,
        CareerGoal::ProfessionalGrowth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CareerGoal::JobPerformanceImprovement => "Job Performance Improvement",
            CareerGoal::CareerAdvancement => "Career Advancement",
            CareerGoal::ProfessionalGrowth => "Professional Growth",
        }
    }
}

impl fmt::Display for CareerGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of the session's single resume/job-description analysis.
///
/// `Done` is terminal for the session; `Failed` may be re-triggered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MatchAnalysisState {
    #[default]
    NotStarted,
    Pending,
    Done(String),
    Failed(String),
}

impl MatchAnalysisState {
    pub fn analysis(&self) -> Option<&str> {
        match self {
            MatchAnalysisState::Done(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_career_goal_serde_uses_display_labels() {
        for goal in CareerGoal::ALL {
            let json = serde_json::to_string(&goal).unwrap();
            assert_eq!(json, format!("\"{}\"", goal.label()));
            let back: CareerGoal = serde_json::from_str(&json).unwrap();
            assert_eq!(back, goal);
        }
    }

    #[test]
    fn test_unknown_career_goal_rejected() {
        assert!(serde_json::from_str::<CareerGoal>("\"World Domination\"").is_err());
    }

    #[test]
    fn test_match_state_serializes_with_status_tag() {
        let json = serde_json::to_value(MatchAnalysisState::Done("Score: 80".into())).unwrap();
        assert_eq!(json["status"], "done");
        assert_eq!(json["value"], "Score: 80");

        let json = serde_json::to_value(MatchAnalysisState::NotStarted).unwrap();
        assert_eq!(json["status"], "not_started");
    }
}
