// All LLM prompt constants for event recommendations.

pub const RELEVANCE_SYSTEM: &str = "You are an intelligent career planner.";

/// Per-event verdict prompt.
/// Replace: {career_goal}, {match_analysis}, {event_name}, {event_description}
pub const RELEVANCE_PROMPT_TEMPLATE: &str = r#"The user has the following career goal: "{career_goal}". Based on the following match analysis:
"{match_analysis}", assess if the following event would help the user achieve their goal:

Event Details:
Name: {event_name}
Description: {event_description}

Respond with "Yes" if the event is relevant, and "No" if it is not."#;

pub const SUMMARY_SYSTEM: &str = "You are an expert career planner.";

/// Summary of the retained events. Replace: {career_goal}, {event_details}
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"Based on the user's match analysis and career goal of "{career_goal}", the following events were identified as relevant:
{event_details}

Generate a concise summary explaining how these events collectively support the user's career development and help them achieve their goals."#;
