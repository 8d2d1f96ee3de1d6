//! # Default Prompt Templates
//!
//! The prompts used by `LlmRecommendationChain` unless the server's
//! configuration overrides them.
//!
//! User prompt placeholders are `{name}` tokens. Every key of the chain
//! payload can be used: the requester's own profile fields plus
//! `{formatted_user_input}` and `{input_documents}`.

/// The default system prompt for scholarship recommendation.
pub const RECOMMENDATION_SYSTEM_PROMPT: &str = "You are a scholarship advisor. You receive a student's profile and a list of candidate scholarships as JSON. Select the scholarships the student is eligible for and would benefit from most, ordered from best to worst match. Respond with a JSON array only, where each element is an object with the fields `scholarship_id` and `reason`. Do not wrap the array in Markdown and do not add any text outside of it. If no scholarship matches, respond with `[]`.";

/// The default user prompt for scholarship recommendation.
///
/// Placeholders: `{formatted_user_input}`, `{input_documents}`
pub const RECOMMENDATION_USER_PROMPT: &str = "# Student profile\n{formatted_user_input}\n\n# Candidate scholarships\n{input_documents}\n\n# Task\nReturn the matching scholarships as a JSON array of objects with `scholarship_id` and `reason`.";
