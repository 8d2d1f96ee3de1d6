//! # Chain Output Normalization
//!
//! Decodes whatever the recommendation chain returned into a list of
//! candidate-like values. Unusable output becomes a `RecommendationResult`
//! the caller can see, never an error.

use crate::types::{ChainOutput, RecommendationResult};
use serde_json::Value;
use tracing::{debug, warn};

/// Reported when the model's text cannot be decoded as JSON.
pub const INVALID_JSON_MESSAGE: &str = "model response is not valid JSON";
/// Reported when the model's output decodes but is not a list.
pub const NOT_AN_ARRAY_MESSAGE: &str = "model response is not a JSON array";

/// Normalizes the chain's output into a list of values.
///
/// On failure the `Err` side holds the finished response for the caller,
/// carrying the original, unmodified output for diagnostics.
pub fn normalize_chain_output(output: ChainOutput) -> Result<Vec<Value>, RecommendationResult> {
    match output {
        ChainOutput::Text(raw_output) => {
            debug!(raw_output = %raw_output, "Decoding model output.");
            let decoded = match serde_json::from_str::<Value>(strip_code_fence(&raw_output)) {
                Ok(value) => value,
                Err(e) => {
                    warn!(error = %e, "Model output is not valid JSON.");
                    return Err(invalid_output(INVALID_JSON_MESSAGE, raw_output));
                }
            };
            match decoded {
                Value::Array(items) => Ok(items),
                _ => {
                    warn!("Model output decoded to something other than a list.");
                    Err(invalid_output(NOT_AN_ARRAY_MESSAGE, raw_output))
                }
            }
        }
        ChainOutput::Structured(Value::Array(items)) => Ok(items),
        ChainOutput::Structured(other) => {
            warn!("Structured chain output is not a list.");
            Err(invalid_output(NOT_AN_ARRAY_MESSAGE, other.to_string()))
        }
    }
}

fn invalid_output(message: &str, raw_output: String) -> RecommendationResult {
    RecommendationResult::InvalidOutput {
        error: message.to_string(),
        raw_output,
    }
}

/// Removes a surrounding Markdown code fence, if there is one.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
