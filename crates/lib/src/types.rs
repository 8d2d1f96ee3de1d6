//! # Core Data Types
//!
//! The records that flow through a single `/recommend` request. None of them
//! outlive the request that created them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scholarship object parsed out of a retrieved document's text.
pub type CandidateRecord = Map<String, Value>;

/// The requester's profile, passed through as an opaque set of JSON fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInput(pub Map<String, Value>);

impl UserInput {
    /// Returns the profile fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for UserInput {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A document returned by a `Retriever`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// The raw text of the stored document.
    pub content: String,
    /// Similarity to the query, higher is closer.
    #[serde(default)]
    pub score: f64,
}

impl RetrievedDocument {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            score: 0.0,
        }
    }
}

/// What a `RecommendationChain` hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainOutput {
    /// Raw model text, expected to hold a JSON array.
    Text(String),
    /// A value the chain has already decoded.
    Structured(Value),
}

/// The body returned to the caller of `/recommend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecommendationResult {
    Recommendations {
        recommendations: Vec<i64>,
    },
    InvalidOutput {
        error: String,
        raw_output: String,
    },
}

impl RecommendationResult {
    /// Returns `true` when the model output could not be used.
    pub fn is_invalid_output(&self) -> bool {
        matches!(self, RecommendationResult::InvalidOutput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_serializes_to_flat_shapes() {
        let ok = RecommendationResult::Recommendations {
            recommendations: vec![5, 7],
        };
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({ "recommendations": [5, 7] })
        );

        let err = RecommendationResult::InvalidOutput {
            error: "model response is not valid JSON".to_string(),
            raw_output: "nope".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({ "error": "model response is not valid JSON", "raw_output": "nope" })
        );
        assert!(err.is_invalid_output());
        assert!(!ok.is_invalid_output());
    }

    #[test]
    fn test_user_input_accepts_any_object() {
        let input: UserInput =
            serde_json::from_value(json!({ "major": "Physics", "gpa": 3.8 })).unwrap();
        assert_eq!(input.fields()["major"], json!("Physics"));
        assert!(serde_json::from_value::<UserInput>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_chain_output_untagged() {
        let text: ChainOutput = serde_json::from_value(json!("[]")).unwrap();
        assert_eq!(text, ChainOutput::Text("[]".to_string()));
        let structured: ChainOutput = serde_json::from_value(json!([{"a": 1}])).unwrap();
        assert_eq!(structured, ChainOutput::Structured(json!([{"a": 1}])));
    }
}
