//! # Recommendation Pipeline
//!
//! Runs one recommendation request end to end:
//!
//! 1. **Format** the requester's profile into a query.
//! 2. **Retrieve** candidate documents for that query.
//! 3. **Extract** the documents that hold a JSON object.
//! 4. **Invoke** the recommendation chain with profile, query and candidates.
//! 5. **Normalize** the chain output into a list.
//! 6. **Collect** the scholarship identifiers from that list.
//!
//! Only collaborator faults in steps 2 and 4 surface as `Err`. Unusable model
//! output ends the request early with `RecommendationResult::InvalidOutput`,
//! and every other malformed item is dropped along the way.

use crate::{
    chain::RecommendationChain,
    errors::RagError,
    extract::{extract_candidate_records, extract_scholarship_ids, serialize_candidates},
    normalize::normalize_chain_output,
    query::format_user_input_as_query,
    retriever::Retriever,
    types::{RecommendationResult, UserInput},
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

/// Payload key holding the serialized candidate list.
pub const INPUT_DOCUMENTS_KEY: &str = "input_documents";
/// Payload key holding the formatted query.
pub const FORMATTED_USER_INPUT_KEY: &str = "formatted_user_input";

/// Builds the chain payload: the profile fields, then the chain's own keys.
///
/// The chain's keys are inserted last so they win over profile fields of the
/// same name.
pub fn build_chain_payload(
    user_input: &UserInput,
    candidates_json: &str,
    formatted_query: &str,
) -> Map<String, Value> {
    let mut payload = user_input.fields().clone();
    payload.insert(
        INPUT_DOCUMENTS_KEY.to_string(),
        Value::String(candidates_json.to_string()),
    );
    payload.insert(
        FORMATTED_USER_INPUT_KEY.to_string(),
        Value::String(formatted_query.to_string()),
    );
    payload
}

/// The request pipeline, holding the shared collaborators.
#[derive(Debug, Clone)]
pub struct RecommendationPipeline {
    retriever: Arc<dyn Retriever>,
    chain: Arc<dyn RecommendationChain>,
}

impl RecommendationPipeline {
    pub fn new(retriever: Arc<dyn Retriever>, chain: Arc<dyn RecommendationChain>) -> Self {
        Self { retriever, chain }
    }

    /// Recommends scholarships for a profile.
    pub async fn recommend(&self, user_input: &UserInput) -> Result<RecommendationResult, RagError> {
        let formatted_query = format_user_input_as_query(user_input);

        let documents = self.retriever.invoke(&formatted_query).await?;
        info!(count = documents.len(), "Retrieved documents.");

        let candidates = extract_candidate_records(&documents);
        info!(
            candidates = candidates.len(),
            skipped = documents.len() - candidates.len(),
            "Extracted candidate records."
        );

        let candidates_json = serialize_candidates(&candidates)?;
        let payload = build_chain_payload(user_input, &candidates_json, &formatted_query);
        let output = self.chain.invoke(&payload).await?;

        let items = match normalize_chain_output(output) {
            Ok(items) => items,
            Err(invalid) => return Ok(invalid),
        };

        let recommendations = extract_scholarship_ids(&items);
        info!(
            selected = items.len(),
            recommended = recommendations.len(),
            "Extracted scholarship ids."
        );
        Ok(RecommendationResult::Recommendations { recommendations })
    }
}
