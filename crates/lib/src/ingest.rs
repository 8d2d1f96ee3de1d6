//! # Scholarship Ingestion
//!
//! The one-time loading step that must run before the service can answer
//! anything: read a processed scholarship file, embed every record and store
//! it in the document store the `VectorRetriever` searches.

use crate::{
    errors::RagError,
    extract::SCHOLARSHIP_ID_FIELD,
    providers::{
        ai::{generate_embedding, EmbeddingSettings},
        db::sqlite::SqliteProvider,
    },
    types::CandidateRecord,
};
use reqwest::Client as ReqwestClient;
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// Reads a JSON file holding an array of scholarship objects.
///
/// Array entries that are not objects are skipped with a warning.
pub async fn load_scholarship_documents(
    path: impl AsRef<Path>,
) -> Result<Vec<CandidateRecord>, RagError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await?;
    let records = parse_scholarship_documents(&content)?;
    info!(path = %path.display(), count = records.len(), "Loaded scholarship documents.");
    Ok(records)
}

/// Parses the content of a processed scholarship file.
pub fn parse_scholarship_documents(content: &str) -> Result<Vec<CandidateRecord>, RagError> {
    let Value::Array(items) = serde_json::from_str::<Value>(content)? else {
        return Err(RagError::InvalidInput(
            "scholarship file must contain a JSON array".to_string(),
        ));
    };

    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            Value::Object(record) => Some(record),
            other => {
                warn!(index, item = %other, "Skipping scholarship entry that is not an object.");
                None
            }
        })
        .collect())
}

/// The identifier a record is stored under, if it has one.
fn stored_scholarship_id(record: &CandidateRecord) -> Option<String> {
    match record.get(SCHOLARSHIP_ID_FIELD)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Embeds and stores every record, returning how many were stored.
///
/// Each record is stored as compact JSON so the request pipeline can parse it
/// back out of the retrieved text.
pub async fn store_embeddings(
    store: &SqliteProvider,
    embedding: &EmbeddingSettings,
    records: &[CandidateRecord],
) -> Result<usize, RagError> {
    store.initialize_schema().await?;
    let client = ReqwestClient::builder()
        .build()
        .map_err(RagError::ReqwestClientBuild)?;

    let mut stored = 0;
    for record in records {
        let content = serde_json::to_string(record)?;
        let vector = generate_embedding(&client, embedding, &content).await?;
        let scholarship_id = stored_scholarship_id(record);
        store
            .store_document(
                scholarship_id.as_deref(),
                &content,
                &embedding.model_name,
                &vector,
            )
            .await?;
        stored += 1;
    }

    info!(stored, "Stored scholarship embeddings.");
    Ok(stored)
}
