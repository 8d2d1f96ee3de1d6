//! # Retrieval
//!
//! The `Retriever` seam and its production implementation, a vector search
//! over the SQLite document store.

use crate::{
    errors::RagError,
    providers::{
        ai::{generate_embedding, EmbeddingSettings},
        db::sqlite::SqliteProvider,
    },
    types::RetrievedDocument,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use std::fmt::Debug;
use tracing::info;

/// Finds documents relevant to a query.
///
/// Implementations are built once at startup and shared by every request.
/// Recall is best effort and an empty result is valid.
#[async_trait]
pub trait Retriever: Send + Sync + Debug {
    async fn invoke(&self, query: &str) -> Result<Vec<RetrievedDocument>, RagError>;
}

/// Embeds the query and returns the nearest stored scholarship documents.
#[derive(Debug, Clone)]
pub struct VectorRetriever {
    client: ReqwestClient,
    store: SqliteProvider,
    embedding: EmbeddingSettings,
    limit: u32,
}

impl VectorRetriever {
    pub fn new(
        store: SqliteProvider,
        embedding: EmbeddingSettings,
        limit: u32,
    ) -> Result<Self, RagError> {
        let client = ReqwestClient::builder()
            .build()
            .map_err(RagError::ReqwestClientBuild)?;
        Ok(Self {
            client,
            store,
            embedding,
            limit,
        })
    }
}

#[async_trait]
impl Retriever for VectorRetriever {
    async fn invoke(&self, query: &str) -> Result<Vec<RetrievedDocument>, RagError> {
        let query_vector = generate_embedding(&self.client, &self.embedding, query).await?;
        let documents = self.store.vector_search(&query_vector, self.limit).await?;
        info!(count = documents.len(), limit = self.limit, "Retrieved scholarship documents.");
        Ok(documents)
    }
}
