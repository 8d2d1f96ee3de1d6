//! Deterministic fakes for the recommendation collaborators.

use anyhow::Result;
use async_trait::async_trait;
use scholarship_rag::{
    providers::{ai::AiProvider, db::sqlite::SqliteProvider},
    ChainOutput, RagError, RecommendationChain, RetrievedDocument, Retriever,
};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// A fresh in-memory document store with the schema in place.
pub struct TestSetup {
    pub store: SqliteProvider,
}

impl TestSetup {
    pub async fn new() -> Result<Self> {
        let store = SqliteProvider::new(":memory:").await?;
        store.initialize_schema().await?;
        Ok(Self { store })
    }
}

// --- Mock Retriever ---

/// Returns the same documents for every query and records the queries.
#[derive(Debug, Default)]
pub struct MockRetriever {
    documents: Vec<RetrievedDocument>,
    queries: Mutex<Vec<String>>,
}

impl MockRetriever {
    pub fn new(contents: &[&str]) -> Self {
        Self {
            documents: contents.iter().map(|c| RetrievedDocument::new(*c)).collect(),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for MockRetriever {
    async fn invoke(&self, query: &str) -> Result<Vec<RetrievedDocument>, RagError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.documents.clone())
    }
}

/// A retriever whose backend is always down.
#[derive(Debug, Default)]
pub struct FailingRetriever;

#[async_trait]
impl Retriever for FailingRetriever {
    async fn invoke(&self, _query: &str) -> Result<Vec<RetrievedDocument>, RagError> {
        Err(RagError::StorageConnection("vector store unavailable".to_string()))
    }
}

// --- Mock Chain ---

/// Returns a fixed output and records every payload it was invoked with.
#[derive(Debug)]
pub struct MockChain {
    output: ChainOutput,
    payloads: Mutex<Vec<Map<String, Value>>>,
}

impl MockChain {
    pub fn text(output: &str) -> Self {
        Self::with_output(ChainOutput::Text(output.to_string()))
    }

    pub fn structured(output: Value) -> Self {
        Self::with_output(ChainOutput::Structured(output))
    }

    fn with_output(output: ChainOutput) -> Self {
        Self {
            output,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn payloads(&self) -> Vec<Map<String, Value>> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecommendationChain for MockChain {
    async fn invoke(&self, payload: &Map<String, Value>) -> Result<ChainOutput, RagError> {
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(self.output.clone())
    }
}

/// A chain whose model endpoint is always down.
#[derive(Debug, Default)]
pub struct FailingChain;

#[async_trait]
impl RecommendationChain for FailingChain {
    async fn invoke(&self, _payload: &Map<String, Value>) -> Result<ChainOutput, RagError> {
        Err(RagError::AiApi("model unavailable".to_string()))
    }
}

// --- Mock AI Provider ---

/// Answers every prompt with the same text and records the prompts.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    response: String,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Retrieves the recorded `(system, user)` prompt pairs.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, RagError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        Ok(self.response.clone())
    }
}
