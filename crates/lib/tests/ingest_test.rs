//! # Ingestion and Vector Retrieval Tests
//!
//! Loads a scholarship file into an in-memory store with a mocked embeddings
//! API, then checks that `VectorRetriever` returns the stored documents in
//! similarity order.

use anyhow::Result;
use httpmock::{Method::POST, MockServer};
use scholarship_rag::{
    extract::extract_candidate_records,
    ingest::{load_scholarship_documents, store_embeddings},
    providers::ai::EmbeddingSettings,
    Retriever, VectorRetriever,
};
use scholarship_rag_test_utils::TestSetup;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

async fn mock_embeddings(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings").body_contains("Physics");
            then.status(200)
                .json_body(json!({ "data": [{ "embedding": [1.0, 0.0, 0.0] }] }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/embeddings").body_contains("Art");
            then.status(200)
                .json_body(json!({ "data": [{ "embedding": [0.0, 1.0, 0.0] }] }));
        })
        .await;
}

#[tokio::test]
async fn test_ingested_documents_are_retrievable_by_similarity() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_embeddings(&server).await;

    let mut file = NamedTempFile::new()?;
    write!(
        file,
        "{}",
        json!([
            { "scholarship_id": 1, "name": "Art Foundation Award" },
            "not a scholarship",
            { "scholarship_id": 2, "name": "Physics Olympiad Grant" }
        ])
    )?;

    let records = load_scholarship_documents(file.path()).await?;
    assert_eq!(records.len(), 2);

    let setup = TestSetup::new().await?;
    let settings = EmbeddingSettings {
        api_url: server.url("/v1/embeddings"),
        model_name: "mock-embedding-model".to_string(),
        api_key: None,
        api: None,
    };
    let stored = store_embeddings(&setup.store, &settings, &records).await?;
    assert_eq!(stored, 2);
    assert_eq!(setup.store.count_documents().await?, 2);

    let retriever = VectorRetriever::new(setup.store.clone(), settings, 5)?;
    let documents = retriever.invoke("User profile:\n- major: Physics").await?;
    assert_eq!(documents.len(), 2);
    assert!(documents[0].score >= documents[1].score);

    let candidates = extract_candidate_records(&documents);
    assert_eq!(candidates[0]["scholarship_id"], json!(2));
    assert_eq!(candidates[1]["scholarship_id"], json!(1));
    Ok(())
}

#[tokio::test]
async fn test_reingesting_replaces_existing_documents() -> Result<()> {
    let server = MockServer::start_async().await;
    mock_embeddings(&server).await;

    let setup = TestSetup::new().await?;
    let settings = EmbeddingSettings {
        api_url: server.url("/v1/embeddings"),
        model_name: "mock-embedding-model".to_string(),
        api_key: None,
        api: None,
    };
    let records = vec![json!({ "scholarship_id": 2, "name": "Physics Olympiad Grant" })
        .as_object()
        .unwrap()
        .clone()];

    store_embeddings(&setup.store, &settings, &records).await?;
    store_embeddings(&setup.store, &settings, &records).await?;

    assert_eq!(setup.store.count_documents().await?, 1);
    Ok(())
}
