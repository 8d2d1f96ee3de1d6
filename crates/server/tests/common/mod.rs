//! # Common Test Utilities
//!
//! `TestApp` spawns the real server on a random port with a temporary SQLite
//! document store and an `httpmock::MockServer` standing in for both the
//! embeddings API and the chat completions API.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use axum::serve;
use httpmock::{Method::POST, Mock, MockServer};
use reqwest::Client;
use scholarship_rag::{
    ingest::store_embeddings, providers::db::sqlite::SqliteProvider, CandidateRecord,
};
use scholarship_rag_server::{
    config::{self, AppConfig},
    router,
    state::{build_app_state_with_store, open_store, AppState},
};
use serde_json::{json, Value};
use std::{fs::File, io::Write, net::SocketAddr};
use tempfile::{tempdir, NamedTempFile, TempDir};
use tokio::{net::TcpListener, task::JoinHandle};

pub const EMBEDDINGS_PATH: &str = "/v1/embeddings";
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// A harness for end-to-end testing of the Axum server.
pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub mock_server: MockServer,
    pub config: AppConfig,
    _db_file: Option<NamedTempFile>,
    _config_dir: Option<TempDir>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

/// Writes a config file pointing every external endpoint at `mock_server`.
pub fn write_test_config(mock_server: &MockServer, db_path: &str, dir: &TempDir) -> Result<AppConfig> {
    let config_path = dir.path().join("config.yml");
    let config_content = format!(
        r#"
port: 0
db_url: "{}"
embedding:
  api_url: "{}"
  model_name: "mock-embedding-model"
providers:
  local_default:
    provider: "local"
    api_url: "{}"
    api_key: null
    model_name: "mock-chat-model"
recommendation:
  provider: "local_default"
  top_k: 5
"#,
        db_path,
        mock_server.url(EMBEDDINGS_PATH),
        mock_server.url(CHAT_PATH)
    );
    let mut file = File::create(&config_path)?;
    file.write_all(config_content.as_bytes())?;

    Ok(config::get_config(Some(config_path.to_str().unwrap()))?)
}

impl TestApp {
    /// Spawns the server with an empty document store.
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with_documents(&[]).await
    }

    /// Spawns the server after ingesting `records` into its document store.
    ///
    /// Every embedding request is answered with the same vector, so retrieval
    /// returns all stored documents.
    pub async fn spawn_with_documents(records: &[Value]) -> Result<Self> {
        let mock_server = MockServer::start_async().await;
        mock_server
            .mock_async(|when, then| {
                when.method(POST).path(EMBEDDINGS_PATH);
                then.status(200)
                    .json_body(json!({ "data": [{ "embedding": [0.1, 0.2, 0.3] }] }));
            })
            .await;

        let db_file = NamedTempFile::new()?;
        let config_dir = tempdir()?;
        let config = write_test_config(
            &mock_server,
            db_file.path().to_str().unwrap(),
            &config_dir,
        )?;

        let store = open_store(&config).await?;
        let records: Vec<CandidateRecord> = records
            .iter()
            .filter_map(|r| r.as_object().cloned())
            .collect();
        store_embeddings(&store, &config.embedding, &records).await?;

        let app_state = build_app_state_with_store(config, store)?;
        let mut app = Self::spawn_with_state(app_state, mock_server).await?;
        app._db_file = Some(db_file);
        app._config_dir = Some(config_dir);
        Ok(app)
    }

    /// Spawns the server around a prepared state, e.g. one holding fakes.
    pub async fn spawn_with_state(app_state: AppState, mock_server: MockServer) -> Result<Self> {
        dotenvy::dotenv().ok();
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let config = app_state.config.as_ref().clone();
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = router::create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Ok(Self {
            address,
            client: Client::new(),
            mock_server,
            config,
            _db_file: None,
            _config_dir: None,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Makes the mocked chat model answer every prompt with `content`.
    pub async fn mock_chat_response(&self, content: &str) -> Mock<'_> {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        });
        self.mock_server
            .mock_async(|when, then| {
                when.method(POST).path(CHAT_PATH);
                then.status(200).json_body(body);
            })
            .await
    }

    /// Posts a profile to `/recommend`.
    pub async fn recommend(&self, profile: &Value) -> Result<reqwest::Response> {
        Ok(self
            .client
            .post(format!("{}/recommend", self.address))
            .json(profile)
            .send()
            .await?)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
