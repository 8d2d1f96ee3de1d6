//! # Application State
//!
//! Defines the shared application state (`AppState`) and builds it once at
//! startup. The retriever and chain inside the pipeline are constructed here,
//! never mutated afterwards, and shared by every request.

use crate::config::{AppConfig, ProviderConfig};
use axum::http::StatusCode;
use scholarship_rag::{
    providers::{
        ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider},
        db::sqlite::SqliteProvider,
    },
    LlmRecommendationChain, RecommendationPipeline, VectorRetriever,
};
use std::sync::Arc;
use tracing::info;

/// The shared application state, accessible from all request handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The application's configuration.
    pub config: Arc<AppConfig>,
    /// The recommendation pipeline with its collaborators.
    pub pipeline: RecommendationPipeline,
    /// Status returned when the model's output cannot be used.
    pub invalid_output_status: StatusCode,
}

impl AppState {
    /// Wraps an already-built pipeline. Tests use this to inject fakes.
    pub fn new(config: AppConfig, pipeline: RecommendationPipeline) -> anyhow::Result<Self> {
        let invalid_output_status =
            StatusCode::from_u16(config.recommendation.invalid_output_status).map_err(|_| {
                anyhow::anyhow!(
                    "Invalid recommendation.invalid_output_status: {}",
                    config.recommendation.invalid_output_status
                )
            })?;
        Ok(Self {
            config: Arc::new(config),
            pipeline,
            invalid_output_status,
        })
    }
}

/// Instantiates the AI provider described by one `providers` entry.
pub fn build_ai_provider(
    name: &str,
    provider_config: &ProviderConfig,
) -> anyhow::Result<Box<dyn AiProvider>> {
    let provider: Box<dyn AiProvider> = match provider_config.provider.as_str() {
        "gemini" => {
            let api_key = provider_config
                .api_key
                .clone()
                .filter(|key| !key.is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!("api_key is required for gemini provider '{name}'")
                })?;
            let api_url = provider_config
                .api_url
                .clone()
                .unwrap_or_else(|| GeminiProvider::default_api_url(&provider_config.model_name));
            Box::new(GeminiProvider::new(api_url, api_key)?)
        }
        "local" => {
            let api_url = provider_config
                .api_url
                .clone()
                .filter(|url| !url.is_empty())
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "api_url is required for local provider '{name}'. Please set LOCAL_AI_API_URL in your .env file."
                    )
                })?;
            Box::new(LocalAiProvider::new(
                api_url,
                provider_config.api_key.clone().filter(|key| !key.is_empty()),
                Some(provider_config.model_name.clone()),
            )?)
        }
        other => {
            return Err(anyhow::anyhow!(
                "Unsupported AI provider type '{other}' for provider '{name}'"
            ));
        }
    };
    Ok(provider)
}

/// Picks the provider entry the recommendation chain should use.
fn resolve_recommendation_provider(
    config: &AppConfig,
) -> anyhow::Result<(&str, &ProviderConfig)> {
    match &config.recommendation.provider {
        Some(name) => config
            .providers
            .get_key_value(name)
            .map(|(name, provider)| (name.as_str(), provider))
            .ok_or_else(|| {
                anyhow::anyhow!("recommendation.provider '{name}' is not defined in providers")
            }),
        None if config.providers.len() == 1 => config
            .providers
            .iter()
            .next()
            .map(|(name, provider)| (name.as_str(), provider))
            .ok_or_else(|| anyhow::anyhow!("no providers configured")),
        None => Err(anyhow::anyhow!(
            "recommendation.provider must be set when {} providers are configured",
            config.providers.len()
        )),
    }
}

/// Opens the document store and creates any missing tables.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<SqliteProvider> {
    let store = SqliteProvider::new(&config.db_url).await?;
    info!(db_path = %config.db_url, "Initialized scholarship document store (SQLite).");
    store.initialize_schema().await?;
    Ok(store)
}

/// Builds the shared application state from the configuration.
///
/// - Opens the SQLite document store and ensures its schema.
/// - Instantiates the AI provider chosen by `recommendation.provider`.
/// - Wires both into a `RecommendationPipeline`.
pub async fn build_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = open_store(&config).await?;
    build_app_state_with_store(config, store)
}

/// Builds the application state around an already-opened document store.
pub fn build_app_state_with_store(
    config: AppConfig,
    store: SqliteProvider,
) -> anyhow::Result<AppState> {
    let retriever = VectorRetriever::new(
        store,
        config.embedding.clone(),
        config.recommendation.top_k,
    )?;

    let (provider_name, provider_config) = resolve_recommendation_provider(&config)?;
    let ai_provider = build_ai_provider(provider_name, provider_config)?;
    info!(
        provider = %provider_name,
        model = %provider_config.model_name,
        "Initialized recommendation provider."
    );
    let chain = LlmRecommendationChain::new(
        ai_provider,
        config.recommendation.system_prompt.clone(),
        config.recommendation.user_prompt.clone(),
    );

    let pipeline = RecommendationPipeline::new(Arc::new(retriever), Arc::new(chain));
    AppState::new(config, pipeline)
}
