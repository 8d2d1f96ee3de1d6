//! # Application Configuration
//!
//! Defines the configuration structure for `scholarship-rag-server` and loads
//! it from layered sources:
//!
//! 1. Programmatic defaults (the library's prompt templates, `top_k`, status).
//! 2. A main YAML file: `config.yml`, or `config.<AI_PROVIDER>.yml` as fallback.
//!    `${VAR}` tokens in the file are replaced from the environment.
//! 3. Plain environment variables for top-level keys (`PORT`, `DB_URL`).
//! 4. Prefixed environment variables for nested keys, e.g.
//!    `SCHOLARSHIP_RAG_RECOMMENDATION__TOP_K=8`.

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use regex::Regex;
use scholarship_rag::{
    prompts::{RECOMMENDATION_SYSTEM_PROMPT, RECOMMENDATION_USER_PROMPT},
    providers::ai::EmbeddingSettings,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use tracing::info;

/// A custom error type for configuration issues.
#[derive(Debug)]
pub enum ConfigError {
    /// Indicates an error from the underlying `config` crate.
    General(String),
    /// Indicates a required configuration file was not found.
    NotFound(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::General(msg) => write!(f, "Configuration error: {msg}"),
            ConfigError::NotFound(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::General(err.to_string())
    }
}

/// The root configuration structure, mapping directly to `config.yml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// The port for the server to listen on. Loaded from `PORT` env var.
    #[serde(default = "default_port")]
    pub port: u16,
    /// The path to the SQLite document store. Loaded from `DB_URL` env var.
    #[serde(default = "default_db_url")]
    pub db_url: String,
    /// The embeddings API used for both ingestion and retrieval.
    pub embedding: EmbeddingSettings,
    /// A map of named, reusable AI provider configurations.
    pub providers: HashMap<String, ProviderConfig>,
    /// Settings for the `/recommend` pipeline.
    pub recommendation: RecommendationConfig,
}

fn default_port() -> u16 {
    9090
}

fn default_db_url() -> String {
    "db/scholarships.db".to_string()
}

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Settings for the recommendation pipeline.
#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    /// The key of the provider to use from the `providers` map. May be left
    /// out when exactly one provider is configured.
    #[serde(default)]
    pub provider: Option<String>,
    pub system_prompt: String,
    pub user_prompt: String,
    /// How many documents to retrieve per request.
    pub top_k: u32,
    /// HTTP status returned when the model's output cannot be used.
    pub invalid_output_status: u16,
}

// Reads a file and substitutes `${VAR}` tokens from the environment.
// Returns Ok(None) if the file does not exist.
fn read_and_substitute(path: &str) -> Result<Option<String>, ConfigError> {
    if !std::path::Path::new(path).exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::General(format!("Failed to read config file '{path}': {e}")))?;

    let re = Regex::new(r"\$\{(?P<var>[A-Z0-9_]+)\}")
        .map_err(|e| ConfigError::General(e.to_string()))?;
    let expanded_content = re.replace_all(&content, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_default()
    });

    Ok(Some(expanded_content.to_string()))
}

/// Loads the application configuration from a file and environment variables.
///
/// `config_path_override` skips the `config.yml` / `config.<AI_PROVIDER>.yml`
/// lookup and reads the given file instead.
pub fn get_config(config_path_override: Option<&str>) -> Result<AppConfig, ConfigError> {
    let base_path = env!("CARGO_MANIFEST_DIR");
    let mut builder = ConfigBuilder::builder()
        // Layer 1: Programmatic defaults from the library.
        .set_default("recommendation.system_prompt", RECOMMENDATION_SYSTEM_PROMPT)?
        .set_default("recommendation.user_prompt", RECOMMENDATION_USER_PROMPT)?
        .set_default("recommendation.top_k", 5)?
        .set_default("recommendation.invalid_output_status", 422)?;

    // Layer 2: Main Config (with Fallback)
    let main_config_path = if let Some(override_path) = config_path_override {
        override_path.to_string()
    } else {
        let user_config_path = format!("{base_path}/config.yml");
        if std::path::Path::new(&user_config_path).exists() {
            info!("Loading user-defined configuration from '{user_config_path}'.");
            user_config_path
        } else {
            let provider = env::var("AI_PROVIDER").unwrap_or_else(|_| "local".to_string());
            let fallback_path = format!("{base_path}/config.{provider}.yml");
            info!("'{user_config_path}' not found. Falling back to '{fallback_path}' based on AI_PROVIDER='{provider}'.");
            fallback_path
        }
    };

    let main_content = read_and_substitute(&main_config_path)?
        .ok_or_else(|| ConfigError::NotFound(format!("Main config file not found at '{main_config_path}'. Please ensure 'config.yml' exists or your AI_PROVIDER is set to load a valid template ('local' or 'gemini').")))?;
    builder = builder.add_source(File::from_str(&main_content, FileFormat::Yaml));

    let settings = builder
        // Layer 3: Environment variables for top-level keys like PORT.
        .add_source(Environment::default())
        // Layer 4: Prefixed environment variables for nested overrides.
        .add_source(
            Environment::with_prefix("SCHOLARSHIP_RAG")
                .prefix_separator("_")
                .try_parsing(true)
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
