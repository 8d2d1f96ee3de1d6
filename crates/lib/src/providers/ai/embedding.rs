//! # Embeddings Provider
//!
//! Generates vector embeddings by calling an external OpenAI-compatible or
//! Gemini embeddings API. Used both to embed scholarship documents at ingest
//! time and to embed the formatted profile query at request time.

use crate::errors::RagError;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

const GEMINI_HOST: &str = "generativelanguage.googleapis.com";

/// The wire format spoken by an embeddings endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingApi {
    /// `POST {model, input}` answered by `{data: [{embedding}]}`.
    OpenAi,
    /// `embedContent`, answered by `{embedding: {values}}`.
    Gemini,
}

/// Where and how to reach the embeddings API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    pub api_url: String,
    pub model_name: String,
    #[serde(default)]
    pub api_key: Option<String>,
    /// Wire format. Inferred from `api_url` when unset.
    #[serde(default)]
    pub api: Option<EmbeddingApi>,
}

impl EmbeddingSettings {
    /// The wire format to use for `api_url`.
    pub fn api(&self) -> EmbeddingApi {
        match self.api {
            Some(api) => api,
            None if self.api_url.contains(GEMINI_HOST) => EmbeddingApi::Gemini,
            None => EmbeddingApi::OpenAi,
        }
    }

    /// Gemini wants the model as a `models/...` resource name.
    fn gemini_model_name(&self) -> String {
        if self.model_name.starts_with("models/") {
            self.model_name.clone()
        } else {
            format!("models/{}", self.model_name)
        }
    }
}

#[derive(Serialize, Debug)]
struct OpenAiEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize, Debug)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize, Debug)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbedRequest<'a> {
    model: String,
    content: GeminiEmbedContent<'a>,
}

#[derive(Serialize, Debug)]
struct GeminiEmbedContent<'a> {
    parts: [GeminiEmbedPart<'a>; 1],
}

#[derive(Serialize, Debug)]
struct GeminiEmbedPart<'a> {
    text: &'a str,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbedValues,
}

#[derive(Deserialize, Debug)]
struct GeminiEmbedValues {
    values: Vec<f32>,
}

fn build_request(
    client: &ReqwestClient,
    settings: &EmbeddingSettings,
    api: EmbeddingApi,
    input: &str,
) -> RequestBuilder {
    let builder = client.post(&settings.api_url);
    match api {
        EmbeddingApi::OpenAi => {
            let body = OpenAiEmbeddingRequest {
                model: &settings.model_name,
                input,
            };
            debug!(payload = ?body, "--> Sending request to OpenAI-compatible Embeddings API");
            let builder = builder.json(&body);
            match &settings.api_key {
                Some(key) => builder.bearer_auth(key),
                None => builder,
            }
        }
        EmbeddingApi::Gemini => {
            let body = GeminiEmbedRequest {
                model: settings.gemini_model_name(),
                content: GeminiEmbedContent {
                    parts: [GeminiEmbedPart { text: input }],
                },
            };
            debug!(payload = ?body, "--> Sending request to Gemini Embeddings API");
            let builder = builder.json(&body);
            match &settings.api_key {
                Some(key) => builder.header("x-goog-api-key", key),
                None => builder,
            }
        }
    }
}

/// Generates a vector embedding for a given text input using an external API.
///
/// The client is passed in so callers embedding many texts share one
/// connection pool.
pub async fn generate_embedding(
    client: &ReqwestClient,
    settings: &EmbeddingSettings,
    input: &str,
) -> Result<Vec<f32>, RagError> {
    let api = settings.api();
    let response = build_request(client, settings, api, input)
        .send()
        .await
        .map_err(RagError::AiRequest)?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(RagError::AiApi(error_text));
    }

    match api {
        EmbeddingApi::OpenAi => {
            let parsed: OpenAiEmbeddingResponse = response
                .json()
                .await
                .map_err(RagError::AiDeserialization)?;
            parsed
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .ok_or_else(|| {
                    RagError::AiApi("OpenAI-compatible API returned no embeddings".to_string())
                })
        }
        EmbeddingApi::Gemini => {
            let parsed: GeminiEmbedResponse = response
                .json()
                .await
                .map_err(RagError::AiDeserialization)?;
            Ok(parsed.embedding.values)
        }
    }
}
