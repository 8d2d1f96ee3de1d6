//! # Recommendation Chain
//!
//! The `RecommendationChain` seam and its production implementation, which
//! renders a prompt from the chain payload and asks an `AiProvider` for a
//! selection.

use crate::{errors::RagError, providers::ai::AiProvider, types::ChainOutput};
use async_trait::async_trait;
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::{fmt::Debug, sync::LazyLock};
use tracing::debug;

/// Produces the model's selection for one request.
///
/// The output carries no schema guarantee. The pipeline validates it.
#[async_trait]
pub trait RecommendationChain: Send + Sync + Debug {
    async fn invoke(&self, payload: &Map<String, Value>) -> Result<ChainOutput, RagError>;
}

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("placeholder pattern is valid")
});

/// Replaces `{key}` placeholders with payload values.
///
/// Strings are inserted verbatim and other values as JSON text. Placeholders
/// without a matching key are left untouched.
pub fn render_template(template: &str, payload: &Map<String, Value>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match payload.get(&caps[1]) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// A chain backed by a single LLM call.
#[derive(Debug, Clone)]
pub struct LlmRecommendationChain {
    ai_provider: Box<dyn AiProvider>,
    system_prompt: String,
    user_prompt_template: String,
}

impl LlmRecommendationChain {
    pub fn new(
        ai_provider: Box<dyn AiProvider>,
        system_prompt: impl Into<String>,
        user_prompt_template: impl Into<String>,
    ) -> Self {
        Self {
            ai_provider,
            system_prompt: system_prompt.into(),
            user_prompt_template: user_prompt_template.into(),
        }
    }
}

#[async_trait]
impl RecommendationChain for LlmRecommendationChain {
    async fn invoke(&self, payload: &Map<String, Value>) -> Result<ChainOutput, RagError> {
        let system_prompt = render_template(&self.system_prompt, payload);
        let user_prompt = render_template(&self.user_prompt_template, payload);
        debug!(user_prompt = %user_prompt, "Invoking recommendation chain.");
        let text = self.ai_provider.generate(&system_prompt, &user_prompt).await?;
        Ok(ChainOutput::Text(text))
    }
}
