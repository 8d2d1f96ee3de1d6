pub mod embedding;
pub mod gemini;
pub mod local;

use crate::errors::RagError;
use async_trait::async_trait;
use dyn_clone::DynClone;
pub use embedding::{generate_embedding, EmbeddingApi, EmbeddingSettings};
use std::fmt::Debug;

/// A trait for interacting with an AI provider.
///
/// Implementations send a system and a user prompt to a language model and
/// return its raw text answer.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, RagError>;
}

dyn_clone::clone_trait_object!(AiProvider);
