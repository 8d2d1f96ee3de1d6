//! # Scholarship Recommendation
//!
//! Retrieval-augmented scholarship recommendation. A requester's profile is
//! turned into a query, relevant scholarship documents are retrieved from a
//! vector store, a language model picks and ranks the matches, and the
//! pipeline returns the chosen scholarship identifiers.
//!
//! The retriever and the chain are traits so that the production
//! implementations (`VectorRetriever`, `LlmRecommendationChain`) can be
//! swapped for fakes in tests.

pub mod chain;
pub mod errors;
pub mod extract;
pub mod ingest;
pub mod normalize;
pub mod pipeline;
pub mod prompts;
pub mod providers;
pub mod query;
pub mod retriever;
pub mod types;

pub use chain::{LlmRecommendationChain, RecommendationChain};
pub use errors::RagError;
pub use pipeline::RecommendationPipeline;
pub use retriever::{Retriever, VectorRetriever};
pub use types::{CandidateRecord, ChainOutput, RecommendationResult, RetrievedDocument, UserInput};
