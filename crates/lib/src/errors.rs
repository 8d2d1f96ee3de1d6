use thiserror::Error;

/// Custom error types for the recommendation library.
///
/// Only collaborator faults end up here. Malformed documents, unusable model
/// output and bad identifiers are absorbed by the pipeline itself.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Invalid input data: {0}")]
    InvalidInput(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<turso::Error> for RagError {
    fn from(err: turso::Error) -> Self {
        RagError::StorageOperationFailed(err.to_string())
    }
}
