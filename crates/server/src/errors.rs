use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scholarship_rag::RagError;
use serde_json::json;
use tracing::error;

/// A custom error type for the server application.
///
/// Only collaborator faults reach this type. Unusable model output is a
/// regular response, see `handlers::recommend_handler`.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from `scholarship-rag`.
    Rag(RagError),
}

impl From<RagError> for AppError {
    fn from(err: RagError) -> Self {
        AppError::Rag(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Rag(err) = self;
        error!("RagError: {:?}", err);
        let (status_code, error_message) = match err {
            RagError::AiRequest(e) => (
                StatusCode::BAD_GATEWAY,
                format!("Request to AI provider failed: {e}"),
            ),
            RagError::AiDeserialization(e) => (
                StatusCode::BAD_GATEWAY,
                format!("Failed to deserialize AI provider response: {e}"),
            ),
            RagError::AiApi(e) => (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}")),
            RagError::ReqwestClientBuild(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server is not configured correctly.".to_string(),
            ),
            RagError::StorageConnection(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage provider connection error: {e}"),
            ),
            RagError::StorageOperationFailed(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Storage operation failed: {e}"),
            ),
            RagError::JsonSerialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize data: {e}"),
            ),
            RagError::InvalidInput(_) | RagError::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
