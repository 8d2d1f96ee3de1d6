//! # API Route Handlers

use crate::{errors::AppError, state::AppState};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scholarship_rag::{RecommendationResult, UserInput};
use tracing::{info, warn};

/// The handler for the root (`/`) endpoint.
pub async fn root() -> &'static str {
    "scholarship-rag server is running."
}

/// The handler for the health check (`/health`) endpoint.
pub async fn health_check() -> &'static str {
    "OK"
}

/// The handler for `POST /recommend`.
///
/// Returns `{"recommendations": [...]}` with 200, or `{"error", "raw_output"}`
/// with the configured status when the model's output cannot be used.
pub async fn recommend_handler(
    State(app_state): State<AppState>,
    Json(user_input): Json<UserInput>,
) -> Result<Response, AppError> {
    info!(fields = user_input.fields().len(), "Received recommendation request.");

    let result = app_state.pipeline.recommend(&user_input).await?;

    let status = match &result {
        RecommendationResult::Recommendations { recommendations } => {
            info!(count = recommendations.len(), "Returning recommendations.");
            StatusCode::OK
        }
        RecommendationResult::InvalidOutput { error, .. } => {
            warn!(%error, "Model output could not be used.");
            app_state.invalid_output_status
        }
    };

    Ok((status, Json(result)).into_response())
}
