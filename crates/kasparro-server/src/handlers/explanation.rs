//! AI explanation handlers

use std::sync::Arc;

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use tracing::{debug, error};

use crate::{AppError, AppState};
use kasparro_core::{Error, ExplanationRequest, ExplanationResponse, HealthStatus};

/// GET /api/ai-explanation - Health check
pub async fn explanation_health(State(state): State<Arc<AppState>>) -> Json<HealthStatus> {
    Json(state.explanations.health())
}

/// POST /api/ai-explanation - Generate an explanation
///
/// Provider error statuses are passed through; transport failures and
/// unusable provider replies produce a 200 with the fallback explanation.
pub async fn generate_explanation(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ExplanationResponse>, AppError> {
    let request: ExplanationRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request("Invalid request body").with_details(e.to_string()))?;

    debug!(
        insight_type = %request.insight_type,
        model = request.resolved_model(),
        "Explanation requested"
    );

    match state.explanations.try_generate(&request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => match e {
            Error::Validation(msg) => Err(AppError::bad_request("Invalid request").with_details(msg)),
            Error::Configuration(msg) => Err(AppError::internal(&msg)),
            Error::Provider { status, details } => {
                error!(status, details = %details, "Provider API error");
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
                Err(AppError::new(status, "Failed to generate explanation").with_details(details))
            }
            other => Ok(Json(state.explanations.fallback_response(&request, &other))),
        },
    }
}
