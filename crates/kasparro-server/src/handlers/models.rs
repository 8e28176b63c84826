//! AI engine guide handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use kasparro_core::{AiEngine, GuideEntry};

/// GET /api/models - List guides for every supported engine
pub async fn list_model_guides(State(state): State<Arc<AppState>>) -> Json<Vec<GuideEntry>> {
    Json(state.explanations.catalog().guides())
}

/// GET /api/models/:id - Guide for one engine
pub async fn get_model_guide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GuideEntry>, AppError> {
    AiEngine::parse(&id)
        .and_then(|engine| state.explanations.catalog().guide_entry(engine))
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("Unknown model: {}", id)))
}
