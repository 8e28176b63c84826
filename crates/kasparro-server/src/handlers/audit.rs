//! Audit module handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use kasparro_core::{AuditModuleData, ModuleId, ModuleMetadata, ModuleSummary};

/// GET /api/audit/modules - Navigation metadata for all modules
pub async fn list_audit_modules(State(state): State<Arc<AppState>>) -> Json<Vec<ModuleMetadata>> {
    Json(state.audit.modules().to_vec())
}

/// GET /api/audit/summary - Score overview across modules
pub async fn audit_summary(State(state): State<Arc<AppState>>) -> Json<Vec<ModuleSummary>> {
    Json(state.audit.summary())
}

/// GET /api/audit/:module_id - Full audit document for one module
pub async fn get_audit_module(
    State(state): State<Arc<AppState>>,
    Path(module_id): Path<String>,
) -> Result<Json<AuditModuleData>, AppError> {
    let id: ModuleId = module_id
        .parse()
        .map_err(|_| AppError::not_found(&format!("Unknown audit module: {}", module_id)))?;
    state
        .audit
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::not_found(&format!("No audit data for module: {}", id)))
}
