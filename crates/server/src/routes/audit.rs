use crate::{
    dtos::audit::{AuditResponse, ViolationResponse},
    error::{AppError, ErrorResponse},
    state::AppState,
};
use axum::{Json, extract::State};
use database::services::audit::AuditService;
use log::warn;

/// Re-check every stored lesson against the scheduling rules
#[utoipa::path(
    get,
    path = "/audit",
    responses(
        (status = 200, description = "Violations found, empty when the timetable is consistent", body = AuditResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Audit"
)]
pub async fn audit(State(state): State<AppState>) -> Result<Json<AuditResponse>, AppError> {
    let violations = AuditService::run(&state.db).await?;
    if !violations.is_empty() {
        warn!("Audit found {} violation(s)", violations.len());
    }

    Ok(Json(AuditResponse {
        healthy: violations.is_empty(),
        violations: violations.into_iter().map(ViolationResponse::from).collect(),
    }))
}
