use crate::{error::AppError, session::Session};
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    /// Subject of the caller's token
    pub subject: String,
}

/// Who the API thinks the caller is
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Authenticated caller", body = MeResponse),
        (status = 401, description = "Not signed in", body = crate::error::ErrorResponse)
    ),
    security(("jwt" = [])),
    tag = "Authentication"
)]
pub async fn me(session: Session) -> Result<Json<MeResponse>, AppError> {
    Ok(Json(MeResponse {
        subject: session.subject,
    }))
}
