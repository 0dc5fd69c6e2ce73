use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use database::services::{ErrorCategory, ServiceError};
use log::error;
use models::validation::{FieldError, ValidationErrors};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Body of every failed request
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Stable identifier such as `RoomAlreadyTaken`
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
    /// Name of the record standing in the way
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicting_entity: Option<String>,
    /// Every field problem, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authentication required")]
    Unauthorized,
    #[error("{0}")]
    MalformedBody(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Service(ServiceError::ValidationFailed(errors))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::Service(err) => match err.category() {
                ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                ErrorCategory::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCategory::Conflict => StatusCode::CONFLICT,
                ErrorCategory::NoOp => StatusCode::BAD_REQUEST,
                ErrorCategory::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            Self::Unauthorized => ErrorResponse {
                kind: "Unauthorized".into(),
                field: None,
                message: "You must be signed in to do this.".into(),
                conflicting_entity: None,
                errors: None,
            },
            Self::MalformedBody(detail) => ErrorResponse {
                kind: "MalformedBody".into(),
                field: None,
                message: detail.clone(),
                conflicting_entity: None,
                errors: None,
            },
            Self::Service(err) if err.category() == ErrorCategory::Unexpected => ErrorResponse {
                kind: "Unexpected".into(),
                field: None,
                message: "Something went wrong, please try again later.".into(),
                conflicting_entity: None,
                errors: None,
            },
            Self::Service(err) => ErrorResponse {
                kind: err.kind().into(),
                field: err.field().map(str::to_string),
                message: err.to_string(),
                conflicting_entity: err.conflicting_entity().map(str::to_string),
                errors: match err {
                    ServiceError::ValidationFailed(errors) => Some(errors.errors.clone()),
                    _ => None,
                },
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Service(err) = &self
            && err.category() == ErrorCategory::Unexpected
        {
            error!("Request failed: {err}");
        }

        (self.status(), Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_status_by_category() {
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(ServiceError::RoomNotFound(Uuid::nil())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ValidationErrors::single("name", "Name is required.")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::from(ServiceError::ConcurrentModification).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::from(ServiceError::NoChangesDetected).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_unexpected_errors_hide_details() {
        let err = AppError::from(ServiceError::Database(sea_orm::DbErr::Custom(
            "password authentication failed for user admin".into(),
        )));
        let body = err.body();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.kind, "Unexpected");
        assert!(!body.message.contains("admin"));
    }

    #[test]
    fn test_validation_body_lists_fields() {
        let body = AppError::from(ValidationErrors::single("capacity", "Too big.")).body();
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["kind"], "ValidationFailed");
        assert_eq!(json["field"], "capacity");
        assert_eq!(json["errors"][0]["message"], "Too big.");
        assert!(json.get("conflictingEntity").is_none());
    }
}
