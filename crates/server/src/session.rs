use crate::error::AppError;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::fmt::{Display, Formatter, Result as FmtResult};
use tower_oauth2_resource_server::claims::DefaultClaims;

/// The authenticated caller of a mutating request.
///
/// Taken from a `Session` request extension when an upstream layer provides
/// one, otherwise from the subject of the validated bearer token. Handlers
/// that take it as their first argument reject anonymous requests with 401
/// before the body is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub subject: String,
}

impl Session {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }
}

impl Display for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.subject)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Session>() {
            return Ok(session.clone());
        }

        parts
            .extensions
            .get::<DefaultClaims>()
            .and_then(|claims| claims.sub.clone())
            .map(Session::new)
            .ok_or(AppError::Unauthorized)
    }
}
