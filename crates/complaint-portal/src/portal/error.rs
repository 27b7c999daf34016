use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::lifecycle::TransitionError;
use crate::store::StoreError;

/// Error raised by the portal service, mapped one-to-one onto HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Transition(TransitionError),
    #[error("internal server error")]
    Store(#[source] StoreError),
}

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::Validation(_) => StatusCode::BAD_REQUEST,
            PortalError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PortalError::Forbidden(_) => StatusCode::FORBIDDEN,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Conflict(_) | PortalError::Transition(_) => StatusCode::CONFLICT,
            PortalError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for PortalError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::DuplicateUsername(_) => {
                PortalError::Conflict("Username already exists".to_string())
            }
            StoreError::ComplaintNotFound(_) | StoreError::WorkerNotFound(_) => {
                PortalError::NotFound(value.to_string())
            }
            StoreError::Transition(err @ TransitionError::NotAssignee { .. }) => {
                PortalError::Forbidden(err.to_string())
            }
            StoreError::Transition(err) => PortalError::Transition(err),
            other => PortalError::Store(other),
        }
    }
}

/// Undecodable bodies, wrong field types, and missing content types all surface as 400.
impl From<JsonRejection> for PortalError {
    fn from(rejection: JsonRejection) -> Self {
        PortalError::Validation(rejection.body_text())
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let PortalError::Store(source) = &self {
            error!(error = %source, "portal request failed");
        }

        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}
