//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::google::MailError;

// Errors

/// Error returned by every handler. Rendered as `{"error": "..."}` with a
/// status derived from the kind of failure.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{} {}", self.status, self.message);

        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

pub fn status_for(err: &MailError) -> StatusCode {
    match err {
        MailError::AuthConfig(_)
        | MailError::AuthExchange(_)
        | MailError::Validation(_)
        | MailError::CredentialStore(_) => StatusCode::BAD_REQUEST,
        MailError::Unauthenticated => StatusCode::UNAUTHORIZED,
        MailError::Provider(_) => StatusCode::BAD_GATEWAY,
        MailError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        Self {
            status: status_for(&err),
            message: err.to_string(),
        }
    }
}

/// Anything unexpected is a 500
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Something went wrong: {}", err),
        }
    }
}

// Re-export public types from each route

pub mod gmail {
    pub use crate::api::routes::gmail::public::*;
}
