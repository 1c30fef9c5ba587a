//! Error types for vaip-as
//!
//! Every failure reaches the client as `{"success": false, "error": ...}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::LiveFeedError;

/// Message returned for unmatched routes
pub const NOT_FOUND_MESSAGE: &str = "Endpoint not found";

/// Message returned for unexpected failures
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("{0}")]
    NotFound(String),

    /// Live feed down with nothing cached (503)
    #[error("{0}")]
    Unavailable(String),

    /// Internal server error (500), details only logged
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<LiveFeedError> for ApiError {
    fn from(err: LiveFeedError) -> Self {
        ApiError::Unavailable(err.to_string())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                INTERNAL_MESSAGE.to_string()
            }
            other => other.to_string(),
        };

        error_envelope(status, &message)
    }
}

/// `{success: false, error}` response with the given status
fn error_envelope(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "error": message,
    }));

    (status, body).into_response()
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
