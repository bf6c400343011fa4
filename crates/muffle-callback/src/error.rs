//! Error types for the callback endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for callback operations.
pub type CallbackResult<T> = Result<T, CallbackError>;

/// Errors that can occur in the callback endpoint.
#[derive(Debug, Error)]
pub enum CallbackError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The inbound body could not be parsed into actions.
    #[error("payload parse failed: {0}")]
    PayloadParse(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for CallbackError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::PayloadParse(_) => (StatusCode::BAD_REQUEST, "payload_parse"),
            Self::BindFailed(_, _) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}
