//! Error types for the alert server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use nimbus_alerts::AlertError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors raised outside the request path (startup, scheduler).
#[derive(Debug, Error)]
pub enum ServerError {
    /// A required environment variable is not set.
    #[error("missing required environment variable: {0}")]
    MissingEnv(&'static str),

    /// Failed to bind to the configured address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(std::net::SocketAddr, std::io::Error),

    /// The weather provider rejected its configuration.
    #[error(transparent)]
    Gateway(#[from] nimbus_weather::GatewayError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Request-path error, mapped onto an HTTP status.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub AlertError);

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self.0 {
            AlertError::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            AlertError::Duplicate => (StatusCode::CONFLICT, "duplicate_alert"),
            AlertError::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            AlertError::Gateway(err) => {
                let status = err
                    .upstream_status()
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (status, "upstream_error")
            }
            AlertError::Dispatch { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
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

impl From<nimbus_weather::GatewayError> for ApiError {
    fn from(err: nimbus_weather::GatewayError) -> Self {
        Self(AlertError::Gateway(err))
    }
}
