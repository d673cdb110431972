//! Error types for the nimbus-alerts crate.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur in the alerting system.
#[derive(Debug, Error)]
pub enum AlertError {
    /// The alert spec is invalid (user-correctable).
    #[error("invalid alert: {reason}")]
    Validation {
        /// Why the spec was rejected.
        reason: String,
    },

    /// An active alert with the identical spec tuple already exists.
    #[error("an alert with these exact conditions already exists")]
    Duplicate,

    /// No active alert with the given id.
    #[error("alert not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: Uuid,
    },

    /// The weather provider failed; affects evaluation passes only.
    #[error(transparent)]
    Gateway(#[from] nimbus_weather::GatewayError),

    /// Notification delivery failed. Always logged and swallowed by the
    /// engine; never allowed to corrupt persisted evaluation state.
    #[error("notification dispatch failed: {reason}")]
    Dispatch {
        /// Why delivery failed.
        reason: String,
    },
}

/// Result type for alert operations.
pub type Result<T> = std::result::Result<T, AlertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_display() {
        let err = AlertError::Validation {
            reason: "city must not be empty".to_string(),
        };
        assert_eq!(err.to_string(), "invalid alert: city must not be empty");
    }

    #[test]
    fn duplicate_display() {
        assert_eq!(
            AlertError::Duplicate.to_string(),
            "an alert with these exact conditions already exists"
        );
    }

    #[test]
    fn not_found_display() {
        let id = Uuid::nil();
        let err = AlertError::NotFound { id };
        assert_eq!(
            err.to_string(),
            format!("alert not found: {id}")
        );
    }

    #[test]
    fn gateway_error_is_transparent() {
        let err: AlertError = nimbus_weather::GatewayError::MissingApiKey.into();
        assert_eq!(
            err.to_string(),
            "weather provider API key is not configured"
        );
    }
}
