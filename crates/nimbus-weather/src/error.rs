//! Error types for the nimbus-weather crate.

use thiserror::Error;

/// Errors from the weather provider gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The upstream provider answered with a non-success status.
    #[error("upstream weather provider failed ({operation} for {city}): {message}")]
    Upstream {
        /// The city the request was for.
        city: String,
        /// The gateway operation that failed.
        operation: &'static str,
        /// The upstream HTTP status, when one was received.
        status: Option<u16>,
        /// The upstream error message.
        message: String,
    },

    /// The request never completed (timeout, DNS, connection reset).
    #[error("weather request failed ({operation} for {city}): {source}")]
    Request {
        /// The city the request was for.
        city: String,
        /// The gateway operation that failed.
        operation: &'static str,
        /// The transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered 2xx but the payload was not in the expected shape.
    #[error("malformed weather payload ({operation} for {city}): {reason}")]
    MalformedResponse {
        /// The city the request was for.
        city: String,
        /// The gateway operation that failed.
        operation: &'static str,
        /// What was wrong with the payload.
        reason: String,
    },

    /// No provider API key is configured.
    #[error("weather provider API key is not configured")]
    MissingApiKey,
}

impl GatewayError {
    /// Returns the upstream HTTP status code, when the failure carried one.
    #[must_use]
    pub const fn upstream_status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns the city the failed request was for, if any.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        match self {
            Self::Upstream { city, .. }
            | Self::Request { city, .. }
            | Self::MalformedResponse { city, .. } => Some(city),
            Self::MissingApiKey => None,
        }
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
