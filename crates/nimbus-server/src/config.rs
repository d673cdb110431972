//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::{ServerError, ServerResult};

/// Default evaluation interval between passes.
pub const DEFAULT_EVALUATION_INTERVAL: Duration = Duration::from_secs(3600);

/// Sender address used when `FROM_EMAIL` is not set.
pub const DEFAULT_FROM_EMAIL: &str = "alerts@weather-system.com";

/// Weather provider settings.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    /// Provider API key.
    pub api_key: String,
    /// Provider base URL override; `None` uses the provider default.
    pub base_url: Option<String>,
    /// Forecast lookout window in hours.
    pub forecast_hours: u32,
    /// TTL for cached current conditions.
    pub cache_ttl: Duration,
}

impl WeatherConfig {
    /// Creates provider settings with defaults around the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            forecast_hours: nimbus_weather::DEFAULT_FORECAST_HOURS,
            cache_ttl: Duration::from_secs(nimbus_weather::cache::DEFAULT_TTL_SECS as u64),
        }
    }

    /// Override the provider base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the forecast lookout window.
    #[must_use]
    pub const fn with_forecast_hours(mut self, hours: u32) -> Self {
        self.forecast_hours = hours;
        self
    }

    /// Set the conditions cache TTL.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Configuration for the alert server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP server to.
    pub bind_addr: SocketAddr,
    /// CORS allowed origins (empty means all).
    pub cors_origins: Vec<String>,
    /// Time between evaluation passes.
    pub evaluation_interval: Duration,
    /// Weather provider settings.
    pub weather: WeatherConfig,
    /// SendGrid API key; emails are logged instead of sent when absent.
    pub sendgrid_api_key: Option<String>,
    /// Sender address for alert emails.
    pub from_email: String,
}

impl ServerConfig {
    /// Creates a configuration with defaults around the given provider key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            cors_origins: Vec::new(),
            evaluation_interval: DEFAULT_EVALUATION_INTERVAL,
            weather: WeatherConfig::new(api_key),
            sendgrid_api_key: None,
            from_email: DEFAULT_FROM_EMAIL.to_string(),
        }
    }

    /// Builds the configuration from the process environment.
    ///
    /// `TOMORROW_IO_API_KEY` is required; `SENDGRID_API_KEY` and
    /// `FROM_EMAIL` are optional.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::MissingEnv`] when the provider key is absent.
    pub fn from_env() -> ServerResult<Self> {
        let api_key = std::env::var("TOMORROW_IO_API_KEY")
            .map_err(|_| ServerError::MissingEnv("TOMORROW_IO_API_KEY"))?;

        let mut config = Self::new(api_key);
        if let Ok(key) = std::env::var("SENDGRID_API_KEY") {
            if !key.is_empty() {
                config.sendgrid_api_key = Some(key);
            }
        }
        if let Ok(from) = std::env::var("FROM_EMAIL") {
            if !from.is_empty() {
                config.from_email = from;
            }
        }
        Ok(config)
    }

    /// Set the bind address.
    #[must_use]
    pub const fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Add a CORS allowed origin.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origins.push(origin.into());
        self
    }

    /// Set the time between evaluation passes.
    #[must_use]
    pub const fn with_evaluation_interval(mut self, interval: Duration) -> Self {
        self.evaluation_interval = interval;
        self
    }

    /// Set the SendGrid API key.
    #[must_use]
    pub fn with_sendgrid_api_key(mut self, key: impl Into<String>) -> Self {
        self.sendgrid_api_key = Some(key.into());
        self
    }

    /// Set the sender address for alert emails.
    #[must_use]
    pub fn with_from_email(mut self, from: impl Into<String>) -> Self {
        self.from_email = from.into();
        self
    }
}
