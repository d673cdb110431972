//! HTTP client for the upstream weather provider.
//!
//! Talks to a Tomorrow.io-style v4 API: `/weather/realtime` for the current
//! observation and `/timelines` for the hourly forecast. Field selection is
//! driven by [`WeatherParameter`] so callers pay only for what they need.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, error};

use crate::error::{GatewayError, Result};
use crate::types::{CurrentConditions, ForecastPoint, WeatherParameter, DEFAULT_PARAMETERS};

/// Default provider endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.tomorrow.io/v4";

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`ProviderClient`].
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider API key.
    pub api_key: String,
    /// Base URL of the provider API.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Creates a configuration for the default provider endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Overrides the base URL (used against stub servers in tests).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Overrides the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Reqwest-backed client for the weather provider API.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl ProviderClient {
    /// Creates a client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::MissingApiKey`] if the key is empty.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            config,
        })
    }

    /// Fetches the current observation for a city.
    pub async fn realtime(
        &self,
        city: &str,
        parameters: &[WeatherParameter],
    ) -> Result<CurrentConditions> {
        const OPERATION: &str = "current conditions";

        let url = format!("{}/weather/realtime", self.config.base_url);
        debug!(city = %city, "fetching current weather");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .query(&[
                ("location", city),
                ("apikey", self.config.api_key.as_str()),
                ("fields", &fields_param(parameters)),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|source| GatewayError::Request {
                city: city.to_string(),
                operation: OPERATION,
                source,
            })?;

        let body: RealtimeResponse = decode(response, city, OPERATION).await?;

        Ok(CurrentConditions {
            city: city.to_string(),
            observed_at: body.data.time.unwrap_or_else(Utc::now),
            values: convert_values(&body.data.values),
        })
    }

    /// Fetches the hourly forecast for a city, covering `hours` hours ahead.
    pub async fn timelines(
        &self,
        city: &str,
        parameters: &[WeatherParameter],
        hours: u32,
    ) -> Result<Vec<ForecastPoint>> {
        const OPERATION: &str = "hourly forecast";

        let url = format!("{}/timelines", self.config.base_url);
        let end_time = (Utc::now() + chrono::Duration::hours(i64::from(hours))).to_rfc3339();
        debug!(city = %city, hours = hours, "fetching hourly forecast");

        let response = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .query(&[
                ("location", city),
                ("apikey", self.config.api_key.as_str()),
                ("fields", &fields_param(parameters)),
                ("timesteps", "1h"),
                ("endTime", &end_time),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|source| GatewayError::Request {
                city: city.to_string(),
                operation: OPERATION,
                source,
            })?;

        let body: TimelinesResponse = decode(response, city, OPERATION).await?;

        let timeline = body
            .data
            .timelines
            .into_iter()
            .next()
            .ok_or_else(|| GatewayError::MalformedResponse {
                city: city.to_string(),
                operation: OPERATION,
                reason: "response contains no timelines".to_string(),
            })?;

        Ok(timeline
            .intervals
            .into_iter()
            .map(|interval| ForecastPoint::new(interval.start_time, convert_values(&interval.values)))
            .collect())
    }
}

/// Builds the comma-separated `fields` query parameter.
fn fields_param(parameters: &[WeatherParameter]) -> String {
    let parameters = if parameters.is_empty() {
        DEFAULT_PARAMETERS
    } else {
        parameters
    };
    parameters
        .iter()
        .map(|p| p.api_name())
        .collect::<Vec<_>>()
        .join(",")
}

/// Keeps the numeric fields we know about, dropping nulls and unknown keys.
fn convert_values(raw: &HashMap<String, serde_json::Value>) -> HashMap<WeatherParameter, f64> {
    raw.iter()
        .filter_map(|(name, value)| {
            let parameter = WeatherParameter::from_api_name(name)?;
            Some((parameter, value.as_f64()?))
        })
        .collect()
}

/// Checks the status and decodes the JSON body, mapping failures to
/// [`GatewayError`].
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    city: &str,
    operation: &'static str,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response
            .text()
            .await
            .ok()
            .and_then(|body| {
                serde_json::from_str::<UpstreamErrorBody>(&body)
                    .ok()
                    .map(|e| e.message)
                    .or(Some(body))
            })
            .unwrap_or_default();

        error!(
            city = %city,
            operation = operation,
            status = status.as_u16(),
            message = %message,
            "weather provider request failed"
        );

        return Err(GatewayError::Upstream {
            city: city.to_string(),
            operation,
            status: Some(status.as_u16()),
            message,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| GatewayError::MalformedResponse {
            city: city.to_string(),
            operation,
            reason: e.to_string(),
        })
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RealtimeResponse {
    data: RealtimeData,
}

#[derive(Debug, Deserialize)]
struct RealtimeData {
    #[serde(default)]
    time: Option<DateTime<Utc>>,
    values: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TimelinesResponse {
    data: TimelinesData,
}

#[derive(Debug, Deserialize)]
struct TimelinesData {
    timelines: Vec<Timeline>,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "intervals")]
    intervals: Vec<Interval>,
}

#[derive(Debug, Deserialize)]
struct Interval {
    #[serde(rename = "startTime")]
    start_time: DateTime<Utc>,
    values: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_rejects_empty_api_key() {
        let result = ProviderClient::new(ProviderConfig::new(""));
        assert!(matches!(result, Err(GatewayError::MissingApiKey)));
    }

    #[test]
    fn fields_param_joins_api_names() {
        let fields = fields_param(&[
            WeatherParameter::Temperature,
            WeatherParameter::WindGust,
        ]);
        assert_eq!(fields, "temperature,windGust");
    }

    #[test]
    fn fields_param_empty_falls_back_to_defaults() {
        let fields = fields_param(&[]);
        assert_eq!(
            fields,
            "temperature,windSpeed,humidity,precipitationProbability"
        );
    }

    #[test]
    fn convert_values_drops_unknown_and_non_numeric() {
        let mut raw = HashMap::new();
        raw.insert("temperature".to_string(), serde_json::json!(21.5));
        raw.insert("moonPhase".to_string(), serde_json::json!(3.0));
        raw.insert("windSpeed".to_string(), serde_json::Value::Null);

        let values = convert_values(&raw);
        assert_eq!(values.len(), 1);
        assert_eq!(values.get(&WeatherParameter::Temperature), Some(&21.5));
    }

    #[test]
    fn timelines_response_decodes() {
        let json = r#"{
            "data": {
                "timelines": [{
                    "timestep": "1h",
                    "intervals": [
                        {"startTime": "2026-08-23T12:00:00Z", "values": {"temperature": 31.2}},
                        {"startTime": "2026-08-23T13:00:00Z", "values": {"temperature": 32.8}}
                    ]
                }]
            }
        }"#;

        let parsed: serde_json::Result<TimelinesResponse> = serde_json::from_str(json);
        assert!(parsed.is_ok());
        let body = parsed.unwrap();
        assert_eq!(body.data.timelines[0].intervals.len(), 2);
    }

    #[test]
    fn realtime_response_decodes_without_time() {
        let json = r#"{"data": {"values": {"temperature": 18.0, "humidity": 62}}}"#;
        let parsed: serde_json::Result<RealtimeResponse> = serde_json::from_str(json);
        assert!(parsed.is_ok());
        assert!(parsed.unwrap().data.time.is_none());
    }
}
