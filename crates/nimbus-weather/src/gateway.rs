//! The weather gateway consumed by the alert evaluation engine.
//!
//! [`ForecastProvider`] is the seam the engine (and the HTTP layer) program
//! against; [`WeatherGateway`] is the production implementation combining
//! the provider client with the current-conditions cache.

use std::future::Future;

use tracing::debug;

use crate::cache::ConditionsCache;
use crate::client::ProviderClient;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::types::{CurrentConditions, ForecastPoint, WeatherParameter, DEFAULT_PARAMETERS};

/// Hours of hourly forecast requested by default (3 days).
pub const DEFAULT_FORECAST_HOURS: u32 = 72;

/// Source of weather data for a city.
pub trait ForecastProvider: Send + Sync {
    /// Fetches the present-moment observation for a city.
    fn current_conditions(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<CurrentConditions>> + Send;

    /// Fetches the hourly forecast for a city, ordered by time ascending,
    /// with the first point representing the present hour.
    ///
    /// When `parameters` is given, only those fields are requested upstream;
    /// otherwise a default full set is used.
    fn hourly_forecast(
        &self,
        city: &str,
        parameters: Option<&[WeatherParameter]>,
    ) -> impl Future<Output = Result<Vec<ForecastPoint>>> + Send;
}

/// Production gateway: cached current reads, always-fresh forecasts.
#[derive(Debug)]
pub struct WeatherGateway<C: Clock = SystemClock> {
    client: ProviderClient,
    cache: ConditionsCache<C>,
    forecast_hours: u32,
}

impl WeatherGateway {
    /// Creates a gateway with the default cache (5-minute TTL, system clock).
    #[must_use]
    pub fn new(client: ProviderClient) -> Self {
        Self {
            client,
            cache: ConditionsCache::default(),
            forecast_hours: DEFAULT_FORECAST_HOURS,
        }
    }
}

impl<C: Clock> WeatherGateway<C> {
    /// Creates a gateway with an explicit cache.
    #[must_use]
    pub const fn with_cache(client: ProviderClient, cache: ConditionsCache<C>) -> Self {
        Self {
            client,
            cache,
            forecast_hours: DEFAULT_FORECAST_HOURS,
        }
    }

    /// Overrides the forecast lookahead window.
    #[must_use]
    pub const fn with_forecast_hours(mut self, hours: u32) -> Self {
        self.forecast_hours = hours;
        self
    }

    /// Evicts stale cache entries. Safe to call from any task.
    pub fn sweep_cache(&self) -> usize {
        self.cache.purge_expired()
    }
}

impl<P: ForecastProvider> ForecastProvider for std::sync::Arc<P> {
    fn current_conditions(
        &self,
        city: &str,
    ) -> impl Future<Output = Result<CurrentConditions>> + Send {
        self.as_ref().current_conditions(city)
    }

    fn hourly_forecast(
        &self,
        city: &str,
        parameters: Option<&[WeatherParameter]>,
    ) -> impl Future<Output = Result<Vec<ForecastPoint>>> + Send {
        self.as_ref().hourly_forecast(city, parameters)
    }
}

impl<C: Clock> ForecastProvider for WeatherGateway<C> {
    async fn current_conditions(&self, city: &str) -> Result<CurrentConditions> {
        if let Some(cached) = self.cache.get(city) {
            return Ok(cached);
        }

        let conditions = self.client.realtime(city, DEFAULT_PARAMETERS).await?;
        self.cache.put(city, conditions.clone());
        Ok(conditions)
    }

    async fn hourly_forecast(
        &self,
        city: &str,
        parameters: Option<&[WeatherParameter]>,
    ) -> Result<Vec<ForecastPoint>> {
        // piggyback on forecast traffic to keep the conditions cache tidy
        self.sweep_cache();

        let fields = parameters.unwrap_or(DEFAULT_PARAMETERS);
        let mut points = self
            .client
            .timelines(city, fields, self.forecast_hours)
            .await?;

        // The provider may hand back a few extra intervals past endTime.
        points.truncate(self.forecast_hours as usize);

        debug!(city = %city, points = points.len(), "forecast fetched");
        Ok(points)
    }
}
