//! Weather provider gateway for Nimbus.
//!
//! `nimbus-weather` wraps the upstream weather API behind a small surface:
//!
//! - **Current conditions**: cached with a 5-minute TTL per city, since the
//!   map UI and the HTTP read path poll frequently.
//! - **Hourly forecast**: always fetched fresh, covering the next 72 hours,
//!   because the evaluation engine wants one consistent snapshot per pass.
//!
//! The [`ForecastProvider`] trait is the seam consumers program against;
//! [`WeatherGateway`] is the reqwest-backed production implementation. Time
//! is injected through [`clock::Clock`] so TTL behavior is deterministic in
//! tests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cache;
pub mod client;
pub mod clock;
pub mod error;
pub mod gateway;
pub mod types;

pub use cache::ConditionsCache;
pub use client::{ProviderClient, ProviderConfig};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{GatewayError, Result};
pub use gateway::{ForecastProvider, WeatherGateway, DEFAULT_FORECAST_HOURS};
pub use types::{CurrentConditions, ForecastPoint, WeatherParameter, DEFAULT_PARAMETERS};
