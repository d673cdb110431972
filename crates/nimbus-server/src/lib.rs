//! HTTP API and evaluation scheduler for Nimbus weather alerts.
//!
//! The server wires the pieces from `nimbus-alerts` and `nimbus-weather`
//! together: an axum REST API for managing alerts and reading current
//! conditions, plus a background scheduler running the evaluation engine
//! once per configured interval.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod notify;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use config::{ServerConfig, WeatherConfig};
pub use error::{ApiError, ServerError, ServerResult};
pub use notify::OutboundNotifier;
pub use routes::create_router;
pub use scheduler::Scheduler;
pub use state::AppState;
