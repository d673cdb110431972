//! Shared state for the HTTP API.

use std::sync::Arc;

use nimbus_alerts::MemoryAlertStore;
use nimbus_weather::ForecastProvider;

use crate::config::ServerConfig;

/// State shared across request handlers.
///
/// Generic over the forecast provider so route tests can substitute a stub.
pub struct AppState<G> {
    config: ServerConfig,
    store: Arc<MemoryAlertStore>,
    gateway: Arc<G>,
}

impl<G: ForecastProvider> AppState<G> {
    /// Creates the shared state.
    pub fn new(config: ServerConfig, store: Arc<MemoryAlertStore>, gateway: Arc<G>) -> Self {
        Self {
            config,
            store,
            gateway,
        }
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The alert store.
    #[must_use]
    pub fn store(&self) -> &MemoryAlertStore {
        &self.store
    }

    /// The weather gateway.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }
}
