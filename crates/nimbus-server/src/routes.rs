//! Route configuration for the alert API.

use std::sync::Arc;

use axum::routing::{get, post, Router};
use nimbus_weather::ForecastProvider;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_alert, current_weather, delete_alert, get_alert, health_check, list_alerts,
};
use crate::state::AppState;

/// Create the alert API router.
pub fn create_router<G>(state: Arc<AppState<G>>) -> Router
where
    G: ForecastProvider + 'static,
{
    let cors = build_cors_layer(state.config());

    Router::new()
        .route("/health", get(health_check))
        .route("/alerts", post(create_alert::<G>).get(list_alerts::<G>))
        .route("/alerts/{id}", get(get_alert::<G>).delete(delete_alert::<G>))
        .route("/weather/current", get(current_weather::<G>))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &crate::config::ServerConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
