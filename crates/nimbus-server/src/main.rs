//! nimbus-server - weather alert API and evaluation scheduler.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nimbus_alerts::{Engine, EngineConfig, MemoryAlertStore};
use nimbus_server::{create_router, AppState, OutboundNotifier, Scheduler, ServerConfig};
use nimbus_weather::{ConditionsCache, ProviderClient, ProviderConfig, SystemClock, WeatherGateway};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "nimbus-server")]
#[command(about = "Weather alert API and evaluation scheduler")]
#[command(version)]
struct Cli {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:3001")]
    bind: SocketAddr,

    /// Seconds between evaluation passes
    #[arg(long)]
    interval: Option<u64>,

    /// Allowed CORS origin (repeatable; all origins when omitted)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("nimbus_server=info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::from_env()?.with_bind_addr(cli.bind);
    if let Some(secs) = cli.interval {
        config = config.with_evaluation_interval(Duration::from_secs(secs));
    }
    for origin in cli.cors_origins {
        config = config.with_cors_origin(origin);
    }

    info!(
        bind = %config.bind_addr,
        interval_secs = config.evaluation_interval.as_secs(),
        forecast_hours = config.weather.forecast_hours,
        "starting nimbus-server"
    );

    let mut provider_config = ProviderConfig::new(config.weather.api_key.clone());
    if let Some(base_url) = &config.weather.base_url {
        provider_config = provider_config.with_base_url(base_url.clone());
    }
    let client = ProviderClient::new(provider_config)?;
    let cache = ConditionsCache::new(
        chrono::Duration::from_std(config.weather.cache_ttl)?,
        SystemClock,
    );
    let gateway = Arc::new(
        WeatherGateway::with_cache(client, cache).with_forecast_hours(config.weather.forecast_hours),
    );

    let store = Arc::new(MemoryAlertStore::new());
    let notifier = OutboundNotifier::new(config.sendgrid_api_key.clone(), config.from_email.clone());

    let engine = Engine::new(
        Arc::clone(&store),
        Arc::clone(&gateway),
        notifier,
        SystemClock,
        EngineConfig {
            forecast_hours: config.weather.forecast_hours,
            ..EngineConfig::default()
        },
    );
    let scheduler = Arc::new(Scheduler::new(engine, config.evaluation_interval));
    tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run().await }
    });

    let state = Arc::new(AppState::new(config.clone(), store, gateway));
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "API server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}
