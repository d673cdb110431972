//! Periodic evaluation scheduling.

use std::time::Duration;

use nimbus_alerts::{AlertNotifier, AlertStore, Engine, PassResult};
use nimbus_weather::{Clock, ForecastProvider};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Drives the evaluation engine on a fixed interval.
///
/// Passes are single-flight: if a pass is still running when the next tick
/// fires, the tick is skipped rather than stacking a second pass behind it.
pub struct Scheduler<S, G, N, C> {
    engine: Engine<S, G, N, C>,
    interval: Duration,
    run_lock: Mutex<()>,
}

impl<S, G, N, C> Scheduler<S, G, N, C>
where
    S: AlertStore,
    G: ForecastProvider,
    N: AlertNotifier,
    C: Clock,
{
    /// Creates a scheduler around an engine.
    pub fn new(engine: Engine<S, G, N, C>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            run_lock: Mutex::new(()),
        }
    }

    /// Runs passes forever. The first pass fires immediately.
    pub async fn run(&self) {
        info!(interval_secs = self.interval.as_secs(), "evaluation scheduler started");
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Runs one pass unless another is still in flight.
    ///
    /// Returns `None` when the tick was skipped.
    pub async fn tick(&self) -> Option<PassResult> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            warn!("previous evaluation pass still running, skipping tick");
            return None;
        };
        Some(self.engine.run_pass().await)
    }
}
