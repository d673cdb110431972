//! The evaluation engine.
//!
//! One [`Engine::run_pass`] call is one evaluation pass: load the active
//! alerts, fetch each distinct city's forecast once, evaluate every alert
//! against its city's series, persist the resulting state, and dispatch
//! notifications for the alerts whose trigger state says so.
//!
//! Evaluation and dispatch are deliberately separate phases. The pass first
//! computes *what happened* (the [`PassResult`]) with all state persisted,
//! then delivery runs against that result. A broken notifier can therefore
//! never corrupt stored evaluation state.

use std::collections::HashMap;

use chrono::Duration;
use futures::future::join_all;
use tracing::{debug, error, info, warn};

use nimbus_weather::{Clock, ForecastPoint, ForecastProvider, SystemClock, WeatherParameter};

use crate::dispatch::{AlertNotifier, EmailContext};
use crate::evaluator;
use crate::store::AlertStore;
use crate::types::Alert;

/// Hours of continuous triggering after which a notification is repeated.
pub const RESEND_INTERVAL_HOURS: i64 = 5;

/// Tuning knobs for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Minimum age of the previous notification before a still-triggered
    /// alert is notified again.
    pub resend_interval: Duration,
    /// How far ahead the forecast lookout extends.
    pub forecast_hours: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resend_interval: Duration::hours(RESEND_INTERVAL_HOURS),
            forecast_hours: nimbus_weather::DEFAULT_FORECAST_HOURS,
        }
    }
}

/// Outcome of a single evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct PassResult {
    /// Alerts that were evaluated against a forecast.
    pub evaluated: usize,
    /// Cities whose forecast fetch failed; their alerts were left untouched.
    pub skipped_cities: Vec<String>,
    /// Alerts whose state transition calls for a notification, captured with
    /// their post-transition state.
    pub should_notify: Vec<Alert>,
    /// Alerts that could not be evaluated for a per-alert reason.
    pub errored: usize,
}

/// Periodic alert evaluator.
pub struct Engine<S, G, N, C = SystemClock> {
    store: S,
    gateway: G,
    notifier: N,
    clock: C,
    config: EngineConfig,
}

impl<S, G, N, C> Engine<S, G, N, C>
where
    S: AlertStore,
    G: ForecastProvider,
    N: AlertNotifier,
    C: Clock,
{
    /// Creates an engine with the given collaborators.
    pub fn new(store: S, gateway: G, notifier: N, clock: C, config: EngineConfig) -> Self {
        Self {
            store,
            gateway,
            notifier,
            clock,
            config,
        }
    }

    /// Runs one full pass: evaluate, then dispatch. Never fails; every
    /// problem is logged and reflected in the returned result.
    pub async fn run_pass(&self) -> PassResult {
        info!("starting alert evaluation pass");
        let result = self.evaluate_pass().await;
        self.dispatch(&result).await;
        info!(
            evaluated = result.evaluated,
            notified = result.should_notify.len(),
            skipped_cities = result.skipped_cities.len(),
            errored = result.errored,
            "alert evaluation pass completed"
        );
        result
    }

    /// Evaluates every active alert and persists the new state.
    pub async fn evaluate_pass(&self) -> PassResult {
        let alerts = self.store.find_active();
        if alerts.is_empty() {
            debug!("no active alerts to evaluate");
            return PassResult::default();
        }
        debug!(alerts = alerts.len(), "evaluating active alerts");

        let forecasts = self.fetch_city_forecasts(&alerts).await;

        let mut result = PassResult {
            skipped_cities: forecasts
                .iter()
                .filter_map(|(city, outcome)| outcome.is_err().then(|| city.clone()))
                .collect(),
            ..PassResult::default()
        };

        let now = self.clock.now();
        for mut alert in alerts {
            let Some(Ok(series)) = forecasts.get(&city_key(&alert.spec.city)) else {
                // fetch failed for this city; leave the alert untouched so
                // last_checked still reflects the last successful evaluation
                continue;
            };

            let Some(current_value) = series
                .first()
                .and_then(|point| point.value(alert.spec.parameter))
            else {
                warn!(
                    alert_id = %alert.id,
                    city = %alert.spec.city,
                    parameter = %alert.spec.parameter,
                    "forecast is missing the alert's parameter"
                );
                result.errored += 1;
                continue;
            };

            let triggered = evaluator::matches(
                alert.spec.condition,
                current_value,
                alert.spec.threshold_min,
                alert.spec.threshold_max,
            );
            let triggers = evaluator::future_triggers(
                alert.spec.condition,
                alert.spec.threshold_min,
                alert.spec.threshold_max,
                alert.spec.parameter,
                series,
            );

            let notify = match (triggered, alert.last_notified_at) {
                (true, None) => {
                    info!(
                        alert_id = %alert.id,
                        city = %alert.spec.city,
                        parameter = %alert.spec.parameter,
                        value = current_value,
                        "alert triggered"
                    );
                    alert.last_notified_at = Some(now);
                    true
                }
                (true, Some(last)) if now - last >= self.config.resend_interval => {
                    info!(
                        alert_id = %alert.id,
                        city = %alert.spec.city,
                        "alert still triggered, resending notification"
                    );
                    alert.last_notified_at = Some(now);
                    true
                }
                (true, Some(_)) => {
                    debug!(alert_id = %alert.id, "alert still triggered, notification suppressed");
                    false
                }
                (false, Some(_)) => {
                    info!(
                        alert_id = %alert.id,
                        city = %alert.spec.city,
                        value = current_value,
                        "alert resolved"
                    );
                    alert.last_notified_at = None;
                    false
                }
                (false, None) => false,
            };

            alert.current_value = Some(current_value);
            alert.last_checked = Some(now);
            alert.next_trigger_forecast = (!triggers.is_empty()).then_some(triggers);

            if let Err(err) = self.store.save(&alert) {
                error!(alert_id = %alert.id, error = %err, "failed to persist alert state");
                result.errored += 1;
                continue;
            }

            result.evaluated += 1;
            if notify {
                result.should_notify.push(alert);
            }
        }

        result
    }

    /// Fetches each distinct city's forecast once, concurrently. Each city's
    /// parameter list is the deduplicated union of its alerts' parameters.
    async fn fetch_city_forecasts(
        &self,
        alerts: &[Alert],
    ) -> HashMap<String, nimbus_weather::Result<Vec<ForecastPoint>>> {
        let mut cities: HashMap<String, (String, Vec<WeatherParameter>)> = HashMap::new();
        for alert in alerts {
            let entry = cities
                .entry(city_key(&alert.spec.city))
                .or_insert_with(|| (alert.spec.city.clone(), Vec::new()));
            if !entry.1.contains(&alert.spec.parameter) {
                entry.1.push(alert.spec.parameter);
            }
        }

        let fetches = cities.into_iter().map(|(key, (city, parameters))| async move {
            let outcome = self.gateway.hourly_forecast(&city, Some(&parameters)).await;
            if let Err(err) = &outcome {
                warn!(%city, error = %err, "failed to fetch forecast, skipping city");
            }
            (key, outcome)
        });

        join_all(fetches).await.into_iter().collect()
    }

    /// Delivers notifications for a finished pass. Best-effort: failures are
    /// logged and swallowed.
    pub async fn dispatch(&self, result: &PassResult) {
        for alert in &result.should_notify {
            let Some(email) = &alert.spec.email else {
                continue;
            };
            let context = EmailContext::for_alert(alert, email.clone());
            if let Err(err) = self.notifier.send_alert_email(&context).await {
                warn!(alert_id = %alert.id, error = %err, "alert email delivery failed");
            }
        }

        if !result.should_notify.is_empty() {
            if let Err(err) = self.notifier.send_batch(&result.should_notify).await {
                warn!(
                    alerts = result.should_notify.len(),
                    error = %err,
                    "batch notification delivery failed"
                );
            }
        }
    }
}

fn city_key(city: &str) -> String {
    city.to_lowercase()
}
