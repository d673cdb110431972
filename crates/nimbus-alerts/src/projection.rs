//! Read-side projection of stored alerts.
//!
//! Everything derived here (status, trigger duration, hours-from-now on
//! forecast points) is computed against the read moment and never written
//! back to the store.

use chrono::{DateTime, Utc};
use nimbus_weather::WeatherParameter;
use serde::Serialize;
use uuid::Uuid;

use crate::evaluator;
use crate::types::{Alert, ConditionKind};

/// Whether an alert's condition currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    /// The condition holds for the last observed value.
    Triggered,
    /// The condition does not hold, or no value has been observed yet.
    Normal,
}

/// A future trigger annotated with its distance from the read moment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerView {
    /// The forecast hour.
    pub timestamp: DateTime<Utc>,
    /// The predicted value at that hour.
    pub value: f64,
    /// Whole hours between the read moment and the forecast hour, rounded.
    pub hours_from_now: i64,
}

/// The API-facing shape of an alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    /// Unique identifier.
    pub id: Uuid,
    /// Watched location.
    pub city: String,
    /// Watched measurement.
    pub parameter: WeatherParameter,
    /// Comparison kind.
    pub condition: ConditionKind,
    /// Lower (or only) threshold.
    pub threshold_min: f64,
    /// Upper threshold, for `between` alerts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_max: Option<f64>,
    /// Notification address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Derived trigger status.
    pub status: AlertStatus,
    /// Last observed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    /// How long the condition has been holding, e.g. "3h 20m". Present only
    /// while triggered and previously notified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// When the engine last evaluated the alert.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_checked: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Upcoming forecast points at which the condition is predicted to hold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_triggers: Option<Vec<TriggerView>>,
}

impl AlertView {
    /// Projects a stored alert into its API shape as of `now`.
    #[must_use]
    pub fn project(alert: &Alert, now: DateTime<Utc>) -> Self {
        let status = derive_status(alert);
        let duration = match (status, alert.last_notified_at) {
            (AlertStatus::Triggered, Some(since)) => Some(format_duration(now - since)),
            _ => None,
        };
        let next_triggers = alert.next_trigger_forecast.as_ref().map(|points| {
            points
                .iter()
                .map(|p| TriggerView {
                    timestamp: p.timestamp,
                    value: p.value,
                    hours_from_now: hours_from(now, p.timestamp),
                })
                .collect()
        });

        Self {
            id: alert.id,
            city: alert.spec.city.clone(),
            parameter: alert.spec.parameter,
            condition: alert.spec.condition,
            threshold_min: alert.spec.threshold_min,
            threshold_max: alert.spec.threshold_max,
            email: alert.spec.email.clone(),
            status,
            current_value: alert.current_value,
            duration,
            last_checked: alert.last_checked,
            created_at: alert.created_at,
            next_triggers,
        }
    }
}

/// Recomputes the trigger status from the last observed value.
#[must_use]
pub fn derive_status(alert: &Alert) -> AlertStatus {
    match alert.current_value {
        Some(value)
            if evaluator::matches(
                alert.spec.condition,
                value,
                alert.spec.threshold_min,
                alert.spec.threshold_max,
            ) =>
        {
            AlertStatus::Triggered
        }
        _ => AlertStatus::Normal,
    }
}

/// Formats an elapsed duration as "3h 20m". Negative durations clamp to "0m".
fn format_duration(elapsed: chrono::Duration) -> String {
    let minutes = elapsed.num_minutes().max(0);
    let hours = minutes / 60;
    let minutes = minutes % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

/// Whole hours from `now` to `then`, rounded to nearest.
fn hours_from(now: DateTime<Utc>, then: DateTime<Utc>) -> i64 {
    let minutes = (then - now).num_minutes();
    // integer rounding; forecasts are in the future so no symmetry concerns
    (minutes + 30).div_euclid(60)
}
