//! Notification dispatch.
//!
//! [`AlertNotifier`] is the delivery seam: the engine decides *what* to send
//! and a notifier decides *how*. Delivery is best-effort by contract; a
//! failing notifier must never affect persisted evaluation state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::error::Result;
use crate::types::Alert;

/// Everything an email channel needs to render a trigger notification.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailContext {
    /// Destination address.
    pub recipient: String,
    /// Watched location.
    pub city: String,
    /// Watched measurement, display form.
    pub parameter: String,
    /// Comparison kind, wire form.
    pub condition: String,
    /// The threshold that was crossed.
    pub threshold: f64,
    /// The observed value that crossed it.
    pub current_value: f64,
    /// Display unit for the parameter, e.g. "°C".
    pub unit: &'static str,
}

impl EmailContext {
    /// Builds the context for an alert that should be notified.
    #[must_use]
    pub fn for_alert(alert: &Alert, recipient: String) -> Self {
        Self {
            recipient,
            city: alert.spec.city.clone(),
            parameter: alert.spec.parameter.to_string(),
            condition: alert.spec.condition.to_string(),
            threshold: alert.spec.threshold_min,
            current_value: alert.current_value.unwrap_or_default(),
            unit: alert.spec.parameter.unit(),
        }
    }
}

/// One alert inside a batch webhook payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAlert {
    /// Alert identifier.
    pub id: Uuid,
    /// Watched location.
    pub city: String,
    /// Watched measurement.
    pub parameter: String,
    /// Comparison kind.
    pub condition: String,
    /// Lower (or only) threshold.
    pub threshold: f64,
    /// Last observed value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_value: Option<f64>,
    /// When the trigger was first notified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered_since: Option<DateTime<Utc>>,
    /// How long the condition has been holding, e.g. "3h 20m".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

/// The webhook payload summarizing every currently-triggered alert.
///
/// Exactly one of these is emitted per evaluation pass, regardless of how
/// many alerts triggered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayload {
    /// Payload discriminator, always `"batch_triggered"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Human-readable summary.
    pub message: String,
    /// When the payload was assembled.
    pub timestamp: DateTime<Utc>,
    /// The triggered alerts.
    pub alerts: Vec<BatchAlert>,
}

impl BatchPayload {
    /// Assembles the batch payload for a set of triggered alerts as of `now`.
    #[must_use]
    pub fn from_alerts(alerts: &[Alert], now: DateTime<Utc>) -> Self {
        let entries = alerts
            .iter()
            .map(|alert| BatchAlert {
                id: alert.id,
                city: alert.spec.city.clone(),
                parameter: alert.spec.parameter.to_string(),
                condition: alert.spec.condition.to_string(),
                threshold: alert.spec.threshold_min,
                current_value: alert.current_value,
                triggered_since: alert.last_notified_at,
                duration: alert.last_notified_at.map(|since| format_duration(now - since)),
            })
            .collect();

        Self {
            kind: "batch_triggered",
            message: format!("{} alerts currently triggered", alerts.len()),
            timestamp: now,
            alerts: entries,
        }
    }
}

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

/// A delivery channel for trigger notifications.
pub trait AlertNotifier: Send + Sync {
    /// Sends a single trigger email.
    fn send_alert_email(
        &self,
        context: &EmailContext,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Sends the per-pass batch webhook for the given triggered alerts.
    fn send_batch(&self, alerts: &[Alert]) -> impl Future<Output = Result<()>> + Send;
}

/// Notifier that writes every notification to the log. Used when no outbound
/// channel is configured, and as the test double.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl AlertNotifier for LogNotifier {
    async fn send_alert_email(&self, context: &EmailContext) -> Result<()> {
        info!(
            recipient = %context.recipient,
            city = %context.city,
            parameter = %context.parameter,
            condition = %context.condition,
            threshold = context.threshold,
            current_value = context.current_value,
            "alert email (log channel)"
        );
        Ok(())
    }

    async fn send_batch(&self, alerts: &[Alert]) -> Result<()> {
        let payload = BatchPayload::from_alerts(alerts, Utc::now());
        match serde_json::to_string(&payload) {
            Ok(body) => info!(alerts = alerts.len(), %body, "batch webhook (log channel)"),
            Err(err) => info!(alerts = alerts.len(), error = %err, "batch webhook (log channel)"),
        }
        Ok(())
    }
}

impl<N: AlertNotifier> AlertNotifier for std::sync::Arc<N> {
    fn send_alert_email(
        &self,
        context: &EmailContext,
    ) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().send_alert_email(context)
    }

    fn send_batch(&self, alerts: &[Alert]) -> impl Future<Output = Result<()>> + Send {
        self.as_ref().send_batch(alerts)
    }
}
