//! Outbound notification delivery.
//!
//! Emails go out through the SendGrid v3 API when an API key is configured;
//! without one, every send is logged and skipped so the engine keeps working
//! in local setups. The batch notification is serialized and logged rather
//! than POSTed anywhere, which is all the downstream consumer needs today.

use chrono::Utc;
use nimbus_alerts::{Alert, AlertError, AlertNotifier, BatchPayload, EmailContext};
use tracing::{info, warn};

const SENDGRID_SEND_URL: &str = "https://api.sendgrid.com/v3/mail/send";

/// Production notifier: SendGrid for email, log output for the batch.
#[derive(Debug, Clone)]
pub struct OutboundNotifier {
    http: reqwest::Client,
    sendgrid_api_key: Option<String>,
    from_email: String,
}

impl OutboundNotifier {
    /// Creates a notifier. With `sendgrid_api_key` set to `None`, emails are
    /// logged instead of sent.
    #[must_use]
    pub fn new(sendgrid_api_key: Option<String>, from_email: String) -> Self {
        if sendgrid_api_key.is_none() {
            warn!("SENDGRID_API_KEY not configured, alert emails will be logged only");
        }
        Self {
            http: reqwest::Client::new(),
            sendgrid_api_key,
            from_email,
        }
    }
}

impl AlertNotifier for OutboundNotifier {
    async fn send_alert_email(&self, context: &EmailContext) -> nimbus_alerts::Result<()> {
        let Some(api_key) = &self.sendgrid_api_key else {
            info!(
                recipient = %context.recipient,
                city = %context.city,
                "email not sent, SendGrid API key missing"
            );
            return Ok(());
        };

        let payload = sendgrid_payload(context, &self.from_email);
        let response = self
            .http
            .post(SENDGRID_SEND_URL)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| AlertError::Dispatch {
                reason: format!("sendgrid request failed: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Dispatch {
                reason: format!("sendgrid returned {status}: {body}"),
            });
        }

        info!(recipient = %context.recipient, city = %context.city, "alert email sent");
        Ok(())
    }

    async fn send_batch(&self, alerts: &[Alert]) -> nimbus_alerts::Result<()> {
        let payload = BatchPayload::from_alerts(alerts, Utc::now());
        let body = serde_json::to_string(&payload).map_err(|err| AlertError::Dispatch {
            reason: format!("failed to serialize batch payload: {err}"),
        })?;
        info!(alerts = alerts.len(), %body, "batch notification");
        Ok(())
    }
}

/// Assembles the SendGrid v3 `mail/send` request body.
fn sendgrid_payload(context: &EmailContext, from_email: &str) -> serde_json::Value {
    serde_json::json!({
        "personalizations": [{
            "to": [{ "email": context.recipient }]
        }],
        "from": { "email": from_email },
        "subject": format!("Weather Alert - {}", context.city),
        "content": [{
            "type": "text/html",
            "value": email_template(context),
        }]
    })
}

/// Renders the alert email body.
fn email_template(context: &EmailContext) -> String {
    format!(
        r#"<div style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: #ff4d4f; color: white; padding: 20px; text-align: center;">
    <h1>Weather Alert Triggered</h1>
  </div>
  <div style="padding: 30px; background: white;">
    <h2>Alert Details</h2>
    <div style="background: #fff2f0; border: 1px solid #ffccc7; padding: 20px; border-radius: 6px;">
      <p><strong>Location:</strong> {city}</p>
      <p><strong>Parameter:</strong> {parameter}</p>
      <p><strong>Condition:</strong> {condition} {threshold}{unit}</p>
      <p><strong>Current Value:</strong> <span style="font-size: 24px; color: #ff4d4f; font-weight: bold;">{current_value}{unit}</span></p>
    </div>
  </div>
  <div style="background: #fafafa; padding: 20px; text-align: center; color: #666; font-size: 12px;">
    Weather Alerts System | Powered by Tomorrow.io
  </div>
</div>"#,
        city = context.city,
        parameter = context.parameter,
        condition = context.condition,
        threshold = context.threshold,
        unit = context.unit,
        current_value = context.current_value,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EmailContext {
        EmailContext {
            recipient: "user@example.com".to_string(),
            city: "Berlin".to_string(),
            parameter: "temperature".to_string(),
            condition: "above".to_string(),
            threshold: 30.0,
            current_value: 33.5,
            unit: "°C",
        }
    }

    #[test]
    fn payload_shape() {
        let payload = sendgrid_payload(&context(), "alerts@weather-system.com");

        assert_eq!(
            payload["personalizations"][0]["to"][0]["email"],
            "user@example.com"
        );
        assert_eq!(payload["from"]["email"], "alerts@weather-system.com");
        assert_eq!(payload["subject"], "Weather Alert - Berlin");
        assert_eq!(payload["content"][0]["type"], "text/html");
    }

    #[test]
    fn template_carries_all_alert_details() {
        let html = email_template(&context());

        assert!(html.contains("Berlin"));
        assert!(html.contains("temperature"));
        assert!(html.contains("above 30°C"));
        assert!(html.contains("33.5°C"));
    }

    #[tokio::test]
    async fn missing_key_skips_email_without_error() {
        let notifier = OutboundNotifier::new(None, "alerts@weather-system.com".to_string());
        let result = notifier.send_alert_email(&context()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn batch_is_logged_not_posted() {
        let notifier = OutboundNotifier::new(None, "alerts@weather-system.com".to_string());
        assert!(notifier.send_batch(&[]).await.is_ok());
    }
}
