//! Core types for the alerting system.
//!
//! This module provides the fundamental types used throughout the
//! nimbus-alerts crate:
//! - [`ConditionKind`]: comparison operators for threshold conditions
//! - [`AlertSpec`]: the user-supplied, immutable definition of an alert
//! - [`Alert`]: the stored entity, spec plus engine-owned evaluation state
//! - [`TriggerPoint`]: a predicted future moment at which a condition holds

use chrono::{DateTime, Utc};
use nimbus_weather::WeatherParameter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AlertError, Result};

/// Maximum accepted length for a city name.
pub const MAX_CITY_LENGTH: usize = 100;

/// The comparison a threshold condition applies to an observed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    /// value > threshold
    Above,
    /// value >= threshold
    AboveEqual,
    /// |value - threshold| < 0.01
    Equal,
    /// value <= threshold
    BelowEqual,
    /// value < threshold
    Below,
    /// threshold_min <= value <= threshold_max
    Between,
}

impl ConditionKind {
    /// Returns the condition as its wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Above => "above",
            Self::AboveEqual => "above_equal",
            Self::Equal => "equal",
            Self::BelowEqual => "below_equal",
            Self::Below => "below",
            Self::Between => "between",
        }
    }
}

impl std::fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A predicted future point at which an alert's condition holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerPoint {
    /// The forecast hour.
    pub timestamp: DateTime<Utc>,
    /// The predicted value at that hour.
    pub value: f64,
}

/// The user-supplied definition of an alert. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSpec {
    /// Free-text location the alert watches.
    pub city: String,
    /// The measurement the condition applies to.
    pub parameter: WeatherParameter,
    /// The comparison kind.
    pub condition: ConditionKind,
    /// Lower (or only) threshold.
    pub threshold_min: f64,
    /// Upper threshold; present iff `condition` is `between`.
    pub threshold_max: Option<f64>,
    /// Address to email when the alert triggers.
    pub email: Option<String>,
}

impl AlertSpec {
    /// Validates the spec against the creation rules.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Validation`] when:
    /// - the city is empty or longer than [`MAX_CITY_LENGTH`]
    /// - `between` lacks a `threshold_max` greater than `threshold_min`
    /// - any other condition carries a `threshold_max`
    /// - a threshold lies outside the parameter's physical range
    /// - the email address is malformed
    pub fn validate(&self) -> Result<()> {
        if self.city.trim().is_empty() {
            return Err(AlertError::Validation {
                reason: "city must not be empty".to_string(),
            });
        }
        if self.city.len() > MAX_CITY_LENGTH {
            return Err(AlertError::Validation {
                reason: format!("city must not exceed {MAX_CITY_LENGTH} characters"),
            });
        }

        match (self.condition, self.threshold_max) {
            (ConditionKind::Between, None) => {
                return Err(AlertError::Validation {
                    reason: "'between' condition requires thresholdMax".to_string(),
                });
            }
            (ConditionKind::Between, Some(max)) if max <= self.threshold_min => {
                return Err(AlertError::Validation {
                    reason: "thresholdMax must be greater than thresholdMin".to_string(),
                });
            }
            (ConditionKind::Between, Some(_)) => {}
            (_, Some(_)) => {
                return Err(AlertError::Validation {
                    reason: format!(
                        "thresholdMax is only valid for 'between', not '{}'",
                        self.condition
                    ),
                });
            }
            (_, None) => {}
        }

        if let Some((lo, hi)) = self.parameter.valid_range() {
            for threshold in
                std::iter::once(self.threshold_min).chain(self.threshold_max)
            {
                if threshold < lo || threshold > hi {
                    return Err(AlertError::Validation {
                        reason: format!(
                            "{} threshold must be between {lo}{unit} and {hi}{unit}",
                            self.parameter,
                            unit = self.parameter.unit().trim(),
                        ),
                    });
                }
            }
        }

        if let Some(email) = &self.email {
            if !is_plausible_email(email) {
                return Err(AlertError::Validation {
                    reason: format!("'{email}' is not a valid email address"),
                });
            }
        }

        Ok(())
    }

    /// Returns true if `other` defines the same
    /// (city, parameter, condition, thresholds, email) tuple.
    ///
    /// Used for duplicate rejection at creation.
    #[must_use]
    pub fn matches_spec(&self, other: &Self) -> bool {
        self.city.eq_ignore_ascii_case(&other.city)
            && self.parameter == other.parameter
            && self.condition == other.condition
            && self.threshold_min == other.threshold_min
            && self.threshold_max == other.threshold_max
            && self.email == other.email
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

/// A stored alert: the immutable spec plus engine-owned evaluation state.
///
/// The conceptual trigger state machine is derived from the stored fields:
/// a set `last_notified_at` means the condition was true and the user was
/// notified; it is cleared when the condition stops holding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique identifier.
    pub id: Uuid,
    /// The immutable specification.
    #[serde(flatten)]
    pub spec: AlertSpec,
    /// Soft-delete flag; inactive alerts are invisible to reads and passes.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// Last observed value for the spec's parameter.
    pub current_value: Option<f64>,
    /// When the engine last evaluated this alert.
    pub last_checked: Option<DateTime<Utc>>,
    /// When the user was last notified of a continuously-true condition.
    /// Cleared when the condition resolves.
    pub last_notified_at: Option<DateTime<Utc>>,
    /// Future forecast points at which the condition is predicted to hold,
    /// extracted from the most recent pass. `None` when none were found.
    pub next_trigger_forecast: Option<Vec<TriggerPoint>>,
}

impl Alert {
    /// Creates a fresh alert from a validated spec.
    #[must_use]
    pub fn from_spec(spec: AlertSpec, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            spec,
            is_active: true,
            created_at: now,
            updated_at: now,
            current_value: None,
            last_checked: None,
            last_notified_at: None,
            next_trigger_forecast: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> AlertSpec {
        AlertSpec {
            city: "Berlin".to_string(),
            parameter: WeatherParameter::Temperature,
            condition: ConditionKind::Above,
            threshold_min: 30.0,
            threshold_max: None,
            email: Some("user@example.com".to_string()),
        }
    }

    mod condition_kind_tests {
        use super::*;

        #[test]
        fn as_str_values() {
            assert_eq!(ConditionKind::Above.as_str(), "above");
            assert_eq!(ConditionKind::AboveEqual.as_str(), "above_equal");
            assert_eq!(ConditionKind::Equal.as_str(), "equal");
            assert_eq!(ConditionKind::BelowEqual.as_str(), "below_equal");
            assert_eq!(ConditionKind::Below.as_str(), "below");
            assert_eq!(ConditionKind::Between.as_str(), "between");
        }

        #[test]
        fn serde_roundtrip() {
            for kind in [
                ConditionKind::Above,
                ConditionKind::AboveEqual,
                ConditionKind::Equal,
                ConditionKind::BelowEqual,
                ConditionKind::Below,
                ConditionKind::Between,
            ] {
                let json = serde_json::to_string(&kind);
                assert!(json.is_ok());
                let json = json.unwrap();
                assert_eq!(json, format!("\"{}\"", kind.as_str()));
                let parsed: serde_json::Result<ConditionKind> = serde_json::from_str(&json);
                assert!(parsed.is_ok());
                assert_eq!(parsed.unwrap(), kind);
            }
        }
    }

    mod validation_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn valid_spec_passes() {
            assert!(spec().validate().is_ok());
        }

        #[test]
        fn empty_city_fails() {
            let mut s = spec();
            s.city = "  ".to_string();
            assert!(matches!(
                s.validate(),
                Err(AlertError::Validation { .. })
            ));
        }

        #[test]
        fn overlong_city_fails() {
            let mut s = spec();
            s.city = "x".repeat(MAX_CITY_LENGTH + 1);
            assert!(s.validate().is_err());
        }

        #[test]
        fn between_requires_max() {
            let mut s = spec();
            s.condition = ConditionKind::Between;
            s.threshold_max = None;
            let err = s.validate();
            assert!(err.is_err());
        }

        #[test]
        fn between_max_must_exceed_min() {
            let mut s = spec();
            s.condition = ConditionKind::Between;
            s.threshold_min = 20.0;
            s.threshold_max = Some(20.0);
            assert!(s.validate().is_err());

            s.threshold_max = Some(19.0);
            assert!(s.validate().is_err());

            s.threshold_max = Some(25.0);
            assert!(s.validate().is_ok());
        }

        #[test]
        fn max_rejected_outside_between() {
            let mut s = spec();
            s.threshold_max = Some(40.0);
            assert!(s.validate().is_err());
        }

        #[test_case(WeatherParameter::Temperature, -51.0; "temperature below range")]
        #[test_case(WeatherParameter::Temperature, 61.0; "temperature above range")]
        #[test_case(WeatherParameter::Humidity, -1.0; "humidity below range")]
        #[test_case(WeatherParameter::Humidity, 101.0; "humidity above range")]
        #[test_case(WeatherParameter::WindSpeed, 201.0; "wind speed above range")]
        #[test_case(WeatherParameter::PrecipitationProbability, 150.0; "precipitation above range")]
        fn out_of_range_threshold_fails(parameter: WeatherParameter, threshold: f64) {
            let mut s = spec();
            s.parameter = parameter;
            s.threshold_min = threshold;
            assert!(s.validate().is_err());
        }

        #[test]
        fn unconstrained_parameter_accepts_any_threshold() {
            let mut s = spec();
            s.parameter = WeatherParameter::PressureSeaLevel;
            s.threshold_min = 100_000.0;
            assert!(s.validate().is_ok());
        }

        #[test]
        fn between_max_also_range_checked() {
            let mut s = spec();
            s.condition = ConditionKind::Between;
            s.threshold_min = 20.0;
            s.threshold_max = Some(80.0);
            assert!(s.validate().is_ok());

            s.threshold_max = Some(90.0);
            assert!(s.validate().is_err());
        }

        #[test_case("userexample.com"; "no at sign")]
        #[test_case("@example.com"; "empty local part")]
        #[test_case("user@"; "empty domain")]
        #[test_case("user@nodot"; "domain without dot")]
        #[test_case("user @example.com"; "whitespace")]
        fn bad_email_fails(email: &str) {
            let mut s = spec();
            s.email = Some(email.to_string());
            assert!(s.validate().is_err());
        }

        #[test]
        fn missing_email_is_fine() {
            let mut s = spec();
            s.email = None;
            assert!(s.validate().is_ok());
        }
    }

    mod duplicate_tests {
        use super::*;

        #[test]
        fn identical_specs_match() {
            assert!(spec().matches_spec(&spec()));
        }

        #[test]
        fn city_match_is_case_insensitive() {
            let mut other = spec();
            other.city = "berlin".to_string();
            assert!(spec().matches_spec(&other));
        }

        #[test]
        fn different_threshold_does_not_match() {
            let mut other = spec();
            other.threshold_min = 31.0;
            assert!(!spec().matches_spec(&other));
        }

        #[test]
        fn different_email_does_not_match() {
            let mut other = spec();
            other.email = Some("someone-else@example.com".to_string());
            assert!(!spec().matches_spec(&other));
        }
    }

    mod alert_tests {
        use super::*;

        #[test]
        fn from_spec_initializes_evaluation_state_empty() {
            let now = Utc::now();
            let alert = Alert::from_spec(spec(), now);

            assert!(alert.is_active);
            assert_eq!(alert.created_at, now);
            assert!(alert.current_value.is_none());
            assert!(alert.last_checked.is_none());
            assert!(alert.last_notified_at.is_none());
            assert!(alert.next_trigger_forecast.is_none());
        }

        #[test]
        fn serialization_flattens_spec() {
            let alert = Alert::from_spec(spec(), Utc::now());
            let json = serde_json::to_value(&alert);
            assert!(json.is_ok());
            let json = json.unwrap();

            // spec fields appear at the top level of the wire shape
            assert_eq!(json["city"], "Berlin");
            assert_eq!(json["condition"], "above");
            assert_eq!(json["parameter"], "temperature");
            assert_eq!(json["thresholdMin"], 30.0);
            assert_eq!(json["isActive"], true);
        }

        #[test]
        fn serialization_roundtrip() {
            let original = Alert::from_spec(spec(), Utc::now());
            let json = serde_json::to_string(&original);
            assert!(json.is_ok());
            let parsed: serde_json::Result<Alert> = serde_json::from_str(&json.unwrap());
            assert!(parsed.is_ok());
            assert_eq!(parsed.unwrap(), original);
        }
    }
}
