//! Pure condition evaluation.
//!
//! Everything here is deterministic and side-effect free: given a condition
//! and an observed value it answers "does this trigger?", and given a
//! forecast series it extracts the future points at which it would.

use nimbus_weather::{ForecastPoint, WeatherParameter};

use crate::types::{ConditionKind, TriggerPoint};

/// Tolerance used by the `equal` condition to absorb floating-point noise.
pub const EQUAL_TOLERANCE: f64 = 0.01;

/// Evaluates a condition against an observed value.
///
/// `threshold_max` only participates for [`ConditionKind::Between`]; a
/// `between` without a max never matches (it cannot error).
#[must_use]
pub fn matches(
    condition: ConditionKind,
    value: f64,
    threshold_min: f64,
    threshold_max: Option<f64>,
) -> bool {
    match condition {
        ConditionKind::Above => value > threshold_min,
        ConditionKind::AboveEqual => value >= threshold_min,
        ConditionKind::Equal => (value - threshold_min).abs() < EQUAL_TOLERANCE,
        ConditionKind::BelowEqual => value <= threshold_min,
        ConditionKind::Below => value < threshold_min,
        ConditionKind::Between => {
            threshold_max.is_some_and(|max| value >= threshold_min && value <= max)
        }
    }
}

/// Extracts the future points of `series` at which the condition holds.
///
/// The series is assumed ordered by time ascending; order is preserved.
/// Points that do not carry `parameter` are skipped. Returns an empty vec
/// when the condition never holds within the series.
#[must_use]
pub fn future_triggers(
    condition: ConditionKind,
    threshold_min: f64,
    threshold_max: Option<f64>,
    parameter: WeatherParameter,
    series: &[ForecastPoint],
) -> Vec<TriggerPoint> {
    series
        .iter()
        .filter_map(|point| {
            let value = point.value(parameter)?;
            matches(condition, value, threshold_min, threshold_max).then_some(TriggerPoint {
                timestamp: point.timestamp,
                value,
            })
        })
        .collect()
}
