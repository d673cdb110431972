//! Core types for weather data.
//!
//! This module provides the fundamental types shared across the Nimbus
//! weather pipeline:
//! - [`WeatherParameter`]: the closed set of measurements the provider reports
//! - [`ForecastPoint`]: one hourly snapshot of forecast values
//! - [`CurrentConditions`]: the present-moment observation for a city

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A weather measurement tracked by the upstream provider.
///
/// The serde names match the provider's API field names, so the enum can be
/// used directly when building `fields` query strings and when decoding
/// response payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeatherParameter {
    /// Air temperature in degrees Celsius.
    Temperature,
    /// Apparent ("feels like") temperature in degrees Celsius.
    TemperatureApparent,
    /// Wind speed in m/s.
    WindSpeed,
    /// Wind gust speed in m/s.
    WindGust,
    /// Wind direction in degrees.
    WindDirection,
    /// Relative humidity in percent.
    Humidity,
    /// Probability of precipitation in percent.
    PrecipitationProbability,
    /// Rain intensity in mm/h.
    RainIntensity,
    /// Snow intensity in mm/h.
    SnowIntensity,
    /// Sleet intensity in mm/h.
    SleetIntensity,
    /// Freezing rain intensity in mm/h.
    FreezingRainIntensity,
    /// Probability of hail in percent.
    HailProbability,
    /// Expected hail size in cm.
    HailSize,
    /// Sea-level barometric pressure in hPa.
    PressureSeaLevel,
    /// Surface-level barometric pressure in hPa.
    PressureSurfaceLevel,
    /// Dew point in degrees Celsius.
    DewPoint,
    /// Cloud cover in percent.
    CloudCover,
    /// Cloud base altitude in km.
    CloudBase,
    /// Cloud ceiling altitude in km.
    CloudCeiling,
    /// Visibility in km.
    Visibility,
    /// UV index (0-11 scale).
    UvIndex,
    /// UV health concern level.
    UvHealthConcern,
    /// Provider weather code.
    WeatherCode,
}

/// The default field set requested from the provider when the caller does
/// not narrow the parameters.
pub const DEFAULT_PARAMETERS: &[WeatherParameter] = &[
    WeatherParameter::Temperature,
    WeatherParameter::WindSpeed,
    WeatherParameter::Humidity,
    WeatherParameter::PrecipitationProbability,
];

impl WeatherParameter {
    /// All parameters, in declaration order.
    pub const ALL: &'static [Self] = &[
        Self::Temperature,
        Self::TemperatureApparent,
        Self::WindSpeed,
        Self::WindGust,
        Self::WindDirection,
        Self::Humidity,
        Self::PrecipitationProbability,
        Self::RainIntensity,
        Self::SnowIntensity,
        Self::SleetIntensity,
        Self::FreezingRainIntensity,
        Self::HailProbability,
        Self::HailSize,
        Self::PressureSeaLevel,
        Self::PressureSurfaceLevel,
        Self::DewPoint,
        Self::CloudCover,
        Self::CloudBase,
        Self::CloudCeiling,
        Self::Visibility,
        Self::UvIndex,
        Self::UvHealthConcern,
        Self::WeatherCode,
    ];

    /// Returns the provider API field name for this parameter.
    #[must_use]
    pub const fn api_name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::TemperatureApparent => "temperatureApparent",
            Self::WindSpeed => "windSpeed",
            Self::WindGust => "windGust",
            Self::WindDirection => "windDirection",
            Self::Humidity => "humidity",
            Self::PrecipitationProbability => "precipitationProbability",
            Self::RainIntensity => "rainIntensity",
            Self::SnowIntensity => "snowIntensity",
            Self::SleetIntensity => "sleetIntensity",
            Self::FreezingRainIntensity => "freezingRainIntensity",
            Self::HailProbability => "hailProbability",
            Self::HailSize => "hailSize",
            Self::PressureSeaLevel => "pressureSeaLevel",
            Self::PressureSurfaceLevel => "pressureSurfaceLevel",
            Self::DewPoint => "dewPoint",
            Self::CloudCover => "cloudCover",
            Self::CloudBase => "cloudBase",
            Self::CloudCeiling => "cloudCeiling",
            Self::Visibility => "visibility",
            Self::UvIndex => "uvIndex",
            Self::UvHealthConcern => "uvHealthConcern",
            Self::WeatherCode => "weatherCode",
        }
    }

    /// Parses a provider API field name back into a parameter.
    #[must_use]
    pub fn from_api_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.api_name() == name)
    }

    /// Returns the display unit for this parameter, if it has one.
    #[must_use]
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Temperature | Self::TemperatureApparent | Self::DewPoint => "°C",
            Self::WindSpeed | Self::WindGust => " m/s",
            Self::WindDirection => "°",
            Self::Humidity
            | Self::PrecipitationProbability
            | Self::HailProbability
            | Self::CloudCover => "%",
            Self::RainIntensity | Self::SnowIntensity | Self::SleetIntensity
            | Self::FreezingRainIntensity => " mm/h",
            Self::HailSize => " cm",
            Self::PressureSeaLevel | Self::PressureSurfaceLevel => " hPa",
            Self::CloudBase | Self::CloudCeiling | Self::Visibility => " km",
            Self::UvIndex | Self::UvHealthConcern | Self::WeatherCode => "",
        }
    }

    /// Returns the physically plausible threshold range for this parameter,
    /// or `None` when the parameter is unconstrained.
    #[must_use]
    pub const fn valid_range(&self) -> Option<(f64, f64)> {
        match self {
            Self::Temperature | Self::TemperatureApparent | Self::DewPoint => {
                Some((-50.0, 60.0))
            }
            Self::Humidity
            | Self::PrecipitationProbability
            | Self::HailProbability
            | Self::CloudCover => Some((0.0, 100.0)),
            Self::WindSpeed | Self::WindGust => Some((0.0, 200.0)),
            Self::UvIndex => Some((0.0, 11.0)),
            _ => None,
        }
    }
}

impl std::fmt::Display for WeatherParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

/// One hourly forecast snapshot with values for the requested parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Start of the hour this point describes.
    pub timestamp: DateTime<Utc>,
    /// Values keyed by parameter.
    pub values: HashMap<WeatherParameter, f64>,
}

impl ForecastPoint {
    /// Creates a forecast point.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, values: HashMap<WeatherParameter, f64>) -> Self {
        Self { timestamp, values }
    }

    /// Returns the value for a parameter, if the point carries it.
    #[must_use]
    pub fn value(&self, parameter: WeatherParameter) -> Option<f64> {
        self.values.get(&parameter).copied()
    }
}

/// The present-moment observation for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    /// The city the observation belongs to, as requested by the caller.
    pub city: String,
    /// When the observation was taken.
    pub observed_at: DateTime<Utc>,
    /// Values keyed by parameter.
    pub values: HashMap<WeatherParameter, f64>,
}

impl CurrentConditions {
    /// Returns the value for a parameter, if present.
    #[must_use]
    pub fn value(&self, parameter: WeatherParameter) -> Option<f64> {
        self.values.get(&parameter).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parameter_tests {
        use super::*;
        use test_case::test_case;

        #[test]
        fn api_name_roundtrip() {
            for p in WeatherParameter::ALL {
                assert_eq!(WeatherParameter::from_api_name(p.api_name()), Some(*p));
            }
        }

        #[test]
        fn from_api_name_unknown() {
            assert_eq!(WeatherParameter::from_api_name("moonPhase"), None);
        }

        #[test]
        fn serde_uses_api_names() {
            let json = serde_json::to_string(&WeatherParameter::PrecipitationProbability);
            assert!(json.is_ok());
            assert_eq!(json.unwrap(), "\"precipitationProbability\"");

            let parsed: serde_json::Result<WeatherParameter> =
                serde_json::from_str("\"windSpeed\"");
            assert!(parsed.is_ok());
            assert_eq!(parsed.unwrap(), WeatherParameter::WindSpeed);
        }

        #[test]
        fn display_matches_api_name() {
            assert_eq!(
                format!("{}", WeatherParameter::Temperature),
                "temperature"
            );
        }

        #[test_case(WeatherParameter::Temperature, "°C"; "temperature")]
        #[test_case(WeatherParameter::WindSpeed, " m/s"; "wind speed")]
        #[test_case(WeatherParameter::Humidity, "%"; "humidity")]
        #[test_case(WeatherParameter::PressureSeaLevel, " hPa"; "pressure")]
        #[test_case(WeatherParameter::WeatherCode, ""; "weather code has no unit")]
        fn units(parameter: WeatherParameter, expected: &str) {
            assert_eq!(parameter.unit(), expected);
        }

        #[test]
        fn valid_ranges() {
            assert_eq!(
                WeatherParameter::Temperature.valid_range(),
                Some((-50.0, 60.0))
            );
            assert_eq!(WeatherParameter::Humidity.valid_range(), Some((0.0, 100.0)));
            assert_eq!(WeatherParameter::WindSpeed.valid_range(), Some((0.0, 200.0)));
            assert_eq!(WeatherParameter::WeatherCode.valid_range(), None);
            assert_eq!(WeatherParameter::PressureSeaLevel.valid_range(), None);
        }

        #[test]
        fn all_contains_every_variant_once() {
            let mut seen = std::collections::HashSet::new();
            for p in WeatherParameter::ALL {
                assert!(seen.insert(p.api_name()));
            }
            assert_eq!(seen.len(), 23);
        }
    }

    mod point_tests {
        use super::*;

        #[test]
        fn value_lookup() {
            let mut values = HashMap::new();
            values.insert(WeatherParameter::Temperature, 21.5);

            let point = ForecastPoint::new(Utc::now(), values);
            assert_eq!(point.value(WeatherParameter::Temperature), Some(21.5));
            assert_eq!(point.value(WeatherParameter::Humidity), None);
        }

        #[test]
        fn serialization_roundtrip() {
            let mut values = HashMap::new();
            values.insert(WeatherParameter::WindSpeed, 4.2);
            let original = ForecastPoint::new(Utc::now(), values);

            let json = serde_json::to_string(&original);
            assert!(json.is_ok());
            let parsed: serde_json::Result<ForecastPoint> =
                serde_json::from_str(&json.unwrap());
            assert!(parsed.is_ok());
            assert_eq!(parsed.unwrap(), original);
        }
    }
}
