use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::temperature::{self, ComparisonOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

impl WeatherCondition {
    pub const fn all() -> &'static [WeatherCondition] {
        &[
            WeatherCondition::Sunny,
            WeatherCondition::Cloudy,
            WeatherCondition::Rainy,
            WeatherCondition::Snowy,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Snowy => "snowy",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "☀️",
            WeatherCondition::Cloudy => "☁️",
            WeatherCondition::Rainy => "🌧️",
            WeatherCondition::Snowy => "❄️",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One day's weather at one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub date: NaiveDate,
    pub temperature: i32,
    pub feels_like: i32,
    #[serde(rename = "weatherCondition")]
    pub condition: WeatherCondition,
    /// Percent, 0..=100.
    pub humidity: u8,
    /// km/h.
    pub wind_speed: f64,
    pub aqi: u32,
}

/// Today against the same calendar day one year earlier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherComparison {
    pub today: WeatherRecord,
    pub last_year: WeatherRecord,
    pub last_updated: DateTime<Utc>,
}

impl WeatherComparison {
    /// `today - last_year`, in °C.
    pub fn difference(&self) -> i32 {
        self.today.temperature - self.last_year.temperature
    }

    pub fn outcome(&self, threshold: f64) -> ComparisonOutcome {
        temperature::compare(
            f64::from(self.today.temperature),
            f64::from(self.last_year.temperature),
            threshold,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub district: String,
    pub coords: Coordinates,
}

/// Display language. Always passed explicitly; nothing reads an ambient locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ko,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }

    pub const fn all() -> &'static [Language] {
        &[Language::Ko, Language::En]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Language {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "ko" | "korean" => Ok(Language::Ko),
            "en" | "english" => Ok(Language::En),
            _ => Err(anyhow::anyhow!("Unknown language '{value}'. Supported languages: ko, en.")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    C,
    F,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::C => "C",
            TemperatureUnit::F => "F",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, temperature: i32) -> WeatherRecord {
        WeatherRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid date"),
            temperature,
            feels_like: temperature - 1,
            condition: WeatherCondition::Cloudy,
            humidity: 50,
            wind_speed: 10.0,
            aqi: 40,
        }
    }

    #[test]
    fn language_roundtrip() {
        for lang in Language::all() {
            let parsed = Language::try_from(lang.as_str()).expect("roundtrip should succeed");
            assert_eq!(*lang, parsed);
        }
    }

    #[test]
    fn unknown_language_error() {
        let err = Language::try_from("fr").unwrap_err();
        assert!(err.to_string().contains("Unknown language"));
    }

    #[test]
    fn comparison_difference_and_outcome() {
        let cmp = WeatherComparison {
            today: record("2024-11-19", 18),
            last_year: record("2023-11-19", 12),
            last_updated: Utc::now(),
        };

        assert_eq!(cmp.difference(), 6);
        assert_eq!(cmp.outcome(2.0), ComparisonOutcome::Warmer);
    }

    #[test]
    fn record_serializes_with_wire_names() {
        let json = serde_json::to_value(record("2024-11-19", 3)).expect("serialize");

        assert_eq!(json["date"], "2024-11-19");
        assert_eq!(json["feelsLike"], 2);
        assert_eq!(json["weatherCondition"], "cloudy");
        assert_eq!(json["windSpeed"], 10.0);
    }
}
