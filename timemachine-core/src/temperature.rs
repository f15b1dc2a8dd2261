//! Temperature classification, comparison and formatting.
//!
//! All functions here are pure and total over finite inputs.

use serde::{Deserialize, Serialize};

use crate::model::{Language, TemperatureUnit};

/// Default `|diff|` (°C) at or below which two temperatures count as similar.
pub const DEFAULT_THRESHOLD: f64 = 2.0;

/// Half-open, lower-inclusive temperature bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureBand {
    /// (-inf, 0)
    Freezing,
    /// [0, 10)
    Cold,
    /// [10, 20)
    Mild,
    /// [20, 30)
    Warm,
    /// [30, +inf)
    Hot,
}

impl TemperatureBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureBand::Freezing => "freezing",
            TemperatureBand::Cold => "cold",
            TemperatureBand::Mild => "mild",
            TemperatureBand::Warm => "warm",
            TemperatureBand::Hot => "hot",
        }
    }

    /// Two-stop background gradient for this band.
    pub fn gradient(&self) -> [&'static str; 2] {
        match self {
            TemperatureBand::Freezing => ["#1e40af", "#3b82f6"],
            TemperatureBand::Cold => ["#0ea5e9", "#38bdf8"],
            TemperatureBand::Mild => ["#10b981", "#34d399"],
            TemperatureBand::Warm => ["#f59e0b", "#fbbf24"],
            TemperatureBand::Hot => ["#ef4444", "#f87171"],
        }
    }
}

impl std::fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_band(celsius: f64) -> TemperatureBand {
    if celsius < 0.0 {
        TemperatureBand::Freezing
    } else if celsius < 10.0 {
        TemperatureBand::Cold
    } else if celsius < 20.0 {
        TemperatureBand::Mild
    } else if celsius < 30.0 {
        TemperatureBand::Warm
    } else {
        TemperatureBand::Hot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonOutcome {
    Warmer,
    Colder,
    Similar,
}

impl ComparisonOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOutcome::Warmer => "warmer",
            ComparisonOutcome::Colder => "colder",
            ComparisonOutcome::Similar => "similar",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            ComparisonOutcome::Warmer => "↗",
            ComparisonOutcome::Colder => "↘",
            ComparisonOutcome::Similar => "→",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            ComparisonOutcome::Warmer => "#f59e0b",
            ComparisonOutcome::Colder => "#3b82f6",
            ComparisonOutcome::Similar => "#8b5cf6",
        }
    }

    pub fn text(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::Ko, ComparisonOutcome::Warmer) => "작년보다 따뜻해요",
            (Language::Ko, ComparisonOutcome::Colder) => "작년보다 추워요",
            (Language::Ko, ComparisonOutcome::Similar) => "작년과 비슷해요",
            (Language::En, ComparisonOutcome::Warmer) => "Warmer than last year",
            (Language::En, ComparisonOutcome::Colder) => "Colder than last year",
            (Language::En, ComparisonOutcome::Similar) => "Similar to last year",
        }
    }
}

impl std::fmt::Display for ComparisonOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `|current - previous| <= threshold` is similar; ties go to similar.
pub fn compare(current: f64, previous: f64, threshold: f64) -> ComparisonOutcome {
    let diff = current - previous;

    if diff.abs() <= threshold {
        ComparisonOutcome::Similar
    } else if diff > 0.0 {
        ComparisonOutcome::Warmer
    } else {
        ComparisonOutcome::Colder
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Round half toward positive infinity, so `-2.5` becomes `-2`, not `-3`.
///
/// Stays in `f64` so huge inputs don't saturate, and never yields `-0`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    let rounded = if value - value.floor() == 0.5 { value.ceil() } else { value.round() };
    rounded + 0.0
}

fn convert(celsius: f64, unit: TemperatureUnit) -> f64 {
    match unit {
        TemperatureUnit::C => celsius,
        TemperatureUnit::F => celsius_to_fahrenheit(celsius),
    }
}

fn suffix(unit: TemperatureUnit, show_unit: bool) -> String {
    if show_unit { format!("°{}", unit.symbol()) } else { "°".to_string() }
}

/// `"18°C"`, `"64°F"` or `"18°"`.
pub fn format_temperature(celsius: f64, unit: TemperatureUnit, show_unit: bool) -> String {
    let rounded = round_half_up(convert(celsius, unit));
    format!("{rounded}{}", suffix(unit, show_unit))
}

/// `"+3°C"`, `"-3°C"`, `"0°C"`.
pub fn format_difference(diff: f64) -> String {
    format_difference_in(diff, TemperatureUnit::C, true)
}

pub fn format_difference_in(diff: f64, unit: TemperatureUnit, show_unit: bool) -> String {
    let rounded = round_half_up(convert(diff, unit));
    let sign = if rounded > 0.0 { "+" } else { "" };
    format!("{sign}{rounded}{}", suffix(unit, show_unit))
}
