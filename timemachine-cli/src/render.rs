use std::fmt::Write as _;

use anyhow::Result;
use chrono::{DateTime, Datelike, Utc};
use timemachine_core::{
    Language, LocationInfo, TemperatureUnit, WeatherComparison, WeatherRecord,
    date::{format_iso_date, format_localized, time_ago, year_label},
    temperature::{classify_band, format_difference, format_temperature},
};

struct Labels {
    feels_like: &'static str,
    humidity: &'static str,
    wind: &'static str,
    updated: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::Ko => Labels {
            feels_like: "체감",
            humidity: "습도",
            wind: "바람",
            updated: "업데이트",
        },
        Language::En => Labels {
            feels_like: "feels like",
            humidity: "humidity",
            wind: "wind",
            updated: "updated",
        },
    }
}

fn record_line(record: &WeatherRecord, anchor_year: i32, language: Language) -> Result<String> {
    let l = labels(language);
    let label = year_label(&format_iso_date(record.date), anchor_year, language)?;

    Ok(format!(
        "{label:<18} {} {:>5}  ({} {})  {} {}%  {} {} km/h  AQI {}",
        record.condition.icon(),
        format_temperature(f64::from(record.temperature), TemperatureUnit::C, true),
        l.feels_like,
        format_temperature(f64::from(record.feels_like), TemperatureUnit::C, true),
        l.humidity,
        record.humidity,
        l.wind,
        record.wind_speed,
        record.aqi,
    ))
}

/// Human-readable comparison block for the terminal.
pub fn comparison(
    place: &LocationInfo,
    cmp: &WeatherComparison,
    language: Language,
    threshold: f64,
    now: DateTime<Utc>,
) -> Result<String> {
    let anchor_year = cmp.today.date.year();
    let outcome = cmp.outcome(threshold);
    let band = classify_band(f64::from(cmp.today.temperature));
    let [from, to] = band.gradient();

    let mut out = String::new();
    writeln!(
        out,
        "📍 {} {} ({:.4}, {:.4})",
        place.city, place.district, place.coords.latitude, place.coords.longitude
    )?;
    writeln!(out, "{}", format_localized(&format_iso_date(cmp.today.date), language)?)?;
    writeln!(out)?;
    writeln!(out, "{}", record_line(&cmp.today, anchor_year, language)?)?;
    writeln!(out, "{}", record_line(&cmp.last_year, anchor_year, language)?)?;
    writeln!(out)?;
    writeln!(
        out,
        "{} {}  {}",
        outcome.arrow(),
        format_difference(f64::from(cmp.difference())),
        outcome.text(language)
    )?;
    writeln!(out, "[{band}: {from} → {to}]")?;
    write!(out, "{}: {}", labels(language).updated, time_ago(cmp.last_updated, now, language))?;

    Ok(out)
}
