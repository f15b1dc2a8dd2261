//! Synthetic weather records for demos and development.
//!
//! Every function takes its random source explicitly so callers (and tests)
//! decide between OS-seeded and fixed-seed output.

use std::ops::Range;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;

use crate::{
    date::last_year_date,
    error::DateError,
    model::{WeatherComparison, WeatherCondition, WeatherRecord},
    temperature::round_half_up,
};

/// Pairs closer than this (°C) get pushed apart.
pub const CONTRAST_THRESHOLD: i32 = 3;
/// Distance (°C) a too-similar last-year reading is moved to.
pub const CONTRAST_DELTA: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Seoul-flavoured seasons: winter runs December through March.
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            12 | 1..=3 => Season::Winter,
            4..=6 => Season::Spring,
            7..=9 => Season::Summer,
            _ => Season::Fall,
        }
    }

    pub fn temperature_range(&self) -> Range<f64> {
        match self {
            Season::Winter => -5.0..5.0,
            Season::Spring | Season::Fall => 10.0..25.0,
            Season::Summer => 25.0..35.0,
        }
    }
}

fn random_condition<R: Rng + ?Sized>(rng: &mut R) -> WeatherCondition {
    let all = WeatherCondition::all();
    all[rng.random_range(0..all.len())]
}

/// `temperature` moved by at most 2°C either way.
fn jittered_feels_like<R: Rng + ?Sized>(temperature: i32, rng: &mut R) -> i32 {
    temperature + round_half_up(rng.random_range(-2.0..2.0)) as i32
}

/// One synthetic record for `date`. `is_anchor` marks the "today" side of a pair.
pub fn generate_record<R: Rng + ?Sized>(
    date: NaiveDate,
    is_anchor: bool,
    rng: &mut R,
) -> WeatherRecord {
    let season = Season::of(date);
    let temperature = round_half_up(rng.random_range(season.temperature_range())) as i32;

    let record = WeatherRecord {
        date,
        temperature,
        feels_like: jittered_feels_like(temperature, rng),
        condition: random_condition(rng),
        humidity: rng.random_range(30.0..70.0_f64).round() as u8,
        wind_speed: rng.random_range(5.0..25.0_f64).round(),
        aqi: rng.random_range(20.0..120.0_f64).round() as u32,
    };

    tracing::trace!(
        %date,
        is_anchor,
        ?season,
        temperature = record.temperature,
        "generated mock record"
    );
    record
}

/// Push `last_year` to exactly `today ± CONTRAST_DELTA` when the pair is too
/// close to tell apart; otherwise return it unchanged.
pub fn ensure_contrast<R: Rng + ?Sized>(
    today: &WeatherRecord,
    last_year: WeatherRecord,
    rng: &mut R,
) -> WeatherRecord {
    if (today.temperature - last_year.temperature).abs() >= CONTRAST_THRESHOLD {
        return last_year;
    }

    let delta = if rng.random_bool(0.5) { CONTRAST_DELTA } else { -CONTRAST_DELTA };
    let temperature = today.temperature + delta;

    WeatherRecord {
        temperature,
        feels_like: jittered_feels_like(temperature, rng),
        ..last_year
    }
}

/// A contrasting (today, one year earlier) pair anchored on `anchor`.
pub fn generate_comparison<R: Rng + ?Sized>(
    anchor: NaiveDate,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<WeatherComparison, DateError> {
    let previous = last_year_date(anchor)?;

    let today = generate_record(anchor, true, rng);
    let last_year = generate_record(previous, false, rng);
    let last_year = ensure_contrast(&today, last_year, rng);

    Ok(WeatherComparison { today, last_year, last_updated: now })
}

/// Fixed demo comparisons, one per outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Warmer,
    Colder,
    Similar,
}

impl Scenario {
    pub const fn all() -> &'static [Scenario] {
        &[Scenario::Warmer, Scenario::Colder, Scenario::Similar]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Warmer => "warmer",
            Scenario::Colder => "colder",
            Scenario::Similar => "similar",
        }
    }

    pub fn comparison(
        &self,
        anchor: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<WeatherComparison, DateError> {
        use WeatherCondition::*;

        // (temperature, feels_like, condition, humidity, wind, aqi)
        type Fixture = (i32, i32, WeatherCondition, u8, f64, u32);

        let (t, l): (Fixture, Fixture) = match self {
            Scenario::Warmer => ((18, 16, Sunny, 45, 12.0, 45), (12, 10, Cloudy, 60, 15.0, 78)),
            Scenario::Colder => ((8, 5, Rainy, 75, 18.0, 62), (15, 13, Sunny, 50, 10.0, 35)),
            Scenario::Similar => ((14, 13, Cloudy, 55, 14.0, 58), (15, 14, Cloudy, 52, 13.0, 54)),
        };

        let record = |date: NaiveDate, fixture: Fixture| {
            let (temperature, feels_like, condition, humidity, wind_speed, aqi) = fixture;
            WeatherRecord {
                date,
                temperature,
                feels_like,
                condition,
                humidity,
                wind_speed,
                aqi,
            }
        };

        Ok(WeatherComparison {
            today: record(anchor, t),
            last_year: record(last_year_date(anchor)?, l),
            last_updated: now,
        })
    }
}

impl TryFrom<&str> for Scenario {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Scenario::all()
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                anyhow::anyhow!("Unknown scenario '{value}'. Supported: warmer, colder, similar.")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        date::parse_iso_date,
        temperature::{ComparisonOutcome, DEFAULT_THRESHOLD},
    };
    use rand::{SeedableRng, rngs::StdRng};

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).expect("valid date")
    }

    fn record(temperature: i32) -> WeatherRecord {
        WeatherRecord {
            date: date("2023-11-19"),
            temperature,
            feels_like: temperature,
            condition: WeatherCondition::Sunny,
            humidity: 40,
            wind_speed: 8.0,
            aqi: 30,
        }
    }

    #[test]
    fn seasons_follow_month_table() {
        assert_eq!(Season::of(date("2024-12-01")), Season::Winter);
        assert_eq!(Season::of(date("2024-03-31")), Season::Winter);
        assert_eq!(Season::of(date("2024-04-01")), Season::Spring);
        assert_eq!(Season::of(date("2024-08-15")), Season::Summer);
        assert_eq!(Season::of(date("2024-10-10")), Season::Fall);
    }

    #[test]
    fn generated_fields_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        for day in ["2024-01-15", "2024-05-15", "2024-08-15", "2024-11-15"] {
            let d = date(day);
            let range = Season::of(d).temperature_range();
            for _ in 0..200 {
                let r = generate_record(d, false, &mut rng);
                assert_eq!(r.date, d);
                assert!(f64::from(r.temperature) >= range.start.floor());
                assert!(f64::from(r.temperature) <= range.end);
                assert!((r.feels_like - r.temperature).abs() <= 2);
                assert!((30..=70).contains(&r.humidity));
                assert!((5.0..=25.0).contains(&r.wind_speed));
                assert!((20..=120).contains(&r.aqi));
            }
        }
    }

    #[test]
    fn same_seed_same_output() {
        let anchor = date("2024-11-19");
        let now = Utc::now();

        let a = generate_comparison(anchor, now, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = generate_comparison(anchor, now, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn close_pairs_are_forced_exactly_five_apart() {
        let mut rng = StdRng::seed_from_u64(1);
        let today = record(10);

        for last in [8, 9, 10, 11, 12] {
            let adjusted = ensure_contrast(&today, record(last), &mut rng);
            assert_eq!((today.temperature - adjusted.temperature).abs(), CONTRAST_DELTA);
            assert!((adjusted.feels_like - adjusted.temperature).abs() <= 2);
            assert_eq!(adjusted.date, date("2023-11-19"));
        }
    }

    #[test]
    fn distinct_pairs_are_left_alone() {
        let mut rng = StdRng::seed_from_u64(1);
        let today = record(10);

        for last in [7, 13, 30] {
            let original = record(last);
            assert_eq!(ensure_contrast(&today, original.clone(), &mut rng), original);
        }
    }

    #[test]
    fn generated_comparisons_always_contrast() {
        let anchor = date("2024-02-29");

        for seed in 0..500 {
            let mut rng = StdRng::seed_from_u64(seed);
            let cmp = generate_comparison(anchor, Utc::now(), &mut rng).unwrap();
            assert!(cmp.difference().abs() >= CONTRAST_THRESHOLD, "seed {seed}");
            assert_eq!(cmp.today.date, anchor);
            assert_eq!(cmp.last_year.date, date("2023-02-28"));
        }
    }

    #[test]
    fn scenarios_produce_their_outcome() {
        let anchor = date("2024-11-19");

        for scenario in Scenario::all() {
            let cmp = scenario.comparison(anchor, Utc::now()).unwrap();
            let expected = match scenario {
                Scenario::Warmer => ComparisonOutcome::Warmer,
                Scenario::Colder => ComparisonOutcome::Colder,
                Scenario::Similar => ComparisonOutcome::Similar,
            };
            assert_eq!(cmp.outcome(DEFAULT_THRESHOLD), expected);
            assert_eq!(Scenario::try_from(scenario.as_str()).unwrap(), *scenario);
        }
    }
}
