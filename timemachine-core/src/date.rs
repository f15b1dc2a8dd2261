//! Calendar helpers: ISO parsing, year-relative labels and localized dates.
//!
//! Locale is always an explicit [`Language`] argument.

use chrono::{DateTime, Datelike, Local, Months, NaiveDate, Utc};

use crate::{error::DateError, model::Language};

const ISO_FORMAT: &str = "%Y-%m-%d";

const KO_WEEKDAYS: [&str; 7] = ["일요일", "월요일", "화요일", "수요일", "목요일", "금요일", "토요일"];

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Exactly four, two and two ASCII digits separated by `-`.
///
/// chrono alone also takes unpadded or signed fields (`2024-1-5`, `+2024-11-19`).
fn has_iso_shape(input: &str) -> bool {
    let bytes = input.as_bytes();

    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Parse `YYYY-MM-DD`. Invalid calendar dates (e.g. `2023-02-29`) are errors,
/// and so is anything not in exactly that shape, surrounding whitespace included.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, DateError> {
    let malformed = |source| DateError::Malformed {
        input: input.to_string(),
        source,
    };

    if !has_iso_shape(input) {
        return Err(malformed(None));
    }

    NaiveDate::parse_from_str(input, ISO_FORMAT).map_err(|e| malformed(Some(e)))
}

pub fn format_iso_date(date: NaiveDate) -> String {
    date.format(ISO_FORMAT).to_string()
}

/// Same month/day one year earlier; Feb 29 clamps to Feb 28.
pub fn last_year_date(date: NaiveDate) -> Result<NaiveDate, DateError> {
    date.checked_sub_months(Months::new(12))
        .ok_or(DateError::OutOfRange(date))
}

/// `"2024년 (올해)"`, `"2023 (Last Year)"`, or the bare year.
pub fn year_label(
    iso_date: &str,
    current_year: i32,
    language: Language,
) -> Result<String, DateError> {
    let year = parse_iso_date(iso_date)?.year();

    let label = match language {
        Language::Ko if year == current_year => format!("{year}년 (올해)"),
        Language::Ko if year == current_year - 1 => format!("{year}년 (작년)"),
        Language::Ko => format!("{year}년"),
        Language::En if year == current_year => format!("{year} (This Year)"),
        Language::En if year == current_year - 1 => format!("{year} (Last Year)"),
        Language::En => format!("{year}"),
    };

    Ok(label)
}

/// `"11월 19일 화요일"` or `"Tuesday, November 19"`.
pub fn format_localized(iso_date: &str, language: Language) -> Result<String, DateError> {
    let date = parse_iso_date(iso_date)?;

    let text = match language {
        Language::Ko => {
            let weekday = KO_WEEKDAYS[date.weekday().num_days_from_sunday() as usize];
            format!("{}월 {}일 {weekday}", date.month(), date.day())
        }
        Language::En => date.format("%A, %B %-d").to_string(),
    };

    Ok(text)
}

/// Coarse relative time: seconds, minutes, hours, then days.
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>, language: Language) -> String {
    let secs = (now - then).num_seconds();
    let mins = secs / 60;
    let hours = mins / 60;
    let days = hours / 24;

    match language {
        Language::Ko if secs < 60 => "방금".to_string(),
        Language::Ko if mins < 60 => format!("{mins}분 전"),
        Language::Ko if hours < 24 => format!("{hours}시간 전"),
        Language::Ko => format!("{days}일 전"),
        Language::En if secs < 60 => "Just now".to_string(),
        Language::En if mins < 60 => format!("{mins}m ago"),
        Language::En if hours < 24 => format!("{hours}h ago"),
        Language::En => format!("{days}d ago"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        parse_iso_date(s).expect("valid date")
    }

    #[test]
    fn last_year_of_leap_day_is_feb_28() {
        assert_eq!(format_iso_date(last_year_date(date("2024-02-29")).unwrap()), "2023-02-28");
    }

    #[test]
    fn last_year_keeps_month_and_day() {
        assert_eq!(last_year_date(date("2024-11-19")).unwrap(), date("2023-11-19"));
        assert_eq!(last_year_date(date("2025-01-01")).unwrap(), date("2024-01-01"));
    }

    #[test]
    fn year_label_korean() {
        assert_eq!(year_label("2024-11-19", 2024, Language::Ko).unwrap(), "2024년 (올해)");
        assert_eq!(year_label("2023-11-19", 2024, Language::Ko).unwrap(), "2023년 (작년)");
        assert_eq!(year_label("2021-11-19", 2024, Language::Ko).unwrap(), "2021년");
    }

    #[test]
    fn year_label_english() {
        let last = year_label("2023-11-19", 2024, Language::En).unwrap();
        assert!(last.contains("2023"));
        assert!(last.contains("Last Year"));
        assert_eq!(year_label("2024-01-01", 2024, Language::En).unwrap(), "2024 (This Year)");
        assert_eq!(year_label("2025-01-01", 2024, Language::En).unwrap(), "2025");
    }

    #[test]
    fn malformed_dates_are_errors() {
        let bad_inputs = [
            "",
            "2024/11/19",
            "yesterday",
            "2023-02-29",
            "2024-13-01",
            "2024-1-5",
            "+2024-11-19",
            " 2024-11-19 ",
            "2024-11-19\n",
            "２０２４-11-19",
        ];
        for bad in bad_inputs {
            let err = year_label(bad, 2024, Language::Ko).unwrap_err();
            assert!(err.to_string().contains("Malformed date"), "{bad}: {err}");
            assert!(format_localized(bad, Language::En).is_err());
        }
    }

    #[test]
    fn malformed_error_keeps_chrono_cause_only_when_chrono_rejected_it() {
        use std::error::Error as _;

        let shape = parse_iso_date("2024-1-5").unwrap_err();
        assert!(shape.source().is_none());

        let calendar = parse_iso_date("2023-02-29").unwrap_err();
        assert!(calendar.source().is_some());
    }

    #[test]
    fn localized_dates() {
        assert_eq!(format_localized("2024-11-19", Language::Ko).unwrap(), "11월 19일 화요일");
        assert_eq!(format_localized("2024-11-19", Language::En).unwrap(), "Tuesday, November 19");
        assert_eq!(format_localized("2023-01-01", Language::Ko).unwrap(), "1월 1일 일요일");
    }

    #[test]
    fn time_ago_buckets() {
        let now = Utc::now();

        assert_eq!(time_ago(now - Duration::seconds(10), now, Language::Ko), "방금");
        assert_eq!(time_ago(now - Duration::minutes(5), now, Language::Ko), "5분 전");
        assert_eq!(time_ago(now - Duration::hours(3), now, Language::En), "3h ago");
        assert_eq!(time_ago(now - Duration::days(2), now, Language::En), "2d ago");
        assert_eq!(time_ago(now - Duration::seconds(59), now, Language::En), "Just now");
    }
}
