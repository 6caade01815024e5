//! Time utilities: calendar-day parsing and timezone-aware day boundaries.

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::LazyLock;

static ISO_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid ISO day regex"));

static ORDINAL_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("valid ordinal regex")
});

/// Formats carrying a full date.
const DATED_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d %Y",
    "%d %B %Y",
    "%A %B %d %Y",
];

/// Formats missing the year; the reference year is appended before parsing.
const YEARLESS_FORMATS: &[&str] = &["%B %d %Y", "%d %B %Y", "%m/%d %Y"];

/// Parse a loose date token ("2024-06-12", "June 12, 2024", "yesterday")
/// into the canonical `YYYY-MM-DD` form, relative to the local date.
pub fn parse_calendar_day(raw: &str) -> Option<String> {
    parse_calendar_day_at(raw, Local::now().date_naive())
}

/// Like [`parse_calendar_day`], with an explicit reference date for relative
/// words and year-less forms.
pub fn parse_calendar_day_at(raw: &str, today: NaiveDate) -> Option<String> {
    parse_naive_day(raw, today).map(to_iso_day)
}

pub fn parse_naive_day(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Strict ISO first; a well-formed but impossible day is rejected outright.
    if ISO_DAY.is_match(trimmed) {
        return NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok();
    }

    match trimmed.to_lowercase().as_str() {
        "today" => return Some(today),
        "yesterday" => return Some(today - Duration::days(1)),
        _ => {}
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Some(ndt.date());
    }

    let cleaned = ORDINAL_SUFFIX.replace_all(trimmed, "$1").replace(',', " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Some(day) = DATED_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&cleaned, f).ok())
    {
        return Some(day);
    }

    let with_year = format!("{cleaned} {}", today.format("%Y"));
    YEARLESS_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(&with_year, f).ok())
}

pub fn to_iso_day(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Human-readable day, e.g. "Jun 12, 2024".
pub fn format_display_date(day: NaiveDate) -> String {
    day.format("%b %-d, %Y").to_string()
}

/// Parse an IANA timezone name like "America/Chicago".
pub fn parse_timezone(tz: &str) -> Result<Tz> {
    tz.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar day an instant falls on in `tz`.
pub fn calendar_day_in(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn today_in(tz: Tz) -> NaiveDate {
    calendar_day_in(Utc::now(), tz)
}
