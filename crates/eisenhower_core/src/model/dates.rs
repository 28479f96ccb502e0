//! Canonical text forms for due dates and timestamps.
//!
//! Storage always writes ISO `YYYY-MM-DD` dates and RFC 3339 UTC timestamps.
//! Parsers used at import boundaries also accept the legacy forms found in
//! older exports (`DD/MM/YYYY` dates, timestamps without an offset).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

const ISO_DATE: &str = "%Y-%m-%d";
const LEGACY_DATE: &str = "%d/%m/%Y";
const NAIVE_TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

pub fn format_date(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

/// Parses the canonical ISO date form only.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE).ok()
}

/// Parses ISO dates, falling back to day/month/year.
pub fn parse_date_lenient(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    parse_date(trimmed).or_else(|| NaiveDate::parse_from_str(trimmed, LEGACY_DATE).ok())
}

/// RFC 3339 in UTC, keeping sub-second precision so reads round-trip exactly.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parses RFC 3339, or a naive ISO timestamp interpreted as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}
