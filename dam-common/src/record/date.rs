//! Date parsing and the display rule for date fields
//!
//! Dates before [`CUTOFF_YEAR`] are placeholders (the recording log uses the
//! Unix epoch for "unknown") and display as an empty string. A date-time at
//! exactly midnight displays as a bare date, anything else to the minute.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Earliest year that displays; anything older is treated as unset
pub const CUTOFF_YEAR: i32 = 1986;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MINUTE_FORMAT: &str = "%Y-%m-%d %H:%M";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Whether a date is on or after the cutoff year
pub fn is_set(date: &NaiveDate) -> bool {
    use chrono::Datelike;
    date.year() >= CUTOFF_YEAR
}

/// Render a date-time field
pub fn display_date_time(dt: &NaiveDateTime) -> String {
    if !is_set(&dt.date()) {
        return String::new();
    }
    if dt.hour() == 0 && dt.minute() == 0 {
        return dt.format(DATE_FORMAT).to_string();
    }
    dt.format(MINUTE_FORMAT).to_string()
}

/// Render a date-only field
pub fn display_date(date: &NaiveDate) -> String {
    if !is_set(date) {
        return String::new();
    }
    date.format(DATE_FORMAT).to_string()
}

/// Parse the textual forms found in spreadsheets, database rows and RFC 3339
///
/// A bare date parses as midnight.
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, DATE_FORMAT) {
        return Some(date.and_time(NaiveTime::MIN));
    }

    DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.naive_local())
}

/// Convert Unix seconds to a UTC date-time
pub fn from_timestamp(seconds: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.naive_utc())
}
