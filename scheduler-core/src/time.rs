//! Timestamp parsing in the configured local time zone.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Weekday};
use chrono_tz::Tz;

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S"];

/// Parse an API timestamp.
///
/// Timestamps without an offset are wall-clock time in `tz`. RFC 3339
/// timestamps are converted to `tz`, so every event carries the local offset
/// whatever offset the source used.
pub fn parse_timestamp(value: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&tz).fixed_offset());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .and_then(|naive| localize(naive, tz))
}

/// Combine a calendar date and a time of day into a local timestamp.
pub fn combine_date_time(date: &str, time: &str, tz: Tz) -> Option<DateTime<FixedOffset>> {
    let date = parse_date(date)?;
    let time = TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(time.trim(), fmt).ok())?;

    localize(date.and_time(time), tz)
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value.trim(), fmt).ok())
}

/// Resolve a wall-clock time in `tz`. Ambiguous times (DST fall-back) take
/// the earlier instant; times inside a DST gap do not exist and yield `None`.
fn localize(naive: NaiveDateTime, tz: Tz) -> Option<DateTime<FixedOffset>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

/// German weekday label, as used by the schedule API.
pub fn german_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Montag",
        Weekday::Tue => "Dienstag",
        Weekday::Wed => "Mittwoch",
        Weekday::Thu => "Donnerstag",
        Weekday::Fri => "Freitag",
        Weekday::Sat => "Samstag",
        Weekday::Sun => "Sonntag",
    }
}
