//! Lenient date and timestamp parsing for loosely typed records.

use jiff::{
    Timestamp,
    civil::{Date, DateTime},
    tz::TimeZone,
};

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 / ISO 8601 instants with an offset, and offset-less date-times
/// which are read as UTC. Blank or malformed input yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    if let Ok(timestamp) = raw.parse::<Timestamp>() {
        return Some(timestamp);
    }

    raw.parse::<DateTime>()
        .ok()
        .and_then(|datetime| datetime.to_zoned(TimeZone::UTC).ok())
        .map(|zoned| zoned.timestamp())
}

/// Parse a calendar date, either `YYYY-MM-DD` or a full timestamp.
///
/// A timestamp that falls after midnight UTC rounds up to the following day, so a
/// deadline is never brought forward.
pub fn parse_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();

    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = raw.parse::<Date>() {
        return Some(date);
    }

    let datetime = parse_timestamp(raw)?.to_zoned(TimeZone::UTC).datetime();

    if datetime.time() == jiff::civil::Time::midnight() {
        Some(datetime.date())
    } else {
        datetime.date().tomorrow().ok()
    }
}
