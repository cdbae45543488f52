//! Timestamp parsing and rendering for the date column.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

/// Date-time layouts tried in order.
const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts tried in order; month-first for slashed dates.
const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Parse one date cell. Returns `None` for anything unrecognised.
///
/// Offsets (RFC 3339) are converted to UTC before the offset is dropped.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(ts);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_utc());
    }

    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
    {
        return Some(date.and_time(NaiveTime::MIN));
    }

    parse_compact_date(value).map(|date| date.and_time(NaiveTime::MIN))
}

/// `YYYYMMDD`, as written by loggers that store dates as integers.
fn parse_compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = value[0..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Render timestamps for export.
///
/// Date-only data keeps the `YYYY-MM-DD` form; as soon as one timestamp has a
/// time of day, every row is written with its time.
pub fn format_timestamps(timestamps: &[NaiveDateTime]) -> Vec<String> {
    let date_only = timestamps.iter().all(|ts| ts.time() == NaiveTime::MIN);
    let layout = if date_only {
        "%Y-%m-%d"
    } else {
        "%Y-%m-%d %H:%M:%S%.f"
    };
    timestamps
        .iter()
        .map(|ts| ts.format(layout).to_string())
        .collect()
}
