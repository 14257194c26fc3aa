//! Lenient timestamp parsing and epoch-millisecond helpers.

use jiff::civil::{Date, DateTime, Time};
use jiff::tz::TimeZone;
use jiff::Timestamp;

pub type EpochMillis = i64;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;
pub const MILLIS_PER_DAY: EpochMillis = 24 * 3_600_000;

/// Parse a date-time with or without an offset.
///
/// Strings carrying `Z` or an offset are taken as written; zone-less
/// date-times and bare dates are read as UTC. The space separator is accepted
/// in place of `T`.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let iso = if trimmed.contains('T') {
        trimmed.to_string()
    } else {
        trimmed.replacen(' ', "T", 1)
    };

    if let Ok(ts) = iso.parse::<Timestamp>() {
        return Some(ts);
    }
    let civil = iso
        .parse::<DateTime>()
        .ok()
        .or_else(|| iso.parse::<Date>().ok().map(|d| d.to_datetime(Time::midnight())))?;
    civil.to_zoned(TimeZone::UTC).ok().map(|zoned| zoned.timestamp())
}

/// Calendar day key (`YYYY-MM-DD`) for a resolved timestamp.
///
/// The date written in the source text wins over the UTC date of the
/// instant, so a `2024-03-01T00:30:00+02:00` route stays on March 1st.
pub fn day_key(raw: &str, ts: Timestamp) -> String {
    let trimmed = raw.trim();
    if let Some(prefix) = trimmed.get(..10) {
        if prefix.parse::<Date>().is_ok() {
            return prefix.to_string();
        }
    }
    ts.to_zoned(TimeZone::UTC).date().to_string()
}

pub fn to_millis(ts: Timestamp) -> EpochMillis {
    ts.as_millisecond()
}

/// Out-of-range values clamp to the representable bounds.
pub fn from_millis(millis: EpochMillis) -> Timestamp {
    Timestamp::from_millisecond(millis).unwrap_or(if millis > 0 {
        Timestamp::MAX
    } else {
        Timestamp::MIN
    })
}

/// Whole milliseconds covering `hours`, rounded up.
pub fn hours_to_millis_ceil(hours: f64) -> EpochMillis {
    (hours * MILLIS_PER_HOUR).ceil() as EpochMillis
}

pub fn hours_to_millis(hours: f64) -> EpochMillis {
    (hours * MILLIS_PER_HOUR).round() as EpochMillis
}
