//! PostgreSQL date/time text decoder.
//!
//! Handles the ISO output style (`DateStyle = ISO`):
//! - `date`: `2024-10-21`
//! - `timestamp`: `2024-10-21 12:36:05` with optional fraction
//! - `timestamptz`: the same followed by a zone offset (`+02`, `-05:30`)
//!
//! Zone offsets are dropped; the wall-clock value is kept. Special values
//! (`infinity`, `-infinity`) and BC dates decode to `None`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Decode a `timestamp`, `timestamptz` or `date` cell.
///
/// A bare date decodes to midnight of that day.
///
/// # Example
/// ```
/// use pg_typecache::decode::decode_datetime;
///
/// let ts = decode_datetime("2024-10-21 12:36:05.25+02").unwrap();
/// assert_eq!(ts.to_string(), "2024-10-21 12:36:05.250");
/// ```
pub fn decode_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() || text.ends_with(" BC") {
        return None;
    }

    let (date_part, time_part) = match text.split_once([' ', 'T']) {
        Some((d, t)) => (d, Some(t)),
        None => (text, None),
    };

    let date = decode_date(date_part)?;
    let time = match time_part {
        Some(t) => NaiveTime::parse_from_str(strip_zone(t), "%H:%M:%S%.f").ok()?,
        None => NaiveTime::MIN,
    };

    Some(date.and_time(time))
}

/// Decode a `date` cell.
pub fn decode_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let date_part = text.split_once(' ').map_or(text, |(d, _)| d);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Remove a trailing `+HH[:MM[:SS]]`, `-HH...` or `Z` zone suffix.
fn strip_zone(time: &str) -> &str {
    let time = time.strip_suffix('Z').unwrap_or(time);
    match time.rfind(['+', '-']) {
        Some(pos) => &time[..pos],
        None => time,
    }
}
