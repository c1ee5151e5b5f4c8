use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};

use crate::model::Timestamp;

/// Offset-qualified layouts accepted in addition to RFC 3339.
const LENIENT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];

/// Local layouts, used only to tell "missing offset" apart from garbage.
const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const LOCAL_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampError {
    Empty,
    MissingOffset,
    Unparsable,
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Empty => write!(f, "timestamp must be a non-empty string"),
            TimestampError::MissingOffset => write!(f, "timestamp must include a timezone offset"),
            TimestampError::Unparsable => write!(f, "not an ISO-8601 timestamp"),
        }
    }
}

impl std::error::Error for TimestampError {}

/// Parse an offset-qualified ISO-8601 timestamp and normalize it to UTC.
///
/// A trailing `Z` (or `z`) is shorthand for `+00:00`.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, TimestampError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(TimestampError::Empty);
    }
    let normalized = match s.strip_suffix('Z').or_else(|| s.strip_suffix('z')) {
        Some(head) => format!("{head}+00:00"),
        None => s.to_string(),
    };

    let parsed = DateTime::parse_from_rfc3339(&normalized).ok().or_else(|| {
        LENIENT_FORMATS
            .iter()
            .find_map(|fmt| DateTime::<FixedOffset>::parse_from_str(&normalized, fmt).ok())
    });
    if let Some(dt) = parsed {
        // chrono represents a leap second as nanosecond >= 1e9; reject `:60`.
        if dt.nanosecond() >= 1_000_000_000 {
            return Err(TimestampError::Unparsable);
        }
        return Ok(dt.with_timezone(&Utc));
    }

    let local = LOCAL_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(s, fmt).is_ok())
        || NaiveDate::parse_from_str(s, LOCAL_DATE_FORMAT).is_ok();
    if local {
        return Err(TimestampError::MissingOffset);
    }
    Err(TimestampError::Unparsable)
}

/// Render in UTC with a literal `Z`; fractional seconds only when present.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2030, 1, 1, h, m, 0).unwrap()
    }

    #[test]
    fn z_suffix_and_zero_offset_are_equivalent() {
        let z = parse_timestamp("2030-01-01T10:00:00Z").unwrap();
        let offset = parse_timestamp("2030-01-01T10:00:00+00:00").unwrap();
        let lower = parse_timestamp("2030-01-01T10:00:00z").unwrap();
        assert_eq!(z, offset);
        assert_eq!(z, lower);
        assert_eq!(z, utc(10, 0));
    }

    #[test]
    fn non_utc_offsets_are_normalized() {
        assert_eq!(parse_timestamp("2030-01-01T12:00:00+02:00").unwrap(), utc(10, 0));
        assert_eq!(parse_timestamp("2030-01-01T05:30:00-04:30").unwrap(), utc(10, 0));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse_timestamp("  2030-01-01T10:00:00Z \n").unwrap(), utc(10, 0));
    }

    #[test]
    fn minutes_precision_is_accepted() {
        assert_eq!(parse_timestamp("2030-01-01T12:00+02:00").unwrap(), utc(10, 0));
        assert_eq!(parse_timestamp("2030-01-01T10:00Z").unwrap(), utc(10, 0));
    }

    #[test]
    fn space_separator_is_accepted() {
        assert_eq!(parse_timestamp("2030-01-01 10:00:00+00:00").unwrap(), utc(10, 0));
    }

    #[test]
    fn fractional_seconds_survive() {
        let ts = parse_timestamp("2030-01-01T10:00:00.123456Z").unwrap();
        assert_eq!(ts.nanosecond(), 123_456_000);
        assert_eq!(format_timestamp(&ts), "2030-01-01T10:00:00.123456Z");
    }

    #[test]
    fn missing_offset_is_reported() {
        assert_eq!(
            parse_timestamp("2030-01-01T10:00:00"),
            Err(TimestampError::MissingOffset)
        );
        assert_eq!(
            parse_timestamp("2030-01-01T10:00"),
            Err(TimestampError::MissingOffset)
        );
    }

    #[test]
    fn date_only_reports_missing_offset() {
        assert_eq!(parse_timestamp("2030-01-01"), Err(TimestampError::MissingOffset));
    }

    #[test]
    fn leap_second_is_rejected() {
        assert_eq!(
            parse_timestamp("2030-01-01T23:59:60Z"),
            Err(TimestampError::Unparsable)
        );
        assert_eq!(
            parse_timestamp("2030-01-01 23:59:60+00:00"),
            Err(TimestampError::Unparsable)
        );
    }

    #[test]
    fn garbage_is_unparsable() {
        assert_eq!(parse_timestamp("tomorrow"), Err(TimestampError::Unparsable));
        assert_eq!(parse_timestamp("2030-13-01T10:00:00Z"), Err(TimestampError::Unparsable));
        assert_eq!(parse_timestamp("Z"), Err(TimestampError::Unparsable));
    }

    #[test]
    fn empty_is_reported() {
        assert_eq!(parse_timestamp(""), Err(TimestampError::Empty));
        assert_eq!(parse_timestamp("   "), Err(TimestampError::Empty));
    }

    #[test]
    fn formatting_uses_z_suffix() {
        assert_eq!(format_timestamp(&utc(10, 0)), "2030-01-01T10:00:00Z");
        let parsed = parse_timestamp("2030-01-01T12:00:00+02:00").unwrap();
        assert_eq!(format_timestamp(&parsed), "2030-01-01T10:00:00Z");
    }
}
