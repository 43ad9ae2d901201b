//! Clock-time helpers shared by the window calculator, the availability
//! scorer and the config loader.
//!
//! Clock times travel as `"HH:MM"` strings on the wire (`"17:15"`), which is
//! what reservation widgets report. Seconds are accepted on input and dropped.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};

const CLOCK_FORMAT: &str = "%H:%M";

/// Parse `"HH:MM"` or `"HH:MM:SS"` into a clock time with seconds stripped.
pub fn parse_clock(raw: &str) -> Option<NaiveTime> {
    let trimmed = raw.trim();
    let parsed = NaiveTime::parse_from_str(trimmed, CLOCK_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()?;
    NaiveTime::from_hms_opt(parsed.hour(), parsed.minute(), 0)
}

/// Format a clock time as `"HH:MM"`.
pub fn format_clock(time: NaiveTime) -> String {
    time.format(CLOCK_FORMAT).to_string()
}

/// Format the clock part of a local timestamp as `"HH:MM"`.
pub fn format_clock_of(at: NaiveDateTime) -> String {
    format_clock(at.time())
}

/// Minutes since midnight.
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Serde adapter for `NaiveTime` fields written as `"HH:MM"`.
pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_clock(*time))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_clock(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid clock time '{raw}', expected HH:MM")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clock_variants() {
        assert_eq!(parse_clock("17:15"), NaiveTime::from_hms_opt(17, 15, 0));
        assert_eq!(parse_clock(" 07:05 "), NaiveTime::from_hms_opt(7, 5, 0));
        assert_eq!(parse_clock("17:15:42"), NaiveTime::from_hms_opt(17, 15, 0));
        assert_eq!(parse_clock("5pm"), None);
        assert_eq!(parse_clock("25:00"), None);
    }

    #[test]
    fn test_format_clock() {
        let t = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_clock(t), "09:05");
        assert_eq!(minute_of_day(t), 545);
    }
}
