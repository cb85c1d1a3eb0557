//! Serde codec for the persisted `ts` field.
//!
//! New timestamps are written as RFC 3339 in UTC with a `Z` suffix. Older
//! ledgers stored naive ISO-8601 values with no offset (`2024-01-03T12:00:00.123456`);
//! those are read as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Accepted layout for offset-less timestamps.
const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Serialize a UTC instant as RFC 3339.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Deserialize an RFC 3339 or naive ISO-8601 timestamp.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw:?}")))
}

/// Parse either accepted timestamp layout.
pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
        return Some(with_offset.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    #[test]
    fn parses_legacy_naive_timestamps_as_utc() {
        let parsed = parse("2024-01-03T23:59:58.123456");
        assert!(parsed.is_some());
        let parsed = parsed.unwrap_or_default();
        assert_eq!(parsed.day(), 3);
        assert_eq!(parsed.hour(), 23);
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn parses_offsets_into_utc() {
        let parsed = parse("2024-01-04T01:00:00+02:00").unwrap_or_default();
        assert_eq!(parsed.day(), 3);
        assert_eq!(parsed.hour(), 23);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_none());
        assert!(parse("2024-01-03").is_none());
    }
}
