//! Lenient ISO-8601 parsing, normalized to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339, the space-separated form with an offset, naive
/// date-times (read as UTC) and bare dates (midnight UTC). Returns `None`
/// for anything else.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter writing RFC 3339 and reading anything `parse_utc` accepts.
///
/// `null` reads as the current time, matching a job persisted without a
/// timestamp.
pub mod serde_utc {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(Utc::now()),
            Some(text) => super::parse_utc(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid ISO-8601 timestamp: {text:?}"))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rfc3339_with_offset_is_shifted_to_utc() {
        let parsed = parse_utc("2024-03-01T12:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn naive_timestamp_is_read_as_utc() {
        let parsed = parse_utc("2024-03-01T12:00:00.250").unwrap();
        assert_eq!(parsed.timestamp(), Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap().timestamp());
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let parsed = parse_utc("2024-03-01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn space_separated_with_offset() {
        let parsed = parse_utc("2024-03-01 12:00:00+00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_utc("").is_none());
        assert!(parse_utc("yesterday").is_none());
        assert!(parse_utc("2024-13-45").is_none());
    }
}
