//! Wire timestamp format.
//!
//! The whole sync surface exchanges timestamps as `"YYYY-MM-DD HH:MM:SS"`
//! (the back office stores them that way). Clients produced by different
//! toolchains also send ISO-8601 `T` separators and fractional seconds, so
//! parsing accepts those forms; formatting always emits the canonical one.

use crate::error::{CoreError, CoreResult};
use chrono::NaiveDateTime;

/// Canonical wire format for timestamps.
pub const WIRE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const ACCEPTED_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Parses a wire timestamp.
pub fn parse(value: &str) -> CoreResult<NaiveDateTime> {
    for format in ACCEPTED_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(ts);
        }
    }
    Err(CoreError::InvalidTimestamp(value.to_string()))
}

/// Parses an optional cursor value; `None` or empty string means "no cursor".
pub fn parse_cursor(value: Option<&str>) -> CoreResult<Option<NaiveDateTime>> {
    match value {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse(s).map(Some),
    }
}

/// Formats a timestamp in the canonical wire format.
pub fn format(ts: NaiveDateTime) -> String {
    ts.format(WIRE_FORMAT).to_string()
}

/// Serde adapter for required `NaiveDateTime` fields in the wire format.
pub mod wire {
    use super::{parse, WIRE_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serializes in the canonical wire format.
    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.format(WIRE_FORMAT).to_string())
    }

    /// Deserializes from any accepted wire form.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional `NaiveDateTime` fields in the wire format.
pub mod wire_opt {
    use super::{parse, WIRE_FORMAT};
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    /// Serializes as a wire-format string or `null`.
    pub fn serialize<S: Serializer>(
        ts: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&ts.format(WIRE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    /// Deserializes from a wire-format string, `null`, or an absent field.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        match value {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => parse(&s).map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// Serde adapter for date-only fields (`YYYY-MM-DD`).
///
/// Business dates like a cash-closure day carry no time component; clients
/// sometimes send a full timestamp, so the date part is taken from either.
pub mod wire_date {
    use chrono::NaiveDate;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Serializes as `YYYY-MM-DD`.
    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
    }

    /// Deserializes from `YYYY-MM-DD`, or the date part of a timestamp.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        if let Ok(date) = NaiveDate::parse_from_str(&s, DATE_FORMAT) {
            return Ok(date);
        }
        super::parse(&s)
            .map(|ts| ts.date())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_canonical() {
        let ts = parse("2024-01-01 10:00:00").unwrap();
        assert_eq!(format(ts), "2024-01-01 10:00:00");
    }

    #[test]
    fn parse_iso_separator() {
        let ts = parse("2024-01-01T10:00:00").unwrap();
        assert_eq!(format(ts), "2024-01-01 10:00:00");
    }

    #[test]
    fn parse_fractional_seconds() {
        let ts = parse("2024-01-01T10:00:00.123").unwrap();
        assert_eq!(format(ts), "2024-01-01 10:00:00");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse("not-a-date").is_err());
        assert!(parse("2024-13-99 10:00:00").is_err());
    }

    #[test]
    fn empty_cursor_is_full_snapshot() {
        assert_eq!(parse_cursor(None).unwrap(), None);
        assert_eq!(parse_cursor(Some("")).unwrap(), None);
        assert_eq!(parse_cursor(Some("  ")).unwrap(), None);
        assert!(parse_cursor(Some("2024-01-01 10:00:00")).unwrap().is_some());
    }
}
