//! Timestamp normalization for API payloads.
//!
//! The marketplace emits ISO-8601 strings in several shapes: with a
//! numeric offset, with a literal `Z`, and (for naive server-side
//! datetimes) with no zone at all. All of them decode to a
//! [`jiff::Timestamp`].

use std::borrow::Cow;

use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use jiff::Timestamp;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::DecodeError;

/// Parses an ISO-8601 timestamp as sent by the API.
///
/// A trailing `Z` is rewritten to `+00:00` before parsing, and a string
/// without any offset is read as UTC.
///
/// ```
/// let zulu = davy_core::timestamp::parse("2025-01-22T10:00:00Z").unwrap();
/// let offset = davy_core::timestamp::parse("2025-01-22T10:00:00+00:00").unwrap();
/// assert_eq!(zulu, offset);
/// ```
pub fn parse(value: &str) -> Result<Timestamp, jiff::Error> {
    let normalized = match value.strip_suffix('Z') {
        Some(rest) => Cow::Owned(format!("{rest}+00:00")),
        None => Cow::Borrowed(value),
    };

    normalized.parse::<Timestamp>().or_else(|err| {
        normalized
            .parse::<DateTime>()
            .and_then(|civil| civil.to_zoned(TimeZone::UTC))
            .map(|zoned| zoned.timestamp())
            .map_err(|_| err)
    })
}

/// Decodes an optional timestamp field taken out of a JSON object.
///
/// Absent, `null` and empty values are unset; anything else must parse.
pub(crate) fn from_field(
    field: &'static str,
    value: Option<Value>,
) -> Result<Option<Timestamp>, DecodeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => match parse(&s) {
            Ok(ts) => Ok(Some(ts)),
            Err(_) => Err(DecodeError::InvalidTimestamp { field, value: s }),
        },
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "an ISO-8601 string",
        }),
    }
}

/// Serde adapter for `Option<Timestamp>` fields using [`parse`].
pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => parse(s)
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("invalid timestamp {s:?}: {e}"))),
    }
}
