//! Timestamp encodings.
//!
//! Timestamps encode as RFC 3339 strings by default. The `unixtime` field
//! flag and the [`UnixTime`] newtype switch to epoch seconds in an `N`.

use chrono::{DateTime, Utc};

use crate::attribute_value::AttributeValue;
use crate::decode::Unmarshaler;
use crate::encode::Marshaler;
use crate::error::{BoxError, MarshalError, UnmarshalError};

/// Formats a timestamp as RFC 3339 in UTC with nanosecond precision and
/// trailing fractional zeros trimmed, e.g. `1970-01-01T00:02:03.01Z`.
#[must_use]
pub fn format_rfc3339_nano(t: &DateTime<Utc>) -> String {
    let mut out = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = t.timestamp_subsec_nanos();
    if nanos > 0 {
        let fraction = format!("{nanos:09}");
        out.push('.');
        out.push_str(fraction.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

/// Default timestamp encoder: an `S` holding [`format_rfc3339_nano`].
pub fn encode_rfc3339(t: &DateTime<Utc>) -> Result<AttributeValue, MarshalError> {
    Ok(AttributeValue::S(format_rfc3339_nano(t)))
}

/// Default decoder for timestamps stored in an `S`.
pub fn decode_rfc3339(raw: &str) -> Result<DateTime<Utc>, BoxError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Default decoder for timestamps stored in an `N`: integer epoch seconds.
pub fn decode_unix_seconds(raw: &str) -> Result<DateTime<Utc>, BoxError> {
    let secs: i64 = raw.parse()?;
    DateTime::from_timestamp(secs, 0).ok_or_else(|| format!("timestamp {secs} out of range").into())
}

/// Renders a timestamp as epoch seconds.
#[must_use]
pub fn encode_unix_seconds(t: &DateTime<Utc>) -> AttributeValue {
    AttributeValue::N(t.timestamp().to_string())
}

/// A timestamp that encodes as epoch seconds in an `N`, independent of field
/// flags and encoder options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnixTime(pub DateTime<Utc>);

impl UnixTime {
    /// Wraps a timestamp.
    #[must_use]
    pub fn new(t: DateTime<Utc>) -> Self {
        Self(t)
    }

    /// The wrapped timestamp.
    #[must_use]
    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for UnixTime {
    fn from(t: DateTime<Utc>) -> Self {
        Self(t)
    }
}

impl Marshaler for UnixTime {
    fn marshal_attribute_value(&self) -> Result<AttributeValue, MarshalError> {
        Ok(encode_unix_seconds(&self.0))
    }
}

impl Unmarshaler for UnixTime {
    fn unmarshal_attribute_value(&mut self, av: &AttributeValue) -> Result<(), UnmarshalError> {
        match av {
            AttributeValue::N(raw) => {
                self.0 = decode_unix_seconds(raw)
                    .map_err(|e| UnmarshalError::conversion(raw, "UnixTime", e))?;
                Ok(())
            }
            AttributeValue::Null(_) => Ok(()),
            other => Err(UnmarshalError::type_mismatch(other.kind_name(), "UnixTime")),
        }
    }
}

crate::impl_reflect_custom!(UnixTime);

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64, nanos: u32) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, nanos).unwrap()
    }

    #[test]
    fn test_should_trim_trailing_fraction_zeros() {
        assert_eq!(format_rfc3339_nano(&at(123, 10_000_000)), "1970-01-01T00:02:03.01Z");
        assert_eq!(format_rfc3339_nano(&at(123, 0)), "1970-01-01T00:02:03Z");
        assert_eq!(format_rfc3339_nano(&at(0, 1)), "1970-01-01T00:00:00.000000001Z");
    }

    #[test]
    fn test_should_parse_rfc3339_with_offset() {
        let t = decode_rfc3339("1970-01-01T01:02:03+01:00").unwrap();
        assert_eq!(t, at(123, 0));
        assert!(decode_rfc3339("yesterday").is_err());
    }

    #[test]
    fn test_should_code_unix_seconds() {
        assert_eq!(encode_unix_seconds(&at(123, 500)), AttributeValue::N("123".into()));
        assert_eq!(decode_unix_seconds("123").unwrap(), at(123, 0));
        assert!(decode_unix_seconds("1.5").is_err());
    }

    #[test]
    fn test_should_round_trip_unix_time_newtype() {
        let value = UnixTime(at(1_700_000_000, 0));
        let av = value.marshal_attribute_value().unwrap();
        assert_eq!(av, AttributeValue::N("1700000000".into()));

        let mut decoded = UnixTime::default();
        decoded.unmarshal_attribute_value(&av).unwrap();
        assert_eq!(decoded, value);

        let err = decoded
            .unmarshal_attribute_value(&AttributeValue::S("x".into()))
            .unwrap_err();
        assert!(matches!(err, UnmarshalError::TypeMismatch { .. }));
    }
}
