//! String-backed decimal number literal.

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::FromStr;

/// A number literal as carried by an `N` attribute value.
///
/// The text is stored exactly as received; conversions to native numeric
/// types happen on demand and may lose precision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Number(String);

impl Number {
    /// Wraps decimal text without validating or normalizing it.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the raw decimal text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the number, returning the raw decimal text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns `true` if the number carries no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parses the number as a 64-bit float.
    pub fn to_f64(&self) -> Result<f64, ParseFloatError> {
        self.0.parse()
    }

    /// Parses the number as a signed 64-bit integer.
    pub fn to_i64(&self) -> Result<i64, ParseIntError> {
        self.0.parse()
    }

    /// Parses the number as an unsigned 64-bit integer.
    pub fn to_u64(&self) -> Result<u64, ParseIntError> {
        self.0.parse()
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Number {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Number {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<Number> for String {
    fn from(value: Number) -> Self {
        value.0
    }
}

impl FromStr for Number {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl AsRef<str> for Number {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_keep_original_text() {
        let n = Number::new("12345678901234567890.000000001");
        assert_eq!(n.as_str(), "12345678901234567890.000000001");
        assert_eq!(n.to_string(), "12345678901234567890.000000001");
    }

    #[test]
    fn test_should_convert_to_native_numbers() {
        assert_eq!(Number::from("-12").to_i64().unwrap(), -12);
        assert_eq!(Number::from("12").to_u64().unwrap(), 12);
        assert!((Number::from("1.5").to_f64().unwrap() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_should_fail_integer_conversion_of_fraction() {
        assert!(Number::from("1.5").to_i64().is_err());
        assert!(Number::from("-1").to_u64().is_err());
    }
}
