//! Marshal and unmarshal error types.
//!
//! Traversal fails fast: the first error raised anywhere in the value tree
//! aborts the whole operation and is returned unchanged to the caller.

use thiserror::Error;

/// Boxed error used to carry underlying parse failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while converting an [`AttributeValue`](crate::AttributeValue)
/// into a native value.
#[derive(Debug, Error)]
pub enum UnmarshalError {
    /// The destination cannot be written through the codec.
    #[error("unmarshal failed, cannot unmarshal to {type_name}, destination is not writable")]
    InvalidDestination {
        /// Name of the rejected destination type.
        type_name: String,
    },
    /// The source variant is incompatible with the destination type.
    #[error("unmarshal failed, cannot unmarshal {value} into value type {type_name}")]
    TypeMismatch {
        /// Description of the offending source value.
        value: String,
        /// Name of the destination type.
        type_name: String,
    },
    /// Parsing the source payload into the destination type failed.
    #[error("unmarshal failed, cannot unmarshal {value:?} into {type_name}, {source}")]
    Conversion {
        /// The raw source text that failed to parse.
        value: String,
        /// Name of the destination type.
        type_name: String,
        /// The underlying parse failure.
        source: BoxError,
    },
    /// Error reported by a custom unmarshaler.
    #[error("{0}")]
    Custom(String),
}

impl UnmarshalError {
    /// Create a type mismatch error.
    #[must_use]
    pub fn type_mismatch(value: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            value: value.into(),
            type_name: type_name.into(),
        }
    }

    /// Create a numeric overflow error for the given decimal text.
    #[must_use]
    pub fn overflow(text: &str, type_name: impl Into<String>) -> Self {
        Self::type_mismatch(format!("number overflow, {text}"), type_name)
    }

    /// Create a conversion error wrapping an underlying failure.
    #[must_use]
    pub fn conversion(
        value: impl Into<String>,
        type_name: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Conversion {
            value: value.into(),
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// Create a custom error.
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

/// Errors raised while converting a native value into an
/// [`AttributeValue`](crate::AttributeValue).
#[derive(Debug, Error)]
pub enum MarshalError {
    /// The value exposes no structure the encoder understands.
    #[error("marshal failed, unsupported type {type_name}")]
    UnsupportedType {
        /// Name of the rejected type.
        type_name: String,
    },
    /// Floats that are NaN or infinite have no decimal representation.
    #[error("marshal failed, invalid number {value}")]
    InvalidNumber {
        /// Rendering of the rejected value.
        value: String,
    },
    /// A set member encoded to the wrong attribute value variant.
    #[error("marshal failed, {set} member of {type_name} encoded as {found}")]
    InvalidSetMember {
        /// The set being built (`SS`, `NS` or `BS`).
        set: &'static str,
        /// Name of the sequence type.
        type_name: String,
        /// Type descriptor the member actually produced.
        found: &'static str,
    },
    /// A map key rendered to the empty string.
    #[error("marshal failed, map key of {type_name} cannot be empty")]
    EmptyMapKey {
        /// Name of the key type.
        type_name: String,
    },
    /// A custom marshaler produced a map key that is not a string or number.
    #[error("marshal failed, map key of {type_name} encoded as {found}, expected S or N")]
    InvalidMapKey {
        /// Name of the key type.
        type_name: String,
        /// Type descriptor the key actually produced.
        found: &'static str,
    },
    /// Error reported by a custom marshaler.
    #[error("{0}")]
    Custom(String),
}

impl MarshalError {
    /// Create an unsupported type error.
    #[must_use]
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Create a custom error.
    #[must_use]
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_format_overflow_as_type_mismatch() {
        let err = UnmarshalError::overflow("512", "u8");
        assert!(matches!(err, UnmarshalError::TypeMismatch { .. }));
        assert_eq!(
            err.to_string(),
            "unmarshal failed, cannot unmarshal number overflow, 512 into value type u8"
        );
    }

    #[test]
    fn test_should_expose_conversion_source() {
        let parse = "abc".parse::<i64>().unwrap_err();
        let err = UnmarshalError::conversion("abc", "i64", parse);
        assert_eq!(
            err.to_string(),
            "unmarshal failed, cannot unmarshal \"abc\" into i64, invalid digit found in string"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
