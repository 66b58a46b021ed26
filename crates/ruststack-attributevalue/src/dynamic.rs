//! Open-type slot whose concrete shape is decided at decode time.

use std::collections::HashMap;
use std::fmt;

use crate::number::Number;
use crate::reflect::Reflect;

/// A dynamically typed value.
///
/// Decoding into a `Dynamic` materializes the natural native form of the
/// attribute value: numbers become [`Dynamic::Float`] or, when the decoder is
/// configured with `use_number`, [`Dynamic::Number`]. A `Dynamic::Value`
/// holds a concrete value boxed into an open slot; decoding a non-null
/// attribute value into it decodes into the boxed value in place.
#[derive(Default)]
pub enum Dynamic {
    /// The absence sentinel.
    #[default]
    Nil,
    /// Boolean.
    Bool(bool),
    /// Number decoded as a float.
    Float(f64),
    /// Number kept as decimal text.
    Number(Number),
    /// String.
    String(String),
    /// Binary.
    Bytes(Vec<u8>),
    /// Heterogeneous list.
    List(Vec<Dynamic>),
    /// String keyed map.
    Map(HashMap<String, Dynamic>),
    /// String set.
    StringSet(Vec<String>),
    /// Number set decoded as floats.
    FloatSet(Vec<f64>),
    /// Number set kept as decimal text.
    NumberSet(Vec<Number>),
    /// Binary set.
    BinarySet(Vec<Vec<u8>>),
    /// A concrete value stored in the open slot.
    Value(Box<dyn Reflect>),
}

impl Dynamic {
    /// Boxes a concrete value into an open slot.
    #[must_use]
    pub fn value<T: Reflect>(value: T) -> Self {
        Self::Value(Box::new(value))
    }

    /// Returns `true` for the absence sentinel.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns the string payload.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the float payload.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the map payload.
    #[must_use]
    pub fn as_map(&self) -> Option<&HashMap<String, Dynamic>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the list payload.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Dynamic]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }
}

impl fmt::Debug for Dynamic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.write_str("Nil"),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Number(v) => f.debug_tuple("Number").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Map(v) => f.debug_tuple("Map").field(v).finish(),
            Self::StringSet(v) => f.debug_tuple("StringSet").field(v).finish(),
            Self::FloatSet(v) => f.debug_tuple("FloatSet").field(v).finish(),
            Self::NumberSet(v) => f.debug_tuple("NumberSet").field(v).finish(),
            Self::BinarySet(v) => f.debug_tuple("BinarySet").field(v).finish(),
            Self::Value(v) => f.debug_tuple("Value").field(&v.reflect_type_name()).finish(),
        }
    }
}

// Boxed values have no structural equality, so `Value` never compares equal.
impl PartialEq for Dynamic {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::StringSet(a), Self::StringSet(b)) => a == b,
            (Self::FloatSet(a), Self::FloatSet(b)) => a == b,
            (Self::NumberSet(a), Self::NumberSet(b)) => a == b,
            (Self::BinarySet(a), Self::BinarySet(b)) => a == b,
            _ => false,
        }
    }
}

impl From<&str> for Dynamic {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Dynamic {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for Dynamic {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Dynamic {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<Dynamic>> From<Option<T>> for Dynamic {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_default_to_nil() {
        assert!(Dynamic::default().is_nil());
        assert_eq!(Dynamic::from(None::<&str>), Dynamic::Nil);
    }

    #[test]
    fn test_should_never_equate_boxed_values() {
        assert_ne!(Dynamic::value(1i32), Dynamic::value(1i32));
        assert_eq!(Dynamic::from("a"), Dynamic::String("a".to_owned()));
    }
}
