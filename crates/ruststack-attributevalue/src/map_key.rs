//! Map key coding.
//!
//! Wire maps are always keyed by strings. [`MapKey`] converts native map keys
//! to and from that string form. Implementations exist for strings, numbers,
//! integers and booleans; [`impl_map_key!`](crate::impl_map_key) covers
//! string-like newtypes, types with a text form and types that carry their
//! own [`Marshaler`](crate::Marshaler) and [`Unmarshaler`](crate::Unmarshaler).

use std::collections::HashMap;

use crate::attribute_value::AttributeValue;
use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::error::{MarshalError, UnmarshalError};
use crate::number::Number;
use crate::reflect::{Reflect, ReflectMut, ReflectRef};
use crate::tag::Tag;

/// Field name of the single-member map a custom key is decoded from.
pub const SYNTHETIC_KEY_FIELD: &str = "key";

/// A native type usable as a map key.
pub trait MapKey: Sized {
    /// Renders the key as a wire map key.
    fn encode_key(&self, encoder: &Encoder) -> Result<String, MarshalError>;

    /// Parses a wire map key.
    fn decode_key(raw: &str, decoder: &Decoder) -> Result<Self, UnmarshalError>;
}

impl MapKey for String {
    fn encode_key(&self, _encoder: &Encoder) -> Result<String, MarshalError> {
        Ok(self.clone())
    }

    fn decode_key(raw: &str, _decoder: &Decoder) -> Result<Self, UnmarshalError> {
        Ok(raw.to_owned())
    }
}

impl MapKey for Number {
    fn encode_key(&self, _encoder: &Encoder) -> Result<String, MarshalError> {
        Ok(self.as_str().to_owned())
    }

    fn decode_key(raw: &str, _decoder: &Decoder) -> Result<Self, UnmarshalError> {
        Ok(Number::new(raw))
    }
}

impl MapKey for bool {
    fn encode_key(&self, _encoder: &Encoder) -> Result<String, MarshalError> {
        Ok(self.to_string())
    }

    fn decode_key(raw: &str, _decoder: &Decoder) -> Result<Self, UnmarshalError> {
        parse_bool(raw)
    }
}

macro_rules! impl_map_key_integer {
    ($($ty:ty),*) => {$(
        impl MapKey for $ty {
            fn encode_key(&self, _encoder: &Encoder) -> Result<String, MarshalError> {
                Ok(self.to_string())
            }

            fn decode_key(raw: &str, decoder: &Decoder) -> Result<Self, UnmarshalError> {
                let mut key = <$ty>::default();
                decoder.decode_value(
                    &AttributeValue::N(raw.to_owned()),
                    &mut key,
                    &Tag::default(),
                )?;
                Ok(key)
            }
        }
    )*};
}

impl_map_key_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Parses the boolean spellings accepted in map keys.
pub fn parse_bool(raw: &str) -> Result<bool, UnmarshalError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(UnmarshalError::conversion(
            raw,
            "bool",
            format!("invalid boolean {raw:?}"),
        )),
    }
}

/// Renders any reflected value as a map key.
///
/// String, number and boolean views are rendered directly. A value that only
/// has a custom marshaler must encode to an `S` or `N`.
pub fn encode_reflected_key(
    key: &dyn Reflect,
    _encoder: &Encoder,
) -> Result<String, MarshalError> {
    match key.reflect_ref() {
        ReflectRef::String(s) => return Ok(s.to_owned()),
        ReflectRef::Number(n) => return Ok(n.as_str().to_owned()),
        ReflectRef::Int(i) => return Ok(i.to_string()),
        ReflectRef::Uint(u) => return Ok(u.to_string()),
        ReflectRef::Bool(b) => return Ok(b.to_string()),
        _ => {}
    }

    let type_name = key.reflect_type_name();
    let Some(marshaler) = key.as_marshaler() else {
        return Err(MarshalError::InvalidMapKey {
            type_name: type_name.to_owned(),
            found: "unsupported key type",
        });
    };
    match marshaler.marshal_attribute_value()? {
        AttributeValue::S(s) | AttributeValue::N(s) => Ok(s),
        AttributeValue::M(mut m) if m.len() == 1 => match m.remove(SYNTHETIC_KEY_FIELD) {
            Some(AttributeValue::S(s) | AttributeValue::N(s)) => Ok(s),
            _ => Err(MarshalError::InvalidMapKey {
                type_name: type_name.to_owned(),
                found: "M",
            }),
        },
        other => Err(MarshalError::InvalidMapKey {
            type_name: type_name.to_owned(),
            found: other.type_descriptor(),
        }),
    }
}

/// Parses a map key into any reflected value.
///
/// String, number and boolean views are written directly; numeric views go
/// through regular number decoding so overflow is reported. A value that only
/// has a custom unmarshaler receives the key wrapped in a single-member map
/// under [`SYNTHETIC_KEY_FIELD`].
pub fn decode_reflected_key(
    raw: &str,
    key: &mut dyn Reflect,
    decoder: &Decoder,
) -> Result<(), UnmarshalError> {
    let type_name = key.reflect_type_name();
    let numeric = matches!(
        key.reflect_mut(),
        ReflectMut::Int(_) | ReflectMut::Uint(_) | ReflectMut::Float(_)
    );
    if numeric {
        return decoder.decode_value(&AttributeValue::N(raw.to_owned()), key, &Tag::default());
    }

    match key.reflect_mut() {
        ReflectMut::String(s) => {
            raw.clone_into(s);
            return Ok(());
        }
        ReflectMut::Number(n) => {
            *n = Number::new(raw);
            return Ok(());
        }
        ReflectMut::Bool(b) => {
            *b = parse_bool(raw)?;
            return Ok(());
        }
        _ => {}
    }

    if key.as_unmarshaler().is_some() {
        let wrapper = AttributeValue::M(HashMap::from([(
            SYNTHETIC_KEY_FIELD.to_owned(),
            AttributeValue::S(raw.to_owned()),
        )]));
        return decoder.decode_value(&wrapper, key, &Tag::default());
    }
    Err(UnmarshalError::type_mismatch("map key", type_name))
}

/// Implements [`MapKey`] for user types.
///
/// * `impl_map_key!(T, U)` goes through the reflected view of each type, so it
///   suits string newtypes deriving `Reflect` and types registered with
///   [`impl_reflect_custom!`](crate::impl_reflect_custom). The types must
///   implement `Default`.
/// * `impl_map_key!(text: T, U)` uses `Display` and `FromStr`.
#[macro_export]
macro_rules! impl_map_key {
    (text: $($ty:ty),+ $(,)?) => {$(
        impl $crate::MapKey for $ty {
            fn encode_key(
                &self,
                _encoder: &$crate::Encoder,
            ) -> ::core::result::Result<::std::string::String, $crate::MarshalError> {
                ::core::result::Result::Ok(::std::string::ToString::to_string(self))
            }

            fn decode_key(
                raw: &str,
                _decoder: &$crate::Decoder,
            ) -> ::core::result::Result<Self, $crate::UnmarshalError> {
                <$ty as ::core::str::FromStr>::from_str(raw).map_err(|e| {
                    $crate::UnmarshalError::conversion(
                        raw,
                        ::core::any::type_name::<$ty>(),
                        ::std::string::ToString::to_string(&e),
                    )
                })
            }
        }
    )+};
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::MapKey for $ty {
            fn encode_key(
                &self,
                encoder: &$crate::Encoder,
            ) -> ::core::result::Result<::std::string::String, $crate::MarshalError> {
                $crate::map_key::encode_reflected_key(self, encoder)
            }

            fn decode_key(
                raw: &str,
                decoder: &$crate::Decoder,
            ) -> ::core::result::Result<Self, $crate::UnmarshalError> {
                let mut key = <$ty as ::core::default::Default>::default();
                $crate::map_key::decode_reflected_key(raw, &mut key, decoder)?;
                ::core::result::Result::Ok(key)
            }
        }
    )+};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Marshaler, Unmarshaler};

    #[derive(Debug, Default, PartialEq, Eq, Hash)]
    struct Region(String);

    impl Marshaler for Region {
        fn marshal_attribute_value(&self) -> Result<AttributeValue, MarshalError> {
            Ok(AttributeValue::S(format!("region-{}", self.0)))
        }
    }

    impl Unmarshaler for Region {
        fn unmarshal_attribute_value(&mut self, av: &AttributeValue) -> Result<(), UnmarshalError> {
            let Some(AttributeValue::S(raw)) = av.as_m().and_then(|m| m.get(SYNTHETIC_KEY_FIELD))
            else {
                return Err(UnmarshalError::custom("expected wrapped key"));
            };
            self.0 = raw.trim_start_matches("region-").to_owned();
            Ok(())
        }
    }

    crate::impl_reflect_custom!(Region);
    crate::impl_map_key!(Region);

    #[derive(Debug, PartialEq, Eq, Hash)]
    struct Code(u16);

    impl std::fmt::Display for Code {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "C{}", self.0)
        }
    }

    impl std::str::FromStr for Code {
        type Err = std::num::ParseIntError;

        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.trim_start_matches('C').parse().map(Code)
        }
    }

    crate::impl_map_key!(text: Code);

    #[test]
    fn test_should_parse_boolean_spellings() {
        for raw in ["1", "t", "T", "TRUE", "true", "True"] {
            assert!(parse_bool(raw).unwrap());
        }
        for raw in ["0", "f", "F", "FALSE", "false", "False"] {
            assert!(!parse_bool(raw).unwrap());
        }
        assert!(matches!(
            parse_bool("yes"),
            Err(UnmarshalError::Conversion { .. })
        ));
    }

    #[test]
    fn test_should_report_integer_key_overflow() {
        let decoder = Decoder::new();
        assert_eq!(u8::decode_key("200", &decoder).unwrap(), 200);
        assert!(matches!(
            u8::decode_key("512", &decoder),
            Err(UnmarshalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            i32::decode_key("abc", &decoder),
            Err(UnmarshalError::Conversion { .. })
        ));
    }

    #[test]
    fn test_should_code_custom_keys_through_marshalers() {
        let encoder = Encoder::new();
        let decoder = Decoder::new();
        let key = Region("eu".to_owned());
        let raw = key.encode_key(&encoder).unwrap();
        assert_eq!(raw, "region-eu");
        assert_eq!(Region::decode_key(&raw, &decoder).unwrap(), key);
    }

    #[test]
    fn test_should_code_text_keys() {
        let encoder = Encoder::new();
        let decoder = Decoder::new();
        assert_eq!(Code(7).encode_key(&encoder).unwrap(), "C7");
        assert_eq!(Code::decode_key("C9", &decoder).unwrap(), Code(9));
        assert!(Code::decode_key("Cx", &decoder).is_err());
    }
}
