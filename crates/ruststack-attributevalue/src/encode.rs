//! Native value to [`AttributeValue`] encoding.
//!
//! The [`Encoder`] walks a [`Reflect`] value depth first and builds the wire
//! value bottom up. Custom [`Marshaler`] implementations are consulted before
//! any structural handling, at every level of the tree.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::trace;
use typed_builder::TypedBuilder;

use crate::attribute_value::AttributeValue;
use crate::dynamic::Dynamic;
use crate::error::MarshalError;
use crate::field::cached_fields;
use crate::reflect::{Mapping, Record, Reflect, ReflectRef, Sequence};
use crate::tag::{DEFAULT_TAG_KEY, Tag};
use crate::time::encode_rfc3339;

/// A type that encodes itself into an [`AttributeValue`].
pub trait Marshaler {
    /// Produces the wire value for `self`.
    fn marshal_attribute_value(&self) -> Result<AttributeValue, MarshalError>;
}

/// A type with a canonical text form.
///
/// Consulted only when [`EncoderOptions::use_encoding_marshalers`] is set, in
/// which case the text is written as an `S`. A [`Marshaler`] on the same type
/// still takes precedence.
pub trait TextMarshaler {
    /// Renders `self` as text.
    fn marshal_text(&self) -> Result<String, MarshalError>;
}

/// A type with a canonical binary form, written as a `B` when
/// [`EncoderOptions::use_encoding_marshalers`] is set.
pub trait BinaryMarshaler {
    /// Renders `self` as bytes.
    fn marshal_binary(&self) -> Result<Vec<u8>, MarshalError>;
}

/// Timestamp encoder hook.
pub type EncodeTimeFn =
    Arc<dyn Fn(&DateTime<Utc>) -> Result<AttributeValue, MarshalError> + Send + Sync>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Encoder configuration.
///
/// # Examples
///
/// ```
/// use ruststack_attributevalue::EncoderOptions;
///
/// let options = EncoderOptions::builder()
///     .tag_key("json")
///     .null_empty_sets(false)
///     .build();
/// assert_eq!(options.tag_key, "json");
/// assert!(!options.omit_empty_time);
/// ```
#[derive(Clone, TypedBuilder)]
pub struct EncoderOptions {
    /// Annotation key consulted in addition to `dynamodbav`.
    #[builder(default = DEFAULT_TAG_KEY.to_owned(), setter(into))]
    pub tag_key: String,

    /// Encode empty sets as `NULL` instead of an empty set.
    #[builder(default = true)]
    pub null_empty_sets: bool,

    /// Drop `omitempty` fields whose value encodes to `NULL`.
    #[builder(default = false)]
    pub omit_null_attribute_values: bool,

    /// Let `omitempty` drop timestamps equal to the zero time.
    #[builder(default = false)]
    pub omit_empty_time: bool,

    /// Encoder for timestamp values without the `unixtime` flag.
    #[builder(default = Arc::new(encode_rfc3339))]
    pub encode_time: EncodeTimeFn,

    /// Encode binary values as base64 text in an `S`.
    #[builder(default = false)]
    pub base64_blob_values: bool,

    /// Encode values with a [`TextMarshaler`] as `S` and values with a
    /// [`BinaryMarshaler`] as `B`.
    #[builder(default = false)]
    pub use_encoding_marshalers: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_owned(),
            null_empty_sets: true,
            omit_null_attribute_values: false,
            omit_empty_time: false,
            encode_time: Arc::new(encode_rfc3339),
            base64_blob_values: false,
            use_encoding_marshalers: false,
        }
    }
}

impl fmt::Debug for EncoderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderOptions")
            .field("tag_key", &self.tag_key)
            .field("null_empty_sets", &self.null_empty_sets)
            .field("omit_null_attribute_values", &self.omit_null_attribute_values)
            .field("omit_empty_time", &self.omit_empty_time)
            .field("base64_blob_values", &self.base64_blob_values)
            .field("use_encoding_marshalers", &self.use_encoding_marshalers)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum SetKind {
    String,
    Number,
    Binary,
}

impl SetKind {
    fn descriptor(self) -> &'static str {
        match self {
            Self::String => "SS",
            Self::Number => "NS",
            Self::Binary => "BS",
        }
    }
}

/// Encodes native values into [`AttributeValue`]s.
///
/// Cyclic values (for example an `Rc` cycle exposed through a custom
/// `Reflect` implementation) are not detected and overflow the stack.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: EncoderOptions,
}

impl Encoder {
    /// Creates an encoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an encoder, letting `configure` adjust the default options.
    #[must_use]
    pub fn with_options(configure: impl FnOnce(&mut EncoderOptions)) -> Self {
        let mut options = EncoderOptions::default();
        configure(&mut options);
        Self { options }
    }

    /// Creates an encoder from prepared options.
    #[must_use]
    pub fn from_options(options: EncoderOptions) -> Self {
        Self { options }
    }

    /// The active options.
    #[must_use]
    pub fn options(&self) -> &EncoderOptions {
        &self.options
    }

    /// Encodes a value.
    pub fn encode<T: Reflect>(&self, value: &T) -> Result<AttributeValue, MarshalError> {
        self.encode_value(value, &Tag::default())
    }

    /// Encodes a value under the directives of the field holding it.
    pub fn encode_value(
        &self,
        value: &dyn Reflect,
        tag: &Tag,
    ) -> Result<AttributeValue, MarshalError> {
        if let Some(marshaler) = value.as_marshaler() {
            trace!(type_name = value.reflect_type_name(), "custom marshaler");
            return marshaler.marshal_attribute_value();
        }
        if self.options.use_encoding_marshalers {
            if let Some(marshaler) = value.as_text_marshaler() {
                trace!(type_name = value.reflect_type_name(), "text marshaler");
                return marshaler.marshal_text().map(AttributeValue::S);
            }
            if let Some(marshaler) = value.as_binary_marshaler() {
                trace!(type_name = value.reflect_type_name(), "binary marshaler");
                return marshaler
                    .marshal_binary()
                    .map(|b| AttributeValue::B(Bytes::from(b)));
            }
        }

        match value.reflect_ref() {
            ReflectRef::Bool(b) => Ok(if tag.as_string {
                AttributeValue::S(b.to_string())
            } else {
                AttributeValue::Bool(b)
            }),
            ReflectRef::Int(i) => Ok(number(i.to_string(), tag)),
            ReflectRef::Uint(u) => Ok(number(u.to_string(), tag)),
            ReflectRef::F32(f) => {
                if !f.is_finite() {
                    return Err(MarshalError::InvalidNumber {
                        value: f.to_string(),
                    });
                }
                Ok(number(f.to_string(), tag))
            }
            ReflectRef::F64(f) => Ok(number(format_f64(f)?, tag)),
            ReflectRef::String(s) => Ok(AttributeValue::S(s.to_owned())),
            ReflectRef::Number(n) => Ok(number(n.as_str().to_owned(), tag)),
            ReflectRef::Bytes(b) => Ok(self.encode_bytes(b)),
            ReflectRef::Time(t) => {
                if tag.as_unix_time {
                    return Ok(crate::time::encode_unix_seconds(t));
                }
                (self.options.encode_time)(t)
            }
            ReflectRef::Seq(seq) => self.encode_sequence(value.reflect_type_name(), seq, tag),
            ReflectRef::Map(map) => self.encode_mapping(value.reflect_type_name(), map, tag),
            ReflectRef::Record(record) => self.encode_record(record),
            ReflectRef::Optional(Some(inner)) => self.encode_value(inner, tag),
            ReflectRef::Optional(None) => Ok(AttributeValue::Null(true)),
            ReflectRef::Dynamic(d) => self.encode_dynamic(d, tag),
            ReflectRef::Opaque => Err(MarshalError::unsupported(value.reflect_type_name())),
        }
    }

    fn encode_bytes(&self, bytes: &[u8]) -> AttributeValue {
        if self.options.base64_blob_values {
            AttributeValue::S(BASE64.encode(bytes))
        } else {
            AttributeValue::B(Bytes::copy_from_slice(bytes))
        }
    }

    fn encode_sequence(
        &self,
        type_name: &str,
        seq: &dyn Sequence,
        tag: &Tag,
    ) -> Result<AttributeValue, MarshalError> {
        let kind = if tag.as_str_set {
            Some(SetKind::String)
        } else if tag.as_num_set {
            Some(SetKind::Number)
        } else if tag.as_bin_set || seq.holds_bytes() {
            Some(SetKind::Binary)
        } else {
            None
        };
        match kind {
            Some(kind) => self.encode_set(type_name, seq, kind),
            None => self.encode_list(seq, tag),
        }
    }

    fn encode_set(
        &self,
        type_name: &str,
        seq: &dyn Sequence,
        kind: SetKind,
    ) -> Result<AttributeValue, MarshalError> {
        if seq.is_empty() && self.options.null_empty_sets {
            return Ok(AttributeValue::Null(true));
        }

        let mut texts = Vec::new();
        let mut blobs = Vec::new();
        for elem in (0..seq.len()).filter_map(|i| seq.get(i)) {
            // Binary members stay raw even when blobs are configured as base64.
            if let (SetKind::Binary, ReflectRef::Bytes(b)) = (kind, elem.reflect_ref()) {
                blobs.push(Bytes::copy_from_slice(b));
                continue;
            }
            match (kind, self.encode_value(elem, &Tag::default())?) {
                (SetKind::String, AttributeValue::S(s)) | (SetKind::Number, AttributeValue::N(s)) => {
                    texts.push(s);
                }
                (SetKind::Binary, AttributeValue::B(b)) => blobs.push(b),
                (_, other) => {
                    return Err(MarshalError::InvalidSetMember {
                        set: kind.descriptor(),
                        type_name: type_name.to_owned(),
                        found: other.type_descriptor(),
                    });
                }
            }
        }

        Ok(match kind {
            SetKind::String => AttributeValue::Ss(texts),
            SetKind::Number => AttributeValue::Ns(texts),
            SetKind::Binary => AttributeValue::Bs(blobs),
        })
    }

    fn encode_list(&self, seq: &dyn Sequence, tag: &Tag) -> Result<AttributeValue, MarshalError> {
        let mut list = Vec::with_capacity(seq.len());
        for elem in (0..seq.len()).filter_map(|i| seq.get(i)) {
            if elem.is_zero() {
                if tag.omit_empty_elem {
                    continue;
                }
                if tag.null_empty_elem {
                    list.push(AttributeValue::Null(true));
                    continue;
                }
            }
            list.push(self.encode_value(elem, &Tag::default())?);
        }
        Ok(AttributeValue::L(list))
    }

    fn encode_mapping(
        &self,
        type_name: &str,
        map: &dyn Mapping,
        tag: &Tag,
    ) -> Result<AttributeValue, MarshalError> {
        let mut out = HashMap::with_capacity(map.len());
        for (key, elem) in map.entries(self)? {
            if key.is_empty() {
                return Err(MarshalError::EmptyMapKey {
                    type_name: type_name.to_owned(),
                });
            }
            if elem.is_absent() {
                if !tag.omit_empty_elem {
                    out.insert(key, AttributeValue::Null(true));
                }
                continue;
            }
            out.insert(key, self.encode_value(elem, &Tag::default())?);
        }
        Ok(AttributeValue::M(out))
    }

    fn encode_record(&self, record: &dyn Record) -> Result<AttributeValue, MarshalError> {
        let fields = cached_fields(record.record_info(), &self.options.tag_key, false);
        let mut out = HashMap::with_capacity(fields.fields().len());
        for field in fields.fields() {
            // An absent embedded record contributes nothing.
            let Some(value) = field_by_index(record, &field.index) else {
                continue;
            };
            if field.tag.omit_empty && self.is_omittable(value) {
                continue;
            }
            let av = self.encode_value(value, &field.tag)?;
            if field.tag.omit_empty && self.options.omit_null_attribute_values && av.is_null() {
                continue;
            }
            out.insert(field.name.clone(), av);
        }
        Ok(AttributeValue::M(out))
    }

    fn is_omittable(&self, value: &dyn Reflect) -> bool {
        if let ReflectRef::Time(_) = value.reflect_ref() {
            return self.options.omit_empty_time && value.is_zero();
        }
        value.is_zero()
    }

    fn encode_dynamic(&self, value: &Dynamic, tag: &Tag) -> Result<AttributeValue, MarshalError> {
        Ok(match value {
            Dynamic::Nil => AttributeValue::Null(true),
            Dynamic::Bool(b) => AttributeValue::Bool(*b),
            Dynamic::Float(f) => AttributeValue::N(format_f64(*f)?),
            Dynamic::Number(n) => AttributeValue::N(n.as_str().to_owned()),
            Dynamic::String(s) => AttributeValue::S(s.clone()),
            Dynamic::Bytes(b) => self.encode_bytes(b),
            Dynamic::List(items) => self.encode_list(items, tag)?,
            Dynamic::Map(entries) => self.encode_mapping("Dynamic", entries, tag)?,
            Dynamic::StringSet(items) => self.dynamic_set(items.is_empty(), || {
                Ok(AttributeValue::Ss(items.clone()))
            })?,
            Dynamic::FloatSet(items) => self.dynamic_set(items.is_empty(), || {
                let texts = items.iter().map(|f| format_f64(*f)).collect::<Result<_, _>>()?;
                Ok(AttributeValue::Ns(texts))
            })?,
            Dynamic::NumberSet(items) => self.dynamic_set(items.is_empty(), || {
                Ok(AttributeValue::Ns(
                    items.iter().map(|n| n.as_str().to_owned()).collect(),
                ))
            })?,
            Dynamic::BinarySet(items) => self.dynamic_set(items.is_empty(), || {
                Ok(AttributeValue::Bs(
                    items.iter().map(|b| Bytes::copy_from_slice(b)).collect(),
                ))
            })?,
            Dynamic::Value(inner) => self.encode_value(&**inner, tag)?,
        })
    }

    fn dynamic_set(
        &self,
        empty: bool,
        build: impl FnOnce() -> Result<AttributeValue, MarshalError>,
    ) -> Result<AttributeValue, MarshalError> {
        if empty && self.options.null_empty_sets {
            return Ok(AttributeValue::Null(true));
        }
        build()
    }
}

fn number(text: String, tag: &Tag) -> AttributeValue {
    if tag.as_string {
        AttributeValue::S(text)
    } else {
        AttributeValue::N(text)
    }
}

/// Renders a float as plain decimal text without an exponent.
fn format_f64(f: f64) -> Result<String, MarshalError> {
    if !f.is_finite() {
        return Err(MarshalError::InvalidNumber {
            value: f.to_string(),
        });
    }
    Ok(f.to_string())
}

/// Follows an index path through embedded records. `None` when an embedded
/// optional record on the path is absent.
fn field_by_index<'a>(record: &'a dyn Record, index: &[usize]) -> Option<&'a dyn Reflect> {
    let (first, rest) = index.split_first()?;
    let mut value = record.field(*first)?;
    for &i in rest {
        value = as_record(value)?.field(i)?;
    }
    Some(value)
}

fn as_record(value: &dyn Reflect) -> Option<&dyn Record> {
    match value.reflect_ref() {
        ReflectRef::Record(record) => Some(record),
        ReflectRef::Optional(Some(inner)) => as_record(inner),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Top-level API
// ---------------------------------------------------------------------------

/// Encodes a value with default options.
pub fn marshal<T: Reflect>(value: &T) -> Result<AttributeValue, MarshalError> {
    Encoder::new().encode(value)
}

/// Encodes a value, letting `configure` adjust the default options.
pub fn marshal_with_options<T: Reflect>(
    value: &T,
    configure: impl FnOnce(&mut EncoderOptions),
) -> Result<AttributeValue, MarshalError> {
    Encoder::with_options(configure).encode(value)
}

/// Encodes a value into the members of an `M`.
///
/// Values that do not encode to an `M` produce an empty map.
pub fn marshal_map<T: Reflect>(value: &T) -> Result<HashMap<String, AttributeValue>, MarshalError> {
    marshal_map_with_options(value, |_| {})
}

/// [`marshal_map`] with adjusted options.
pub fn marshal_map_with_options<T: Reflect>(
    value: &T,
    configure: impl FnOnce(&mut EncoderOptions),
) -> Result<HashMap<String, AttributeValue>, MarshalError> {
    match marshal_with_options(value, configure)? {
        AttributeValue::M(m) => Ok(m),
        _ => Ok(HashMap::new()),
    }
}

/// Encodes a value into the elements of an `L`.
///
/// Values that do not encode to an `L` produce an empty list.
pub fn marshal_list<T: Reflect>(value: &T) -> Result<Vec<AttributeValue>, MarshalError> {
    marshal_list_with_options(value, |_| {})
}

/// [`marshal_list`] with adjusted options.
pub fn marshal_list_with_options<T: Reflect>(
    value: &T,
    configure: impl FnOnce(&mut EncoderOptions),
) -> Result<Vec<AttributeValue>, MarshalError> {
    match marshal_with_options(value, configure)? {
        AttributeValue::L(l) => Ok(l),
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::number::Number;

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_owned())
    }

    fn n(v: &str) -> AttributeValue {
        AttributeValue::N(v.to_owned())
    }

    #[test]
    fn test_should_encode_scalars() {
        assert_eq!(marshal(&true).unwrap(), AttributeValue::Bool(true));
        assert_eq!(marshal(&-12i32).unwrap(), n("-12"));
        assert_eq!(marshal(&u64::MAX).unwrap(), n("18446744073709551615"));
        assert_eq!(marshal(&"abc".to_owned()).unwrap(), s("abc"));
        assert_eq!(marshal(&Number::new("1.50")).unwrap(), n("1.50"));
    }

    #[test]
    fn test_should_render_floats_without_exponent() {
        assert_eq!(marshal(&1e21f64).unwrap(), n("1000000000000000000000"));
        assert_eq!(marshal(&1e-7f64).unwrap(), n("0.0000001"));
        assert_eq!(marshal(&9.9f32).unwrap(), n("9.9"));
        assert_eq!(marshal(&123.45f64).unwrap(), n("123.45"));
    }

    #[test]
    fn test_should_reject_non_finite_floats() {
        assert!(matches!(
            marshal(&f64::NAN),
            Err(MarshalError::InvalidNumber { .. })
        ));
        assert!(matches!(
            marshal(&f32::INFINITY),
            Err(MarshalError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_should_encode_absent_values_as_null() {
        assert_eq!(marshal(&None::<String>).unwrap(), AttributeValue::Null(true));
        assert_eq!(marshal(&Dynamic::Nil).unwrap(), AttributeValue::Null(true));
        assert_eq!(marshal(&Some(5u8)).unwrap(), n("5"));
    }

    #[test]
    fn test_should_encode_bytes_and_binary_sets() {
        assert_eq!(
            marshal(&vec![1u8, 2]).unwrap(),
            AttributeValue::B(Bytes::from_static(&[1, 2]))
        );
        assert_eq!(
            marshal(&[7u8; 2]).unwrap(),
            AttributeValue::B(Bytes::from_static(&[7, 7]))
        );
        assert_eq!(
            marshal(&vec![vec![1u8], vec![2u8]]).unwrap(),
            AttributeValue::Bs(vec![Bytes::from_static(&[1]), Bytes::from_static(&[2])])
        );
    }

    #[test]
    fn test_should_encode_blobs_as_base64_when_configured() {
        let av = marshal_with_options(&vec![104u8, 105], |o| o.base64_blob_values = true).unwrap();
        assert_eq!(av, s("aGk="));
    }

    #[test]
    fn test_should_honor_null_empty_sets() {
        let empty: Vec<Vec<u8>> = Vec::new();
        assert_eq!(marshal(&empty).unwrap(), AttributeValue::Null(true));
        let av = marshal_with_options(&empty, |o| o.null_empty_sets = false).unwrap();
        assert_eq!(av, AttributeValue::Bs(Vec::new()));
    }

    #[test]
    fn test_should_force_sets_with_tags() {
        let encoder = Encoder::new();
        let strings = vec!["a".to_owned(), "b".to_owned()];
        let tag = Tag::parse(",stringset");
        assert_eq!(
            encoder.encode_value(&strings, &tag).unwrap(),
            AttributeValue::Ss(strings.clone())
        );

        let tag = Tag::parse(",numberset");
        assert_eq!(
            encoder.encode_value(&vec![1i32, 2], &tag).unwrap(),
            AttributeValue::Ns(vec!["1".into(), "2".into()])
        );
        assert!(matches!(
            encoder.encode_value(&strings, &tag),
            Err(MarshalError::InvalidSetMember { set: "NS", .. })
        ));
    }

    #[test]
    fn test_should_apply_list_element_policies() {
        let encoder = Encoder::new();
        let items = vec![String::new(), "x".to_owned()];
        assert_eq!(
            encoder.encode_value(&items, &Tag::default()).unwrap(),
            AttributeValue::L(vec![s(""), s("x")])
        );
        assert_eq!(
            encoder.encode_value(&items, &Tag::parse(",omitemptyelem")).unwrap(),
            AttributeValue::L(vec![s("x")])
        );
        assert_eq!(
            encoder.encode_value(&items, &Tag::parse(",nullemptyelem")).unwrap(),
            AttributeValue::L(vec![AttributeValue::Null(true), s("x")])
        );
    }

    #[test]
    fn test_should_apply_map_entry_policies() {
        let encoder = Encoder::new();
        let entries = HashMap::from([
            ("empty".to_owned(), Some(String::new())),
            ("absent".to_owned(), None),
        ]);
        let av = encoder.encode_value(&entries, &Tag::default()).unwrap();
        assert_eq!(
            av,
            AttributeValue::M(HashMap::from([
                ("empty".to_owned(), s("")),
                ("absent".to_owned(), AttributeValue::Null(true)),
            ]))
        );

        let av = encoder
            .encode_value(&entries, &Tag::parse(",omitemptyelem"))
            .unwrap();
        assert_eq!(
            av,
            AttributeValue::M(HashMap::from([("empty".to_owned(), s(""))]))
        );
    }

    #[test]
    fn test_should_reject_empty_map_key() {
        let entries = BTreeMap::from([(String::new(), 1i32)]);
        assert!(matches!(
            marshal(&entries),
            Err(MarshalError::EmptyMapKey { .. })
        ));
    }

    #[test]
    fn test_should_encode_dynamic_values() {
        let value = Dynamic::Map(HashMap::from([
            ("n".to_owned(), Dynamic::Float(1.5)),
            (
                "l".to_owned(),
                Dynamic::List(vec![Dynamic::Bool(true), Dynamic::Nil]),
            ),
            ("ss".to_owned(), Dynamic::StringSet(Vec::new())),
        ]));
        assert_eq!(
            marshal(&value).unwrap(),
            AttributeValue::M(HashMap::from([
                ("n".to_owned(), n("1.5")),
                (
                    "l".to_owned(),
                    AttributeValue::L(vec![AttributeValue::Bool(true), AttributeValue::Null(true)])
                ),
                ("ss".to_owned(), AttributeValue::Null(true)),
            ]))
        );
        assert_eq!(marshal(&Dynamic::value(3i64)).unwrap(), n("3"));
    }

    #[test]
    fn test_should_render_numbers_as_strings_with_string_flag() {
        let encoder = Encoder::new();
        let tag = Tag::parse(",string");
        assert_eq!(encoder.encode_value(&42u32, &tag).unwrap(), s("42"));
        assert_eq!(encoder.encode_value(&true, &tag).unwrap(), s("true"));
    }

    #[test]
    fn test_should_return_empty_collections_for_mismatched_shapes() {
        assert!(marshal_map(&5i32).unwrap().is_empty());
        assert!(marshal_list(&"x".to_owned()).unwrap().is_empty());
        assert_eq!(marshal_list(&vec![1u16]).unwrap(), vec![n("1")]);
    }
}
