//! [`AttributeValue`] to native value decoding.
//!
//! The [`Decoder`] writes into an existing destination through its
//! [`ReflectMut`] slot. Containers are filled in place: vectors are resized to
//! the source length, fixed arrays take as many elements as fit, maps keep
//! entries the source does not mention, and records ignore unknown members.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use tracing::trace;
use typed_builder::TypedBuilder;

use crate::attribute_value::AttributeValue;
use crate::dynamic::Dynamic;
use crate::error::{BoxError, UnmarshalError};
use crate::field::cached_fields;
use crate::map_key::parse_bool;
use crate::number::Number;
use crate::reflect::{ByteSlot, Record, Reflect, ReflectMut, SequenceMut};
use crate::tag::{DEFAULT_TAG_KEY, Tag};
use crate::time::{decode_rfc3339, decode_unix_seconds};

/// A type that decodes itself from an [`AttributeValue`].
pub trait Unmarshaler {
    /// Overwrites `self` with the contents of `av`.
    fn unmarshal_attribute_value(&mut self, av: &AttributeValue) -> Result<(), UnmarshalError>;
}

/// A type that parses itself from its canonical text form.
///
/// Consulted for `S` sources only when
/// [`DecoderOptions::use_encoding_unmarshalers`] is set. An [`Unmarshaler`] on
/// the same type still takes precedence.
pub trait TextUnmarshaler {
    /// Overwrites `self` with the value `text` describes.
    fn unmarshal_text(&mut self, text: &str) -> Result<(), UnmarshalError>;
}

/// A type that parses itself from its canonical binary form, for `B`
/// sources when [`DecoderOptions::use_encoding_unmarshalers`] is set.
pub trait BinaryUnmarshaler {
    /// Overwrites `self` with the value `data` describes.
    fn unmarshal_binary(&mut self, data: &[u8]) -> Result<(), UnmarshalError>;
}

/// Timestamp decoder hook.
pub type DecodeTimeFn = Arc<dyn Fn(&str) -> Result<DateTime<Utc>, BoxError> + Send + Sync>;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Timestamp decoders, one per source variant.
#[derive(Clone)]
pub struct DecodeTimeAttributes {
    /// Decoder for timestamps stored in an `S`. Defaults to RFC 3339.
    pub s: DecodeTimeFn,
    /// Decoder for timestamps stored in an `N`. Defaults to epoch seconds.
    pub n: DecodeTimeFn,
}

impl Default for DecodeTimeAttributes {
    fn default() -> Self {
        Self {
            s: Arc::new(decode_rfc3339),
            n: Arc::new(decode_unix_seconds),
        }
    }
}

impl fmt::Debug for DecodeTimeAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeTimeAttributes").finish_non_exhaustive()
    }
}

/// Decoder configuration.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DecoderOptions {
    /// Annotation key consulted in addition to `dynamodbav`.
    #[builder(default = DEFAULT_TAG_KEY.to_owned(), setter(into))]
    pub tag_key: String,

    /// Decode numbers into [`Dynamic::Number`] instead of [`Dynamic::Float`].
    #[builder(default = false)]
    pub use_number: bool,

    /// Timestamp decoders.
    #[builder(default)]
    pub decode_time: DecodeTimeAttributes,

    /// Decode `S` values holding base64 text into binary destinations.
    #[builder(default = false)]
    pub base64_blob_values: bool,

    /// Match record member names exactly, without the case-insensitive
    /// fallback.
    #[builder(default = false)]
    pub case_sensitive: bool,

    /// Decode `S` sources through a [`TextUnmarshaler`] and `B` sources
    /// through a [`BinaryUnmarshaler`] when the destination has one.
    #[builder(default = false)]
    pub use_encoding_unmarshalers: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_owned(),
            use_number: false,
            decode_time: DecodeTimeAttributes::default(),
            base64_blob_values: false,
            case_sensitive: false,
            use_encoding_unmarshalers: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decodes [`AttributeValue`]s into native values.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    /// Creates a decoder with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder, letting `configure` adjust the default options.
    #[must_use]
    pub fn with_options(configure: impl FnOnce(&mut DecoderOptions)) -> Self {
        let mut options = DecoderOptions::default();
        configure(&mut options);
        Self { options }
    }

    /// Creates a decoder from prepared options.
    #[must_use]
    pub fn from_options(options: DecoderOptions) -> Self {
        Self { options }
    }

    /// The active options.
    #[must_use]
    pub fn options(&self) -> &DecoderOptions {
        &self.options
    }

    /// Decodes `av` into `out`.
    ///
    /// Fails with [`UnmarshalError::InvalidDestination`] when `out` exposes
    /// neither structure nor a custom unmarshaler.
    pub fn decode<T: Reflect>(&self, av: &AttributeValue, out: &mut T) -> Result<(), UnmarshalError> {
        if out.as_unmarshaler().is_none() && matches!(out.reflect_mut(), ReflectMut::Opaque) {
            return Err(UnmarshalError::InvalidDestination {
                type_name: out.reflect_type_name().to_owned(),
            });
        }
        self.decode_value(av, out, &Tag::default())
    }

    /// Decodes `av` into `dest` under the directives of the field holding it.
    pub fn decode_value(
        &self,
        av: &AttributeValue,
        dest: &mut dyn Reflect,
        tag: &Tag,
    ) -> Result<(), UnmarshalError> {
        if av.is_null() {
            return decode_null(av, dest);
        }
        let type_name = dest.reflect_type_name();
        if let Some(unmarshaler) = dest.as_unmarshaler() {
            trace!(type_name, source = av.type_descriptor(), "custom unmarshaler");
            return unmarshaler.unmarshal_attribute_value(av);
        }
        if self.options.use_encoding_unmarshalers {
            if let AttributeValue::S(text) = av {
                if let Some(unmarshaler) = dest.as_text_unmarshaler() {
                    trace!(type_name, "text unmarshaler");
                    return unmarshaler.unmarshal_text(text);
                }
            }
            if let AttributeValue::B(data) = av {
                if let Some(unmarshaler) = dest.as_binary_unmarshaler() {
                    trace!(type_name, "binary unmarshaler");
                    return unmarshaler.unmarshal_binary(data);
                }
            }
        }

        match dest.reflect_mut() {
            ReflectMut::Optional(slot) => self.decode_value(av, slot.get_or_insert_default(), tag),
            ReflectMut::Dynamic(value) => self.decode_dynamic(av, value),
            slot => match av {
                AttributeValue::B(b) => decode_binary(b, slot, type_name),
                AttributeValue::Bool(b) => match slot {
                    ReflectMut::Bool(dst) => {
                        *dst = *b;
                        Ok(())
                    }
                    _ => Err(UnmarshalError::type_mismatch("bool", type_name)),
                },
                AttributeValue::Ss(_) | AttributeValue::Ns(_) | AttributeValue::Bs(_) => {
                    self.decode_set(av, slot, type_name)
                }
                AttributeValue::L(items) => self.decode_list(items, slot, type_name),
                AttributeValue::M(members) => self.decode_map(members, slot, type_name),
                AttributeValue::N(text) => self.decode_number(text, slot, tag, type_name),
                AttributeValue::S(text) => self.decode_string(text, slot, tag, type_name),
                AttributeValue::Null(_) => Ok(()),
            },
        }
    }

    fn decode_number(
        &self,
        text: &str,
        slot: ReflectMut<'_>,
        tag: &Tag,
        type_name: &str,
    ) -> Result<(), UnmarshalError> {
        match slot {
            ReflectMut::String(dst) => text.clone_into(dst),
            ReflectMut::Number(dst) => *dst = Number::new(text),
            ReflectMut::Int(dst) => {
                let value: i64 = text
                    .parse()
                    .map_err(|e| UnmarshalError::conversion(text, type_name, e))?;
                if !dst.set_i64(value) {
                    return Err(UnmarshalError::overflow(text, type_name));
                }
            }
            ReflectMut::Uint(dst) => {
                let value: u64 = text
                    .parse()
                    .map_err(|e| UnmarshalError::conversion(text, type_name, e))?;
                if !dst.set_u64(value) {
                    return Err(UnmarshalError::overflow(text, type_name));
                }
            }
            ReflectMut::Float(dst) => {
                let value: f64 = text
                    .parse()
                    .map_err(|e| UnmarshalError::conversion(text, type_name, e))?;
                if !dst.set_f64(value) {
                    return Err(UnmarshalError::overflow(text, type_name));
                }
            }
            ReflectMut::Bool(dst) if tag.as_string => *dst = parse_bool(text)?,
            ReflectMut::Time(dst) => {
                let parsed = if tag.as_unix_time {
                    decode_unix_seconds(text)
                } else {
                    (self.options.decode_time.n)(text)
                };
                *dst = parsed.map_err(|e| UnmarshalError::conversion(text, type_name, e))?;
            }
            _ => return Err(UnmarshalError::type_mismatch("number", type_name)),
        }
        Ok(())
    }

    fn decode_string(
        &self,
        text: &str,
        slot: ReflectMut<'_>,
        tag: &Tag,
        type_name: &str,
    ) -> Result<(), UnmarshalError> {
        if tag.as_string {
            return self.decode_number(text, slot, tag, type_name);
        }
        match slot {
            ReflectMut::String(dst) => text.clone_into(dst),
            ReflectMut::Number(dst) => *dst = Number::new(text),
            ReflectMut::Time(dst) => {
                *dst = (self.options.decode_time.s)(text)
                    .map_err(|e| UnmarshalError::conversion(text, type_name, e))?;
            }
            ReflectMut::Bytes(dst) if self.options.base64_blob_values => {
                let bytes = BASE64
                    .decode(text)
                    .map_err(|e| UnmarshalError::conversion(text, type_name, e))?;
                dst.set_bytes(&bytes);
            }
            _ => return Err(UnmarshalError::type_mismatch("string", type_name)),
        }
        Ok(())
    }

    fn decode_set(
        &self,
        av: &AttributeValue,
        slot: ReflectMut<'_>,
        type_name: &str,
    ) -> Result<(), UnmarshalError> {
        let seq = match (slot, av) {
            (ReflectMut::Seq(seq), _) => seq,
            (ReflectMut::Bytes(dst), AttributeValue::Ns(items)) => {
                let members: Vec<_> = items.iter().cloned().map(AttributeValue::N).collect();
                return self.decode_byte_elements(&members, dst);
            }
            _ => return Err(UnmarshalError::type_mismatch(av.kind_name(), type_name)),
        };
        let len = match av {
            AttributeValue::Ss(v) | AttributeValue::Ns(v) => v.len(),
            AttributeValue::Bs(v) => v.len(),
            _ => 0,
        };

        let count = prepare_sequence(seq, len);
        for i in 0..count {
            let Some(elem) = seq.get_mut(i) else {
                break;
            };
            // A member type with its own unmarshaler takes the whole set.
            if let Some(unmarshaler) = elem.as_unmarshaler() {
                return unmarshaler.unmarshal_attribute_value(av);
            }
            let Some(member) = set_member(av, i) else {
                break;
            };
            self.decode_value(&member, elem, &Tag::default())?;
        }
        Ok(())
    }

    fn decode_list(
        &self,
        items: &[AttributeValue],
        slot: ReflectMut<'_>,
        type_name: &str,
    ) -> Result<(), UnmarshalError> {
        let seq = match slot {
            ReflectMut::Seq(seq) => seq,
            ReflectMut::Bytes(dst) => return self.decode_byte_elements(items, dst),
            _ => return Err(UnmarshalError::type_mismatch("list", type_name)),
        };
        let count = prepare_sequence(seq, items.len());
        for (i, item) in items.iter().take(count).enumerate() {
            if let Some(elem) = seq.get_mut(i) {
                self.decode_value(item, elem, &Tag::default())?;
            }
        }
        Ok(())
    }

    /// Decodes each element as a `u8`, then stores the collected bytes.
    fn decode_byte_elements(
        &self,
        items: &[AttributeValue],
        dst: &mut dyn ByteSlot,
    ) -> Result<(), UnmarshalError> {
        let mut bytes = Vec::with_capacity(items.len());
        for item in items {
            let mut byte = 0u8;
            self.decode_value(item, &mut byte, &Tag::default())?;
            bytes.push(byte);
        }
        dst.set_bytes(&bytes);
        Ok(())
    }

    fn decode_map(
        &self,
        members: &HashMap<String, AttributeValue>,
        slot: ReflectMut<'_>,
        type_name: &str,
    ) -> Result<(), UnmarshalError> {
        match slot {
            ReflectMut::Map(map) => {
                for (key, value) in members {
                    map.decode_entry(key, value, self)?;
                }
                Ok(())
            }
            ReflectMut::Record(record) => self.decode_record(members, record),
            _ => Err(UnmarshalError::type_mismatch("map", type_name)),
        }
    }

    fn decode_record(
        &self,
        members: &HashMap<String, AttributeValue>,
        record: &mut dyn Record,
    ) -> Result<(), UnmarshalError> {
        let fields = cached_fields(
            record.record_info(),
            &self.options.tag_key,
            self.options.case_sensitive,
        );
        for (name, value) in members {
            let Some(field) = fields.field_by_name(name) else {
                continue;
            };
            let Some(dest) = field_by_index_mut(record, &field.index) else {
                continue;
            };
            self.decode_value(value, dest, &field.tag)?;
        }
        Ok(())
    }

    fn decode_dynamic(&self, av: &AttributeValue, value: &mut Dynamic) -> Result<(), UnmarshalError> {
        if let Dynamic::Value(inner) = value {
            return self.decode_value(av, &mut **inner, &Tag::default());
        }

        *value = match av {
            AttributeValue::S(s) => Dynamic::String(s.clone()),
            AttributeValue::N(n) => self.dynamic_number(n)?,
            AttributeValue::B(b) => Dynamic::Bytes(b.to_vec()),
            AttributeValue::Bool(b) => Dynamic::Bool(*b),
            AttributeValue::Null(_) => Dynamic::Nil,
            AttributeValue::L(items) => {
                let mut list = Vec::with_capacity(items.len());
                for item in items {
                    let mut elem = Dynamic::Nil;
                    self.decode_value(item, &mut elem, &Tag::default())?;
                    list.push(elem);
                }
                Dynamic::List(list)
            }
            AttributeValue::M(members) => {
                let mut map = HashMap::with_capacity(members.len());
                for (key, member) in members {
                    let mut elem = Dynamic::Nil;
                    self.decode_value(member, &mut elem, &Tag::default())?;
                    map.insert(key.clone(), elem);
                }
                Dynamic::Map(map)
            }
            AttributeValue::Ss(items) => Dynamic::StringSet(items.clone()),
            AttributeValue::Ns(items) => {
                if self.options.use_number {
                    Dynamic::NumberSet(items.iter().map(Number::new).collect())
                } else {
                    let floats = items
                        .iter()
                        .map(|n| {
                            n.parse::<f64>()
                                .map_err(|e| UnmarshalError::conversion(n, "f64", e))
                        })
                        .collect::<Result<_, _>>()?;
                    Dynamic::FloatSet(floats)
                }
            }
            AttributeValue::Bs(items) => Dynamic::BinarySet(items.iter().map(|b| b.to_vec()).collect()),
        };
        Ok(())
    }

    fn dynamic_number(&self, text: &str) -> Result<Dynamic, UnmarshalError> {
        if self.options.use_number {
            return Ok(Dynamic::Number(Number::new(text)));
        }
        text.parse()
            .map(Dynamic::Float)
            .map_err(|e| UnmarshalError::conversion(text, "f64", e))
    }
}

/// Clears optionals, hands `NULL` to custom unmarshalers and resets any other
/// destination to its zero value.
fn decode_null(av: &AttributeValue, dest: &mut dyn Reflect) -> Result<(), UnmarshalError> {
    if let ReflectMut::Optional(slot) = dest.reflect_mut() {
        slot.clear();
        return Ok(());
    }
    if let Some(unmarshaler) = dest.as_unmarshaler() {
        return unmarshaler.unmarshal_attribute_value(av);
    }
    dest.reset();
    Ok(())
}

fn decode_binary(bytes: &[u8], slot: ReflectMut<'_>, type_name: &str) -> Result<(), UnmarshalError> {
    match slot {
        ReflectMut::Bytes(dst) => {
            dst.set_bytes(bytes);
            Ok(())
        }
        _ => Err(UnmarshalError::type_mismatch("binary", type_name)),
    }
}

/// Sizes a sequence for `len` source elements and returns how many to decode.
fn prepare_sequence(seq: &mut dyn SequenceMut, len: usize) -> usize {
    match seq.fixed_len() {
        Some(capacity) => capacity.min(len),
        None => {
            seq.resize(len);
            len
        }
    }
}

fn set_member(av: &AttributeValue, index: usize) -> Option<AttributeValue> {
    match av {
        AttributeValue::Ss(v) => v.get(index).cloned().map(AttributeValue::S),
        AttributeValue::Ns(v) => v.get(index).cloned().map(AttributeValue::N),
        AttributeValue::Bs(v) => v.get(index).cloned().map(AttributeValue::B),
        _ => None,
    }
}

/// Follows an index path through embedded records, allocating absent
/// optional records on the way.
fn field_by_index_mut<'a>(
    record: &'a mut dyn Record,
    index: &[usize],
) -> Option<&'a mut dyn Reflect> {
    let (first, rest) = index.split_first()?;
    let mut value = record.field_mut(*first)?;
    for &i in rest {
        value = as_record_mut(value)?.field_mut(i)?;
    }
    Some(value)
}

fn as_record_mut(value: &mut dyn Reflect) -> Option<&mut dyn Record> {
    match value.reflect_mut() {
        ReflectMut::Record(record) => Some(record),
        ReflectMut::Optional(slot) => as_record_mut(slot.get_or_insert_default()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Top-level API
// ---------------------------------------------------------------------------

/// Decodes `av` into `out` with default options.
pub fn unmarshal<T: Reflect>(av: &AttributeValue, out: &mut T) -> Result<(), UnmarshalError> {
    Decoder::new().decode(av, out)
}

/// Decodes `av` into `out`, letting `configure` adjust the default options.
pub fn unmarshal_with_options<T: Reflect>(
    av: &AttributeValue,
    out: &mut T,
    configure: impl FnOnce(&mut DecoderOptions),
) -> Result<(), UnmarshalError> {
    Decoder::with_options(configure).decode(av, out)
}

/// Decodes the members of an `M` into `out`.
pub fn unmarshal_map<T: Reflect>(
    members: &HashMap<String, AttributeValue>,
    out: &mut T,
) -> Result<(), UnmarshalError> {
    unmarshal_map_with_options(members, out, |_| {})
}

/// [`unmarshal_map`] with adjusted options.
pub fn unmarshal_map_with_options<T: Reflect>(
    members: &HashMap<String, AttributeValue>,
    out: &mut T,
    configure: impl FnOnce(&mut DecoderOptions),
) -> Result<(), UnmarshalError> {
    unmarshal_with_options(&AttributeValue::M(members.clone()), out, configure)
}

/// Decodes the elements of an `L` into `out`.
pub fn unmarshal_list<T: Reflect>(
    items: &[AttributeValue],
    out: &mut T,
) -> Result<(), UnmarshalError> {
    unmarshal_list_with_options(items, out, |_| {})
}

/// [`unmarshal_list`] with adjusted options.
pub fn unmarshal_list_with_options<T: Reflect>(
    items: &[AttributeValue],
    out: &mut T,
    configure: impl FnOnce(&mut DecoderOptions),
) -> Result<(), UnmarshalError> {
    unmarshal_with_options(&AttributeValue::L(items.to_vec()), out, configure)
}

/// Decodes a list of items, such as a query result page, into `out`.
pub fn unmarshal_list_of_maps<T: Reflect>(
    items: &[HashMap<String, AttributeValue>],
    out: &mut T,
) -> Result<(), UnmarshalError> {
    unmarshal_list_of_maps_with_options(items, out, |_| {})
}

/// [`unmarshal_list_of_maps`] with adjusted options.
pub fn unmarshal_list_of_maps_with_options<T: Reflect>(
    items: &[HashMap<String, AttributeValue>],
    out: &mut T,
    configure: impl FnOnce(&mut DecoderOptions),
) -> Result<(), UnmarshalError> {
    let list = items.iter().cloned().map(AttributeValue::M).collect();
    unmarshal_with_options(&AttributeValue::L(list), out, configure)
}
