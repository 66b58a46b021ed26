//! Compile-time introspection used by the traversal engine.
//!
//! Every value the codec touches implements [`Reflect`], which exposes it as
//! a borrowed view ([`ReflectRef`]) for encoding or as a writable slot
//! ([`ReflectMut`]) for decoding. Records get their field tables from
//! `#[derive(Reflect)]`; the std types the codec understands are implemented
//! in [`impls`].
//!
//! ```text
//! Reflect ──► ReflectRef ──► scalar | Seq | Map | Record | Optional | Dynamic
//!         └─► ReflectMut ──► slot   | SequenceMut | MappingMut | Record | ...
//! ```

mod impls;

use std::any::{Any, TypeId};

use chrono::{DateTime, Utc};

use crate::attribute_value::AttributeValue;
use crate::decode::{BinaryUnmarshaler, Decoder, TextUnmarshaler, Unmarshaler};
use crate::dynamic::Dynamic;
use crate::encode::{BinaryMarshaler, Encoder, Marshaler, TextMarshaler};
use crate::error::{MarshalError, UnmarshalError};
use crate::number::Number;

// ---------------------------------------------------------------------------
// Reflect
// ---------------------------------------------------------------------------

/// A value the codec can traverse.
///
/// Usually implemented with `#[derive(Reflect)]` for records and newtypes,
/// or with [`impl_reflect_custom!`](crate::impl_reflect_custom) for types
/// that only provide [`Marshaler`] and [`Unmarshaler`].
pub trait Reflect: Any {
    /// Name of the concrete type, used in error messages.
    fn reflect_type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Borrowed structural view of the value.
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Writable structural view of the value.
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Custom encode capability, consulted before generic traversal.
    fn as_marshaler(&self) -> Option<&dyn Marshaler> {
        None
    }

    /// Custom decode capability, consulted before generic traversal.
    fn as_unmarshaler(&mut self) -> Option<&mut dyn Unmarshaler> {
        None
    }

    /// Text encode capability, used when the encoder opts in.
    fn as_text_marshaler(&self) -> Option<&dyn TextMarshaler> {
        None
    }

    /// Binary encode capability, used when the encoder opts in.
    fn as_binary_marshaler(&self) -> Option<&dyn BinaryMarshaler> {
        None
    }

    /// Text decode capability, used when the decoder opts in.
    fn as_text_unmarshaler(&mut self) -> Option<&mut dyn TextUnmarshaler> {
        None
    }

    /// Binary decode capability, used when the decoder opts in.
    fn as_binary_unmarshaler(&mut self) -> Option<&mut dyn BinaryUnmarshaler> {
        None
    }

    /// Whether the value is the zero value of its type, for `omitempty`.
    fn is_zero(&self) -> bool;

    /// Whether the value is an absence sentinel (`None`, `Dynamic::Nil`).
    fn is_absent(&self) -> bool {
        false
    }

    /// Reset the value to the zero value of its type.
    fn reset(&mut self);
}

/// Borrowed view of a reflected value.
#[derive(Clone, Copy)]
#[non_exhaustive]
pub enum ReflectRef<'a> {
    /// Boolean.
    Bool(bool),
    /// Any signed integer, widened.
    Int(i64),
    /// Any unsigned integer, widened.
    Uint(u64),
    /// Single precision float.
    F32(f32),
    /// Double precision float.
    F64(f64),
    /// UTF-8 text.
    String(&'a str),
    /// Number literal.
    Number(&'a Number),
    /// Byte string.
    Bytes(&'a [u8]),
    /// Timestamp.
    Time(&'a DateTime<Utc>),
    /// Ordered sequence.
    Seq(&'a dyn Sequence),
    /// Keyed mapping.
    Map(&'a dyn Mapping),
    /// Record with named fields.
    Record(&'a dyn Record),
    /// Optional value, `None` when absent.
    Optional(Option<&'a dyn Reflect>),
    /// Open-type slot.
    Dynamic(&'a Dynamic),
    /// No structure; only custom capabilities apply.
    Opaque,
}

/// Writable view of a reflected value.
#[non_exhaustive]
pub enum ReflectMut<'a> {
    /// Boolean.
    Bool(&'a mut bool),
    /// Signed integer of any width.
    Int(&'a mut dyn IntSlot),
    /// Unsigned integer of any width.
    Uint(&'a mut dyn UintSlot),
    /// Float of any width.
    Float(&'a mut dyn FloatSlot),
    /// UTF-8 text.
    String(&'a mut String),
    /// Number literal.
    Number(&'a mut Number),
    /// Byte string or fixed byte array.
    Bytes(&'a mut dyn ByteSlot),
    /// Timestamp.
    Time(&'a mut DateTime<Utc>),
    /// Growable or fixed sequence.
    Seq(&'a mut dyn SequenceMut),
    /// Keyed mapping.
    Map(&'a mut dyn MappingMut),
    /// Record with named fields.
    Record(&'a mut dyn Record),
    /// Optional value.
    Optional(&'a mut dyn OptionalSlot),
    /// Open-type slot.
    Dynamic(&'a mut Dynamic),
    /// No structure; only custom capabilities apply.
    Opaque,
}

// ---------------------------------------------------------------------------
// Scalar slots
// ---------------------------------------------------------------------------

/// Destination for a signed integer.
pub trait IntSlot {
    /// Stores `value`, returning `false` if it overflows the slot.
    fn set_i64(&mut self, value: i64) -> bool;
}

/// Destination for an unsigned integer.
pub trait UintSlot {
    /// Stores `value`, returning `false` if it overflows the slot.
    fn set_u64(&mut self, value: u64) -> bool;
}

/// Destination for a float.
pub trait FloatSlot {
    /// Stores `value`, returning `false` if it overflows the slot.
    fn set_f64(&mut self, value: f64) -> bool;
}

/// Destination for binary data.
pub trait ByteSlot {
    /// Stores `bytes`. Fixed arrays copy at most their own length.
    fn set_bytes(&mut self, bytes: &[u8]);
}

// ---------------------------------------------------------------------------
// Containers
// ---------------------------------------------------------------------------

/// Read access to an ordered sequence.
pub trait Sequence {
    /// Number of elements.
    fn len(&self) -> usize;

    /// Whether the sequence has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`.
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Whether the elements are byte strings, making this a binary set.
    fn holds_bytes(&self) -> bool;
}

/// Write access to an ordered sequence.
pub trait SequenceMut {
    /// Capacity of a fixed-size sequence, `None` when growable.
    fn fixed_len(&self) -> Option<usize>;

    /// Grows or shrinks a growable sequence to exactly `len` elements.
    fn resize(&mut self, len: usize);

    /// Element at `index`.
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Read access to a keyed mapping.
pub trait Mapping {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Whether the mapping has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries with keys rendered through the map-key coder.
    fn entries(&self, encoder: &Encoder) -> Result<Vec<(String, &dyn Reflect)>, MarshalError>;
}

/// Write access to a keyed mapping.
pub trait MappingMut {
    /// Decodes `value` into a fresh element and inserts it under the decoded `key`.
    fn decode_entry(
        &mut self,
        key: &str,
        value: &AttributeValue,
        decoder: &Decoder,
    ) -> Result<(), UnmarshalError>;
}

/// Optional value slot.
pub trait OptionalSlot {
    /// The contained value, allocating a default one when absent.
    fn get_or_insert_default(&mut self) -> &mut dyn Reflect;

    /// Drops the contained value.
    fn clear(&mut self);
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A struct with named fields, normally implemented by `#[derive(Reflect)]`.
pub trait Record {
    /// Static field table of the record type.
    fn record_info(&self) -> &'static RecordInfo;

    /// Field at declaration `index`.
    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    /// Mutable field at declaration `index`.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;
}

/// Static access to a record's field table, used to walk embedded records.
pub trait RecordType {
    /// Static field table of the record type.
    fn record_type_info() -> &'static RecordInfo;
}

/// Field table of a record type.
#[derive(Debug)]
pub struct RecordInfo {
    /// Rust type name.
    pub type_name: &'static str,
    /// Type identity, used as the field cache key.
    pub type_id: fn() -> TypeId,
    /// Fields in declaration order.
    pub fields: &'static [FieldInfo],
}

/// A record field.
#[derive(Debug)]
pub struct FieldInfo {
    /// Declared field name.
    pub name: &'static str,
    /// Annotations as `(tag key, raw value)` pairs.
    pub tags: &'static [(&'static str, &'static str)],
    /// Field table of the embedded record, for fields marked `embed`.
    pub embedded: Option<fn() -> &'static RecordInfo>,
}

impl FieldInfo {
    /// Raw annotation stored under `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'static str> {
        self.tags.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }
}

/// Implements [`Reflect`] for types that provide both [`Marshaler`] and
/// [`Unmarshaler`] and have no structure of their own.
///
/// The types must implement `Default`, which `NULL` decoding resets them to
/// when they sit inside a record.
#[macro_export]
macro_rules! impl_reflect_custom {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Reflect for $ty {
            fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
                $crate::ReflectRef::Opaque
            }

            fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                $crate::ReflectMut::Opaque
            }

            fn as_marshaler(&self) -> ::core::option::Option<&dyn $crate::Marshaler> {
                ::core::option::Option::Some(self)
            }

            fn as_unmarshaler(&mut self) -> ::core::option::Option<&mut dyn $crate::Unmarshaler> {
                ::core::option::Option::Some(self)
            }

            fn is_zero(&self) -> bool {
                false
            }

            fn reset(&mut self) {
                *self = <$ty as ::core::default::Default>::default();
            }
        }
    )+};
}
