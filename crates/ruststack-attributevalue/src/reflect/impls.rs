//! [`Reflect`] implementations for std, `bytes` and `chrono` types.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;
use chrono::{DateTime, Utc};

use super::{
    ByteSlot, FloatSlot, IntSlot, Mapping, MappingMut, OptionalSlot, Reflect, ReflectMut,
    ReflectRef, Sequence, SequenceMut, UintSlot,
};
use crate::attribute_value::AttributeValue;
use crate::decode::{BinaryUnmarshaler, Decoder, TextUnmarshaler, Unmarshaler};
use crate::dynamic::Dynamic;
use crate::encode::{BinaryMarshaler, Encoder, Marshaler, TextMarshaler};
use crate::error::{MarshalError, UnmarshalError};
use crate::map_key::MapKey;
use crate::number::Number;
use crate::tag::Tag;

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

macro_rules! impl_reflect_int {
    ($($ty:ty),*) => {$(
        #[allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::unnecessary_cast)]
        impl Reflect for $ty {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Int(*self as i64)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Int(self)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn reset(&mut self) {
                *self = 0;
            }
        }

        impl IntSlot for $ty {
            fn set_i64(&mut self, value: i64) -> bool {
                if let Ok(v) = <$ty>::try_from(value) {
                    *self = v;
                    true
                } else {
                    false
                }
            }
        }
    )*};
}

macro_rules! impl_reflect_uint {
    ($($ty:ty),*) => {$(
        #[allow(clippy::cast_lossless, clippy::unnecessary_cast)]
        impl Reflect for $ty {
            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Uint(*self as u64)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Uint(self)
            }

            fn is_zero(&self) -> bool {
                *self == 0
            }

            fn reset(&mut self) {
                *self = 0;
            }
        }

        impl UintSlot for $ty {
            fn set_u64(&mut self, value: u64) -> bool {
                if let Ok(v) = <$ty>::try_from(value) {
                    *self = v;
                    true
                } else {
                    false
                }
            }
        }
    )*};
}

impl_reflect_int!(i8, i16, i32, i64, isize);
impl_reflect_uint!(u8, u16, u32, u64, usize);

impl Reflect for f32 {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::F32(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Float(self)
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

impl FloatSlot for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn set_f64(&mut self, value: f64) -> bool {
        if value.is_infinite() || value.abs() > f64::from(f32::MAX) {
            return false;
        }
        *self = value as f32;
        true
    }
}

impl Reflect for f64 {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::F64(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Float(self)
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn reset(&mut self) {
        *self = 0.0;
    }
}

impl FloatSlot for f64 {
    fn set_f64(&mut self, value: f64) -> bool {
        if value.is_infinite() {
            return false;
        }
        *self = value;
        true
    }
}

impl Reflect for bool {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Bool(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Bool(self)
    }

    fn is_zero(&self) -> bool {
        !*self
    }

    fn reset(&mut self) {
        *self = false;
    }
}

impl Reflect for String {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::String(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl Reflect for Number {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Number(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Number(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reset(&mut self) {
        *self = Number::default();
    }
}

impl Reflect for DateTime<Utc> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Time(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Time(self)
    }

    fn is_zero(&self) -> bool {
        *self == DateTime::<Utc>::UNIX_EPOCH
    }

    fn reset(&mut self) {
        *self = DateTime::<Utc>::UNIX_EPOCH;
    }
}

impl Reflect for Bytes {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Bytes(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Bytes(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reset(&mut self) {
        *self = Bytes::new();
    }
}

impl ByteSlot for Bytes {
    fn set_bytes(&mut self, bytes: &[u8]) {
        *self = Bytes::copy_from_slice(bytes);
    }
}

impl ByteSlot for Vec<u8> {
    fn set_bytes(&mut self, bytes: &[u8]) {
        self.clear();
        self.extend_from_slice(bytes);
    }
}

impl<const N: usize> ByteSlot for [u8; N] {
    fn set_bytes(&mut self, bytes: &[u8]) {
        let n = N.min(bytes.len());
        self[..n].copy_from_slice(&bytes[..n]);
    }
}

// ---------------------------------------------------------------------------
// Sequences
// ---------------------------------------------------------------------------

fn is_byte_string<T: 'static>() -> bool {
    let id = TypeId::of::<T>();
    id == TypeId::of::<Vec<u8>>() || id == TypeId::of::<Bytes>()
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        match (self as &dyn Any).downcast_ref::<Vec<u8>>() {
            Some(bytes) => ReflectRef::Bytes(bytes),
            None => ReflectRef::Seq(self),
        }
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            return match (self as &mut dyn Any).downcast_mut::<Vec<u8>>() {
                Some(bytes) => ReflectMut::Bytes(bytes),
                None => ReflectMut::Opaque,
            };
        }
        ReflectMut::Seq(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl<T: Reflect + Default> Sequence for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn holds_bytes(&self) -> bool {
        is_byte_string::<T>()
    }
}

impl<T: Reflect + Default> SequenceMut for Vec<T> {
    fn fixed_len(&self) -> Option<usize> {
        None
    }

    fn resize(&mut self, len: usize) {
        self.resize_with(len, T::default);
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        match (self as &dyn Any).downcast_ref::<[u8; N]>() {
            Some(bytes) => ReflectRef::Bytes(bytes),
            None => ReflectRef::Seq(self),
        }
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        if TypeId::of::<T>() == TypeId::of::<u8>() {
            return match (self as &mut dyn Any).downcast_mut::<[u8; N]>() {
                Some(bytes) => ReflectMut::Bytes(bytes),
                None => ReflectMut::Opaque,
            };
        }
        ReflectMut::Seq(self)
    }

    // Arrays are never considered empty unless they have no capacity.
    fn is_zero(&self) -> bool {
        N == 0
    }

    fn reset(&mut self) {
        for item in self.iter_mut() {
            item.reset();
        }
    }
}

impl<T: Reflect, const N: usize> Sequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|v| v as &dyn Reflect)
    }

    fn holds_bytes(&self) -> bool {
        is_byte_string::<T>()
    }
}

impl<T: Reflect, const N: usize> SequenceMut for [T; N] {
    fn fixed_len(&self) -> Option<usize> {
        Some(N)
    }

    fn resize(&mut self, _len: usize) {}

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice().get_mut(index).map(|v| v as &mut dyn Reflect)
    }
}

// ---------------------------------------------------------------------------
// Indirection
// ---------------------------------------------------------------------------

impl<T: Reflect + Default> Reflect for Option<T> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Optional(self.as_ref().map(|v| v as &dyn Reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Optional(self)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn is_absent(&self) -> bool {
        self.is_none()
    }

    fn reset(&mut self) {
        *self = None;
    }
}

impl<T: Reflect + Default> OptionalSlot for Option<T> {
    fn get_or_insert_default(&mut self) -> &mut dyn Reflect {
        self.get_or_insert_with(T::default)
    }

    fn clear(&mut self) {
        *self = None;
    }
}

// Boxes are transparent: the codec sees the boxed value directly.
impl<T: Reflect + ?Sized> Reflect for Box<T> {
    fn reflect_type_name(&self) -> &'static str {
        (**self).reflect_type_name()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        (**self).reflect_ref()
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        (**self).reflect_mut()
    }

    fn as_marshaler(&self) -> Option<&dyn Marshaler> {
        (**self).as_marshaler()
    }

    fn as_unmarshaler(&mut self) -> Option<&mut dyn Unmarshaler> {
        (**self).as_unmarshaler()
    }

    fn as_text_marshaler(&self) -> Option<&dyn TextMarshaler> {
        (**self).as_text_marshaler()
    }

    fn as_binary_marshaler(&self) -> Option<&dyn BinaryMarshaler> {
        (**self).as_binary_marshaler()
    }

    fn as_text_unmarshaler(&mut self) -> Option<&mut dyn TextUnmarshaler> {
        (**self).as_text_unmarshaler()
    }

    fn as_binary_unmarshaler(&mut self) -> Option<&mut dyn BinaryUnmarshaler> {
        (**self).as_binary_unmarshaler()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn is_absent(&self) -> bool {
        (**self).is_absent()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

impl Reflect for Dynamic {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Dynamic(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Dynamic(self)
    }

    fn is_zero(&self) -> bool {
        self.is_nil()
    }

    fn is_absent(&self) -> bool {
        match self {
            Dynamic::Nil => true,
            Dynamic::Value(inner) => inner.is_absent(),
            _ => false,
        }
    }

    fn reset(&mut self) {
        *self = Dynamic::Nil;
    }
}

// ---------------------------------------------------------------------------
// Mappings
// ---------------------------------------------------------------------------

impl<K, V, S> Reflect for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl<K, V, S> Mapping for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn entries(&self, encoder: &Encoder) -> Result<Vec<(String, &dyn Reflect)>, MarshalError> {
        self.iter()
            .map(|(k, v)| Ok((k.encode_key(encoder)?, v as &dyn Reflect)))
            .collect()
    }
}

impl<K, V, S> MappingMut for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash + 'static,
    V: Reflect + Default,
    S: BuildHasher + Default + 'static,
{
    fn decode_entry(
        &mut self,
        key: &str,
        value: &AttributeValue,
        decoder: &Decoder,
    ) -> Result<(), UnmarshalError> {
        let key = K::decode_key(key, decoder)?;
        let mut elem = V::default();
        decoder.decode_value(value, &mut elem, &Tag::default())?;
        self.insert(key, elem);
        Ok(())
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: MapKey + Ord + 'static,
    V: Reflect + Default,
{
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Map(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Map(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn reset(&mut self) {
        self.clear();
    }
}

impl<K, V> Mapping for BTreeMap<K, V>
where
    K: MapKey + Ord + 'static,
    V: Reflect + Default,
{
    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn entries(&self, encoder: &Encoder) -> Result<Vec<(String, &dyn Reflect)>, MarshalError> {
        self.iter()
            .map(|(k, v)| Ok((k.encode_key(encoder)?, v as &dyn Reflect)))
            .collect()
    }
}

impl<K, V> MappingMut for BTreeMap<K, V>
where
    K: MapKey + Ord + 'static,
    V: Reflect + Default,
{
    fn decode_entry(
        &mut self,
        key: &str,
        value: &AttributeValue,
        decoder: &Decoder,
    ) -> Result<(), UnmarshalError> {
        let key = K::decode_key(key, decoder)?;
        let mut elem = V::default();
        decoder.decode_value(value, &mut elem, &Tag::default())?;
        self.insert(key, elem);
        Ok(())
    }
}
