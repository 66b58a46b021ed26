//! Structured-value codec between native Rust data and DynamoDB
//! `AttributeValue`s.
//!
//! Records implement [`Reflect`] through `#[derive(Reflect)]`; the std,
//! `bytes` and `chrono` types the codec understands implement it out of the
//! box. [`marshal`] turns a value into an [`AttributeValue`] and
//! [`unmarshal`] writes an [`AttributeValue`] into an existing value.
//!
//! ```
//! use ruststack_attributevalue::{AttributeValue, Reflect, marshal, unmarshal};
//!
//! #[derive(Debug, Default, PartialEq, Reflect)]
//! struct Order {
//!     #[attrvalue(dynamodbav = "pk")]
//!     id: String,
//!     #[attrvalue(dynamodbav = ",omitempty")]
//!     quantity: u32,
//!     tags: Vec<String>,
//! }
//!
//! let order = Order { id: "o-1".to_owned(), quantity: 0, tags: vec!["new".to_owned()] };
//! let av = marshal(&order).unwrap();
//! let members = av.as_m().unwrap();
//! assert_eq!(members["pk"], AttributeValue::S("o-1".to_owned()));
//! assert!(!members.contains_key("quantity"));
//!
//! let mut back = Order::default();
//! unmarshal(&av, &mut back).unwrap();
//! assert_eq!(back, order);
//! ```

extern crate self as ruststack_attributevalue;

pub mod attribute_value;
pub mod decode;
pub mod dynamic;
pub mod encode;
pub mod error;
pub mod field;
pub mod json;
pub mod map_key;
pub mod number;
pub mod reflect;
pub mod tag;
pub mod time;

pub use attribute_value::AttributeValue;
pub use decode::{
    BinaryUnmarshaler, DecodeTimeAttributes, Decoder, DecoderOptions, TextUnmarshaler,
    Unmarshaler, unmarshal, unmarshal_list, unmarshal_list_of_maps,
    unmarshal_list_of_maps_with_options, unmarshal_list_with_options, unmarshal_map,
    unmarshal_map_with_options, unmarshal_with_options,
};
pub use dynamic::Dynamic;
pub use encode::{
    BinaryMarshaler, Encoder, EncoderOptions, Marshaler, TextMarshaler, marshal, marshal_list,
    marshal_list_with_options, marshal_map, marshal_map_with_options, marshal_with_options,
};
pub use error::{BoxError, MarshalError, UnmarshalError};
pub use json::{
    marshal_json, marshal_list_json, marshal_map_json, unmarshal_json, unmarshal_list_json,
    unmarshal_map_json,
};
pub use map_key::MapKey;
pub use number::Number;
pub use reflect::{
    ByteSlot, FieldInfo, FloatSlot, IntSlot, Mapping, MappingMut, OptionalSlot, Record,
    RecordInfo, RecordType, Reflect, ReflectMut, ReflectRef, Sequence, SequenceMut, UintSlot,
};
pub use ruststack_attributevalue_derive::Reflect;
pub use tag::Tag;
pub use time::UnixTime;
