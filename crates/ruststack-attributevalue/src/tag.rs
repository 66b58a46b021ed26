//! Field annotation parsing.
//!
//! A field annotation is a comma separated string such as
//! `"name,omitempty,string"`. The first segment overrides the wire name
//! (empty keeps the declared name); the rest are flags. A lone `-` drops the
//! field from both directions.

use crate::reflect::FieldInfo;

/// Tag key read from every field annotation.
pub const DEFAULT_TAG_KEY: &str = "dynamodbav";

/// Parsed per-field directives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Tag {
    /// Wire name override.
    pub name: Option<String>,
    /// Field is never encoded or decoded.
    pub ignore: bool,
    /// Skip the field when its value is the zero value.
    pub omit_empty: bool,
    /// Drop empty elements of a list or absent entries of a map.
    pub omit_empty_elem: bool,
    /// Encode empty list elements and absent map entries as `NULL`.
    pub null_empty_elem: bool,
    /// Encode numbers as `S` and decode numbers from `S`.
    pub as_string: bool,
    /// Encode and decode timestamps as epoch seconds in an `N`.
    pub as_unix_time: bool,
    /// Encode the sequence as a binary set.
    pub as_bin_set: bool,
    /// Encode the sequence as a number set.
    pub as_num_set: bool,
    /// Encode the sequence as a string set.
    pub as_str_set: bool,
}

impl Tag {
    /// Parses a raw annotation string. Unknown flags are ignored.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut tag = Self::default();
        if raw.is_empty() {
            return tag;
        }
        if raw == "-" {
            tag.ignore = true;
            return tag;
        }

        let mut parts = raw.split(',');
        if let Some(name) = parts.next() {
            if !name.is_empty() {
                tag.name = Some(name.to_owned());
            }
        }
        for flag in parts {
            match flag {
                "omitempty" => tag.omit_empty = true,
                "omitemptyelem" => tag.omit_empty_elem = true,
                "nullemptyelem" => tag.null_empty_elem = true,
                "string" => tag.as_string = true,
                "unixtime" => tag.as_unix_time = true,
                "binaryset" => tag.as_bin_set = true,
                "numberset" => tag.as_num_set = true,
                "stringset" => tag.as_str_set = true,
                _ => {}
            }
        }
        tag
    }

    /// Reads the directives of a record field.
    ///
    /// The `dynamodbav` annotation is always consulted; an annotation under a
    /// custom `tag_key` takes precedence when the field carries one.
    #[must_use]
    pub fn for_field(field: &FieldInfo, tag_key: &str) -> Self {
        if tag_key != DEFAULT_TAG_KEY {
            if let Some(raw) = field.tag(tag_key) {
                return Self::parse(raw);
            }
        }
        field.tag(DEFAULT_TAG_KEY).map(Self::parse).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_name_and_flags() {
        let tag = Tag::parse("abc,omitempty,string,unixtime");
        assert_eq!(
            tag,
            Tag {
                name: Some("abc".to_owned()),
                omit_empty: true,
                as_string: true,
                as_unix_time: true,
                ..Tag::default()
            }
        );
    }

    #[test]
    fn test_should_keep_declared_name_for_empty_segment() {
        let tag = Tag::parse(",omitemptyelem,nullemptyelem");
        assert_eq!(tag.name, None);
        assert!(tag.omit_empty_elem);
        assert!(tag.null_empty_elem);
    }

    #[test]
    fn test_should_ignore_lone_dash() {
        let tag = Tag::parse("-");
        assert!(tag.ignore);
        assert_eq!(tag.name, None);
    }

    #[test]
    fn test_should_name_field_dash_when_followed_by_comma() {
        let tag = Tag::parse("-,");
        assert!(!tag.ignore);
        assert_eq!(tag.name.as_deref(), Some("-"));
    }

    #[test]
    fn test_should_skip_unknown_flags() {
        let tag = Tag::parse("name,nullempty,future,stringset");
        assert_eq!(tag.name.as_deref(), Some("name"));
        assert!(tag.as_str_set);
        assert!(!tag.omit_empty);
    }

    #[test]
    fn test_should_prefer_custom_tag_key() {
        let field = FieldInfo {
            name: "value",
            tags: &[("dynamodbav", "ddbav"), ("json", "A,omitempty")],
            embedded: None,
        };
        assert_eq!(Tag::for_field(&field, "json").name.as_deref(), Some("A"));
        assert_eq!(Tag::for_field(&field, DEFAULT_TAG_KEY).name.as_deref(), Some("ddbav"));
        assert_eq!(Tag::for_field(&field, "yaml").name.as_deref(), Some("ddbav"));
    }
}
