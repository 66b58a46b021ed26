//! Wire-JSON interop.
//!
//! Reads and writes the canonical DynamoDB JSON form, where every value is an
//! object with a single type key (`{"S":"x"}`, `{"M":{...}}`). Map members are
//! written in key order so the output is deterministic.

use std::collections::{BTreeMap, HashMap};

use crate::attribute_value::AttributeValue;

/// Renders a wire value as JSON.
pub fn marshal_json(av: &AttributeValue) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(av)
}

/// Parses a wire value from JSON.
pub fn unmarshal_json(data: &[u8]) -> Result<AttributeValue, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Renders a list of wire values as a JSON array.
pub fn marshal_list_json(items: &[AttributeValue]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(items)
}

/// Parses a JSON array of wire values.
pub fn unmarshal_list_json(data: &[u8]) -> Result<Vec<AttributeValue>, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Renders an item as a JSON object with sorted keys.
pub fn marshal_map_json(
    members: &HashMap<String, AttributeValue>,
) -> Result<Vec<u8>, serde_json::Error> {
    let sorted: BTreeMap<&str, &AttributeValue> =
        members.iter().map(|(k, v)| (k.as_str(), v)).collect();
    serde_json::to_vec(&sorted)
}

/// Parses an item from a JSON object.
pub fn unmarshal_map_json(
    data: &[u8],
) -> Result<HashMap<String, AttributeValue>, serde_json::Error> {
    serde_json::from_slice(data)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn s(v: &str) -> AttributeValue {
        AttributeValue::S(v.to_owned())
    }

    fn complex_list() -> AttributeValue {
        AttributeValue::L(vec![
            AttributeValue::B(Bytes::from_static(b"test")),
            AttributeValue::Bool(true),
            AttributeValue::Bs(vec![Bytes::from_static(b"test")]),
        ])
    }

    fn text(bytes: &[u8]) -> &str {
        std::str::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_should_marshal_each_variant() {
        let cases = [
            (AttributeValue::B(Bytes::new()), r#"{"B":null}"#),
            (AttributeValue::Bool(false), r#"{"BOOL":false}"#),
            (AttributeValue::Bs(Vec::new()), r#"{"BS":[]}"#),
            (AttributeValue::L(Vec::new()), r#"{"L":[]}"#),
            (AttributeValue::M(HashMap::new()), r#"{"M":{}}"#),
            (AttributeValue::N(String::new()), r#"{"N":""}"#),
            (AttributeValue::N("123.456".into()), r#"{"N":"123.456"}"#),
            (AttributeValue::Ns(vec!["123".into(), "456".into()]), r#"{"NS":["123","456"]}"#),
            (AttributeValue::Null(false), r#"{"NULL":false}"#),
            (s(""), r#"{"S":""}"#),
            (AttributeValue::Ss(vec!["test".into(), "foo".into()]), r#"{"SS":["test","foo"]}"#),
            (
                complex_list(),
                r#"{"L":[{"B":"dGVzdA=="},{"BOOL":true},{"BS":["dGVzdA=="]}]}"#,
            ),
        ];
        for (av, expected) in cases {
            assert_eq!(text(&marshal_json(&av).unwrap()), expected);
        }
    }

    #[test]
    fn test_should_keep_large_number_text_verbatim() {
        let raw = format!("{}.{}", i64::MAX, i64::MAX);
        let json = marshal_json(&AttributeValue::N(raw.clone())).unwrap();
        assert_eq!(text(&json), format!(r#"{{"N":"{raw}"}}"#));
    }

    #[test]
    fn test_should_unmarshal_nested_maps() {
        let input = br#"{
          "M": {
            "b": {"B": "dGVzdA=="},
            "m": {"M": {"m": {"M": {"m": {"M": {"s": {"S": "test"}}}}}}},
            "n": {"N": "1.5"},
            "null": {"NULL": true}
          }
        }"#;
        let av = unmarshal_json(input).unwrap();
        let members = av.as_m().unwrap();
        assert_eq!(members["b"], AttributeValue::B(Bytes::from_static(b"test")));
        assert_eq!(members["n"], AttributeValue::N("1.5".into()));
        let deepest = members["m"].as_m().unwrap()["m"].as_m().unwrap()["m"]
            .as_m()
            .unwrap();
        assert_eq!(deepest["s"], s("test"));

        let back = unmarshal_json(&marshal_json(&av).unwrap()).unwrap();
        assert_eq!(back, av);
    }

    #[test]
    fn test_should_reject_broken_input() {
        assert!(unmarshal_json(br#"{"L":"#).is_err());
        assert!(unmarshal_list_json(b"[").is_err());
        assert!(unmarshal_map_json(br#"["asd"]"#).is_err());
    }

    #[test]
    fn test_should_code_lists_and_maps() {
        assert_eq!(text(&marshal_list_json(&[]).unwrap()), "[]");
        assert_eq!(
            unmarshal_list_json(br#"[{"S":"test"}]"#).unwrap(),
            vec![s("test")]
        );

        assert_eq!(text(&marshal_map_json(&HashMap::new()).unwrap()), "{}");
        let members = HashMap::from([
            ("z".to_owned(), s("last")),
            ("testList".to_owned(), complex_list()),
        ]);
        assert_eq!(
            text(&marshal_map_json(&members).unwrap()),
            r#"{"testList":{"L":[{"B":"dGVzdA=="},{"BOOL":true},{"BS":["dGVzdA=="]}]},"z":{"S":"last"}}"#
        );
        assert_eq!(
            unmarshal_map_json(br#"{"test":{"S":"test"}}"#).unwrap(),
            HashMap::from([("test".to_owned(), s("test"))])
        );
    }
}
