// ABOUTME: Encoding of structured and textarea-style setting values
// ABOUTME: JSON blobs for serialized keys, line splitting for newline keys

use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::SettingValue;

/// Encode a value as a structured blob. Text is wrapped in a one-element list.
pub fn serialize(value: &SettingValue) -> Result<String, serde_json::Error> {
    match value {
        SettingValue::Text(text) => serde_json::to_string(&[text]),
        SettingValue::List(items) => serde_json::to_string(items),
        SettingValue::Map(map) => serde_json::to_string(map),
    }
}

/// Decode a structured blob, dropping elements that are empty strings.
///
/// Arrays keep their order, objects keep their keys. A bare scalar blob is
/// read as a one-element list.
pub fn deserialize(blob: &str) -> Result<SettingValue, serde_json::Error> {
    let value: Value = serde_json::from_str(blob)?;

    let decoded = match value {
        Value::Array(items) => SettingValue::List(
            items
                .into_iter()
                .map(scalar_text)
                .filter(|item| !item.is_empty())
                .collect(),
        ),
        Value::Object(entries) => SettingValue::Map(
            entries
                .into_iter()
                .map(|(key, item)| (key, scalar_text(item)))
                .filter(|(_, item)| !item.is_empty())
                .collect::<BTreeMap<_, _>>(),
        ),
        scalar => {
            let text = scalar_text(scalar);
            SettingValue::List(if text.is_empty() { vec![] } else { vec![text] })
        }
    };

    Ok(decoded)
}

/// Split textarea text into trimmed, non-empty lines
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

fn scalar_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_serialize_wraps_scalar() {
        assert_eq!(serialize(&SettingValue::from("a")).unwrap(), "[\"a\"]");
    }

    #[test]
    fn test_deserialize_drops_blank_entries() {
        let value = deserialize("[\"a\", \"\", \"b\", null]").unwrap();
        assert_eq!(value, SettingValue::from(vec!["a", "b"]));
    }

    #[test]
    fn test_deserialize_map_keeps_keys() {
        let value = deserialize("{\"host\": \"db\", \"port\": 3306, \"user\": \"\"}").unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["host"], "db");
        assert_eq!(map["port"], "3306");
    }

    #[test]
    fn test_deserialize_scalar_blob() {
        assert_eq!(deserialize("\"x\"").unwrap(), SettingValue::from(vec!["x"]));
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(deserialize("a:1:{i:0;s:1:\"x\";}").is_err());
    }

    #[test]
    fn test_split_lines() {
        let lines = split_lines("  /var/www \r\n\n/home/user\n   \n/tmp");
        assert_eq!(lines, vec!["/var/www", "/home/user", "/tmp"]);
    }

    #[test]
    fn test_split_lines_empty() {
        assert!(split_lines("").is_empty());
    }
}
