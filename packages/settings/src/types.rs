// ABOUTME: Value types for resolved settings
// ABOUTME: Text, list and map values plus the cached resolved view

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single setting value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
}

impl SettingValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            SettingValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Empty text, list or map
    pub fn is_empty(&self) -> bool {
        match self {
            SettingValue::Text(s) => s.is_empty(),
            SettingValue::List(items) => items.is_empty(),
            SettingValue::Map(map) => map.is_empty(),
        }
    }

    pub fn is_collection(&self) -> bool {
        !matches!(self, SettingValue::Text(_))
    }
}

impl Default for SettingValue {
    fn default() -> Self {
        SettingValue::Text(String::new())
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Text(s) => write!(f, "{}", s),
            SettingValue::List(items) => write!(f, "{}", items.join(", ")),
            SettingValue::Map(map) => {
                let pairs: Vec<String> = map.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{}", pairs.join(", "))
            }
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Text(value)
    }
}

impl From<Vec<String>> for SettingValue {
    fn from(value: Vec<String>) -> Self {
        SettingValue::List(value)
    }
}

impl From<Vec<&str>> for SettingValue {
    fn from(value: Vec<&str>) -> Self {
        SettingValue::List(value.into_iter().map(String::from).collect())
    }
}

impl From<BTreeMap<String, String>> for SettingValue {
    fn from(value: BTreeMap<String, String>) -> Self {
        SettingValue::Map(value)
    }
}

/// Fully merged, decoded view of every setting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResolvedSettings(BTreeMap<String, SettingValue>);

impl ResolvedSettings {
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
    }

    /// Text value of `key`, if it is text
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(SettingValue::as_text)
    }

    /// List value of `key`, if it is a list
    pub fn list(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).and_then(SettingValue::as_list)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, key: String, value: SettingValue) {
        self.0.insert(key, value);
    }
}

impl From<BTreeMap<String, SettingValue>> for ResolvedSettings {
    fn from(map: BTreeMap<String, SettingValue>) -> Self {
        Self(map)
    }
}

impl IntoIterator for ResolvedSettings {
    type Item = (String, SettingValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, SettingValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_serde_shapes() {
        let text: SettingValue = serde_json::from_str("\"M d, Y\"").unwrap();
        assert_eq!(text, SettingValue::from("M d, Y"));

        let list: SettingValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(list, SettingValue::from(vec!["a", "b"]));

        let map: SettingValue = serde_json::from_str("{\"host\":\"x\"}").unwrap();
        assert_eq!(map.as_map().unwrap().get("host").unwrap(), "x");
    }

    #[test]
    fn test_emptiness() {
        assert!(SettingValue::from("").is_empty());
        assert!(SettingValue::List(vec![]).is_empty());
        assert!(!SettingValue::from("0").is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(SettingValue::from(vec!["a", "b"]).to_string(), "a, b");
    }
}
