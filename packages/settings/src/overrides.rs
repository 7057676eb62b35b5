// ABOUTME: Forced setting values from the environment or a config file
// ABOUTME: Overrides beat stored values and defaults, except for excluded keys

use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{SettingsError, SettingsResult};
use crate::types::SettingValue;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides(BTreeMap<String, SettingValue>);

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect `<prefix><KEY>` environment variables as `key` overrides
    pub fn from_env_prefix(prefix: &str) -> Self {
        Self::from_vars(prefix, env::vars())
    }

    fn from_vars(prefix: &str, vars: impl Iterator<Item = (String, String)>) -> Self {
        let overrides: BTreeMap<String, SettingValue> = vars
            .filter_map(|(name, value)| {
                let key = name.strip_prefix(prefix)?;
                if key.is_empty() {
                    return None;
                }
                Some((key.to_lowercase(), SettingValue::Text(value)))
            })
            .collect();

        debug!(
            "Loaded {} setting overrides from environment prefix {}",
            overrides.len(),
            prefix
        );
        Self(overrides)
    }

    /// Read a JSON object of key to string, array or object
    pub fn from_file(path: &Path) -> SettingsResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::Overrides(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let raw: BTreeMap<String, Value> = serde_json::from_str(&contents).map_err(|e| {
            SettingsError::Overrides(format!("Invalid overrides in {}: {}", path.display(), e))
        })?;

        let overrides: BTreeMap<String, SettingValue> = raw
            .into_iter()
            .map(|(key, value)| (key, json_to_value(value)))
            .collect();

        info!(
            "Loaded {} setting overrides from {}",
            overrides.len(),
            path.display()
        );
        Ok(Self(overrides))
    }

    /// Layer `other` on top of `self`; `other` wins on conflicts
    pub fn merge(mut self, other: Overrides) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.0.get(key)
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

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Overrides
where
    K: Into<String>,
    V: Into<SettingValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, SettingValue>> for Overrides {
    fn from(map: BTreeMap<String, SettingValue>) -> Self {
        Self(map)
    }
}

fn json_to_value(value: Value) -> SettingValue {
    fn text(value: Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    match value {
        Value::Array(items) => SettingValue::List(items.into_iter().map(text).collect()),
        Value::Object(entries) => {
            SettingValue::Map(entries.into_iter().map(|(k, v)| (k, text(v))).collect())
        }
        scalar => SettingValue::Text(text(scalar)),
    }
}
