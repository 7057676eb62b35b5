// ABOUTME: Typed update request and write summary
// ABOUTME: Carries custom-option markers as a secondary map instead of synthetic keys

use std::collections::{BTreeMap, BTreeSet};

use crate::types::SettingValue;

/// Literal a custom-option dropdown submits when the free-form field should win
pub const CUSTOM_MARKER: &str = "custom";

const CUSTOM_SUFFIX: &str = "_custom";
const FORM_PREFIX: &str = "_form_";

/// Partial settings to write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsUpdate {
    values: BTreeMap<String, SettingValue>,
    /// Original dropdown literal per custom-option key, once the custom value was applied
    form_markers: BTreeMap<String, String>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &BTreeMap<String, SettingValue> {
        &self.values
    }

    pub fn form_markers(&self) -> &BTreeMap<String, String> {
        &self.form_markers
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.form_markers.is_empty()
    }

    /// Swap `"custom"` dropdown values for their non-empty `<key>_custom` sibling,
    /// remembering the marker.
    pub fn apply_custom_options(&mut self, custom_options: &BTreeSet<String>) {
        for key in custom_options {
            let is_custom = self.values.get(key).and_then(SettingValue::as_text) == Some(CUSTOM_MARKER);
            if !is_custom {
                continue;
            }

            let sibling = self
                .values
                .get(&custom_sibling_key(key))
                .filter(|value| !value.is_empty())
                .cloned();

            if let Some(custom_value) = sibling {
                self.form_markers
                    .insert(key.clone(), CUSTOM_MARKER.to_string());
                self.values.insert(key.clone(), custom_value);
            }
        }
    }

    /// Every (storage key, value) pair to persist, markers under `_form_<key>`
    pub fn storage_entries(self) -> Vec<(String, SettingValue)> {
        let mut entries: Vec<(String, SettingValue)> = self.values.into_iter().collect();
        entries.extend(
            self.form_markers
                .into_iter()
                .map(|(key, marker)| (form_marker_key(&key), SettingValue::Text(marker))),
        );
        entries
    }
}

impl<K, V> FromIterator<(K, V)> for SettingsUpdate
where
    K: Into<String>,
    V: Into<SettingValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            form_markers: BTreeMap::new(),
        }
    }
}

impl From<BTreeMap<String, SettingValue>> for SettingsUpdate {
    fn from(values: BTreeMap<String, SettingValue>) -> Self {
        Self {
            values,
            form_markers: BTreeMap::new(),
        }
    }
}

pub fn custom_sibling_key(key: &str) -> String {
    format!("{}{}", key, CUSTOM_SUFFIX)
}

/// Storage key the custom-option marker for `key` persists under
pub fn form_marker_key(key: &str) -> String {
    format!("{}{}", FORM_PREFIX, key)
}

/// Outcome of a multi-key write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    /// Keys written to the backend
    pub written: Vec<String>,
    /// Keys dropped because they are not known defaults
    pub skipped: Vec<String>,
}
