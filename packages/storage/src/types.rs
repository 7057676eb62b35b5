// ABOUTME: Row, column and filter types for settings tables
// ABOUTME: Logical row shape is { setting_key, setting_value, serialized }

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One persisted setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRow {
    pub setting_key: String,
    pub setting_value: Option<String>,
    pub serialized: bool,
}

impl SettingRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            setting_key: key.into(),
            setting_value: None,
            serialized: false,
        }
    }

    /// Stored value, with NULL read as empty
    pub fn value(&self) -> &str {
        self.setting_value.as_deref().unwrap_or("")
    }

    /// Apply a set of fields to this row
    pub(crate) fn apply(&mut self, fields: &Fields) {
        for (column, value) in fields.iter() {
            match column {
                Column::SettingKey => {
                    if let Some(key) = value {
                        self.setting_key = key.clone();
                    }
                }
                Column::SettingValue => self.setting_value = value.clone(),
                Column::Serialized => self.serialized = value.as_deref() == Some("1"),
            }
        }
    }
}

/// Columns of a settings table. Column names never come from caller strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    SettingKey,
    SettingValue,
    Serialized,
}

impl Column {
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::SettingKey => "setting_key",
            Column::SettingValue => "setting_value",
            Column::Serialized => "serialized",
        }
    }
}

/// Exact-match equality on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: Column,
    pub value: String,
}

impl Filter {
    pub fn key(key: impl Into<String>) -> Self {
        Self {
            column: Column::SettingKey,
            value: key.into(),
        }
    }

    pub fn matches(&self, row: &SettingRow) -> bool {
        match self.column {
            Column::SettingKey => row.setting_key == self.value,
            Column::SettingValue => row.setting_value.as_deref() == Some(self.value.as_str()),
            Column::Serialized => (if row.serialized { "1" } else { "0" }) == self.value,
        }
    }
}

/// Column values for insert/update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(BTreeMap<Column, Option<String>>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: Column, value: Option<String>) -> Self {
        self.0.insert(column, value);
        self
    }

    pub fn set(&mut self, column: Column, value: Option<String>) {
        self.0.insert(column, value);
    }

    pub fn get(&self, column: Column) -> Option<&Option<String>> {
        self.0.get(&column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Column, &Option<String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_key_only() {
        let row = SettingRow {
            setting_key: "date_format".to_string(),
            setting_value: Some("M d, Y".to_string()),
            serialized: false,
        };

        assert!(Filter::key("date_format").matches(&row));
        assert!(!Filter::key("date").matches(&row));
    }

    #[test]
    fn test_apply_fields() {
        let mut row = SettingRow::new("exclude_paths");
        row.apply(
            &Fields::new()
                .with(Column::SettingValue, Some("[\"a\"]".to_string()))
                .with(Column::Serialized, Some("1".to_string())),
        );

        assert_eq!(row.value(), "[\"a\"]");
        assert!(row.serialized);
        assert_eq!(row.setting_key, "exclude_paths");
    }

    #[test]
    fn test_null_value_reads_as_empty() {
        assert_eq!(SettingRow::new("api_key").value(), "");
    }
}
