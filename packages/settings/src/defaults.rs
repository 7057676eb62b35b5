// ABOUTME: Global baseline settings shared by every settings domain
// ABOUTME: Default merging and the keys overrides may never touch

use std::collections::BTreeMap;

use crate::types::SettingValue;

pub const API_KEY: &str = "api_key";
pub const API_SECRET: &str = "api_secret";
pub const LICENSE_CHECK: &str = "license_check";
pub const LICENSE_STATUS: &str = "license_status";

/// Keys that overrides are never applied to
pub const OVERRIDE_EXCLUSIONS: [&str; 2] = [LICENSE_CHECK, LICENSE_STATUS];

const GLOBAL_DEFAULTS: [(&str, &str); 9] = [
    ("date_format", "M d, Y, h:i:sA"),
    ("relative_time", "1"),
    ("enable_rest_api", "0"),
    (API_KEY, ""),
    (API_SECRET, ""),
    ("api_debug", "0"),
    ("license_number", ""),
    (LICENSE_CHECK, "0"),
    (LICENSE_STATUS, ""),
];

/// Baseline settings present regardless of domain defaults
pub fn global_defaults() -> BTreeMap<String, SettingValue> {
    GLOBAL_DEFAULTS
        .iter()
        .map(|(key, value)| (key.to_string(), SettingValue::from(*value)))
        .collect()
}

pub fn is_override_excluded(key: &str) -> bool {
    OVERRIDE_EXCLUSIONS.contains(&key)
}

/// Merge defaults, highest precedence first: `existing` > `supplied` > globals
pub fn merge_defaults(
    existing: BTreeMap<String, SettingValue>,
    supplied: impl IntoIterator<Item = (String, SettingValue)>,
) -> BTreeMap<String, SettingValue> {
    let mut merged = global_defaults();
    merged.extend(supplied);
    merged.extend(existing);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_defaults_shape() {
        let defaults = global_defaults();
        assert_eq!(defaults.len(), 9);
        assert_eq!(defaults["relative_time"], SettingValue::from("1"));
        assert_eq!(defaults[API_KEY], SettingValue::from(""));
    }

    #[test]
    fn test_merge_precedence() {
        let existing = BTreeMap::from([("date_format".to_string(), SettingValue::from("Y-m-d"))]);
        let supplied = vec![
            ("date_format".to_string(), SettingValue::from("M d, Y")),
            ("relative_time".to_string(), SettingValue::from("0")),
            ("backup_dir".to_string(), SettingValue::from("/var/backups")),
        ];

        let merged = merge_defaults(existing, supplied);

        assert_eq!(merged["date_format"], SettingValue::from("Y-m-d"));
        assert_eq!(merged["relative_time"], SettingValue::from("0"));
        assert_eq!(merged["backup_dir"], SettingValue::from("/var/backups"));
        assert_eq!(merged["enable_rest_api"], SettingValue::from("0"));
        assert_eq!(merged.len(), 10);
    }

    #[test]
    fn test_exclusions() {
        assert!(is_override_excluded("license_check"));
        assert!(is_override_excluded("license_status"));
        assert!(!is_override_excluded("license_number"));
    }
}
