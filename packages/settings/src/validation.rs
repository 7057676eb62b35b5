// ABOUTME: Input validation for settings updates
// ABOUTME: Validator trait plus rule-based checks for flags, integers, enums and URLs

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::language::LanguageProvider;
use crate::types::SettingValue;
use crate::update::SettingsUpdate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid flag value: {0}. Must be '0' or '1'")]
    InvalidFlag(String),

    #[error("Invalid integer value: {0}. {1}")]
    InvalidInteger(String, String),

    #[error("Invalid enum value: {0}. Must be one of: {1}")]
    InvalidEnum(String, String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Value cannot be empty")]
    EmptyValue,

    #[error("Unknown setting key: {0}")]
    UnknownKey(String),

    #[error("Expected a single value, got a list")]
    NotText,
}

impl ValidationError {
    /// Message catalog key for localized rendering
    pub fn message_key(&self) -> &'static str {
        match self {
            ValidationError::InvalidFlag(_) => "invalid_flag",
            ValidationError::InvalidInteger(_, _) => "invalid_integer",
            ValidationError::InvalidEnum(_, _) => "invalid_enum",
            ValidationError::InvalidUrl(_) => "invalid_url",
            ValidationError::EmptyValue => "empty_value",
            ValidationError::UnknownKey(_) => "unknown_key",
            ValidationError::NotText => "not_text",
        }
    }
}

/// A validation failure tied to one setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub key: String,
    pub error: ValidationError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, error: ValidationError) {
        self.0.push(FieldError {
            key: key.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn for_key(&self, key: &str) -> Option<&ValidationError> {
        self.0.iter().find(|e| e.key == key).map(|e| &e.error)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Validation rules for a concrete settings domain.
///
/// `data` is borrowed immutably; validators must not have side effects.
pub trait SettingsValidator: Send + Sync {
    fn validate(
        &self,
        data: &SettingsUpdate,
        extra: &BTreeMap<String, String>,
    ) -> Result<(), ValidationErrors>;
}

/// Accepts everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopValidator;

impl SettingsValidator for NoopValidator {
    fn validate(
        &self,
        _data: &SettingsUpdate,
        _extra: &BTreeMap<String, String>,
    ) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingRule {
    /// "0" or "1"
    Flag,
    Integer { min: Option<i64>, max: Option<i64> },
    OneOf(Vec<String>),
    Url,
    NonEmpty,
    Any,
}

/// Table-driven validator keyed by setting name
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    rules: BTreeMap<String, SettingRule>,
    reject_unknown: bool,
}

impl RuleValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules for the global baseline settings
    pub fn global() -> Self {
        Self::new()
            .rule("date_format", SettingRule::NonEmpty)
            .rule("relative_time", SettingRule::Flag)
            .rule("enable_rest_api", SettingRule::Flag)
            .rule("api_debug", SettingRule::Flag)
            .rule("license_check", SettingRule::Flag)
            .rule("api_key", SettingRule::Any)
            .rule("api_secret", SettingRule::Any)
            .rule("license_number", SettingRule::Any)
            .rule("license_status", SettingRule::Any)
    }

    pub fn rule(mut self, key: impl Into<String>, rule: SettingRule) -> Self {
        self.rules.insert(key.into(), rule);
        self
    }

    /// Report keys that have no rule
    pub fn reject_unknown(mut self) -> Self {
        self.reject_unknown = true;
        self
    }

    fn check(&self, key: &str, value: &SettingValue) -> Result<(), ValidationError> {
        let Some(rule) = self.rules.get(key) else {
            if self.reject_unknown {
                return Err(ValidationError::UnknownKey(key.to_string()));
            }
            return Ok(());
        };

        if *rule == SettingRule::Any {
            return Ok(());
        }

        let text = value.as_text().ok_or(ValidationError::NotText)?;
        match rule {
            SettingRule::Flag => validate_flag(text),
            SettingRule::Integer { min, max } => validate_integer(text, *min, *max),
            SettingRule::OneOf(allowed) => validate_enum(text, allowed),
            SettingRule::Url => validate_url(text),
            SettingRule::NonEmpty => validate_non_empty(text),
            SettingRule::Any => Ok(()),
        }
    }
}

impl SettingsValidator for RuleValidator {
    fn validate(
        &self,
        data: &SettingsUpdate,
        _extra: &BTreeMap<String, String>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (key, value) in data.values() {
            if let Err(error) = self.check(key, value) {
                errors.push(key.as_str(), error);
            }
        }
        errors.into_result()
    }
}

/// A validation error rendered for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedError {
    pub key: String,
    pub message: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport(pub Vec<LocalizedError>);

impl ValidationReport {
    pub fn localize(errors: &ValidationErrors, language: &dyn LanguageProvider) -> Self {
        Self(
            errors
                .iter()
                .map(|field| LocalizedError {
                    key: field.key.clone(),
                    message: language.translate(field.error.message_key()),
                    detail: field.error.to_string(),
                })
                .collect(),
        )
    }

    pub fn for_key(&self, key: &str) -> Option<&LocalizedError> {
        self.0.iter().find(|e| e.key == key)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.key, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn validate_flag(value: &str) -> Result<(), ValidationError> {
    match value {
        "0" | "1" => Ok(()),
        _ => Err(ValidationError::InvalidFlag(value.to_string())),
    }
}

/// Validate integer value with optional min/max bounds
fn validate_integer(
    value: &str,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<(), ValidationError> {
    let parsed = value.parse::<i64>().map_err(|_| {
        ValidationError::InvalidInteger(value.to_string(), "Not a valid integer".to_string())
    })?;

    if let Some(min_val) = min {
        if parsed < min_val {
            return Err(ValidationError::InvalidInteger(
                value.to_string(),
                format!("Must be >= {}", min_val),
            ));
        }
    }

    if let Some(max_val) = max {
        if parsed > max_val {
            return Err(ValidationError::InvalidInteger(
                value.to_string(),
                format!("Must be <= {}", max_val),
            ));
        }
    }

    Ok(())
}

fn validate_enum(value: &str, allowed: &[String]) -> Result<(), ValidationError> {
    if allowed.iter().any(|a| a == value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEnum(
            value.to_string(),
            allowed.join(", "),
        ))
    }
}

/// Validate URL (basic check)
fn validate_url(value: &str) -> Result<(), ValidationError> {
    if !value.starts_with("http://") && !value.starts_with("https://") {
        return Err(ValidationError::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    if value.contains(' ') {
        return Err(ValidationError::InvalidUrl(
            "URL cannot contain spaces".to_string(),
        ));
    }

    Ok(())
}

fn validate_non_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyValue)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::StaticLanguage;

    #[test]
    fn test_validate_flag() {
        assert!(validate_flag("0").is_ok());
        assert!(validate_flag("1").is_ok());
        assert!(validate_flag("true").is_err());
        assert!(validate_flag("2").is_err());
        assert!(validate_flag("").is_err());
    }

    #[test]
    fn test_validate_integer() {
        assert!(validate_integer("123", None, None).is_ok());
        assert!(validate_integer("-1", None, None).is_ok());
        assert!(validate_integer("abc", None, None).is_err());
        assert!(validate_integer("0", Some(1), None).is_err());
        assert!(validate_integer("11", None, Some(10)).is_err());
        assert!(validate_integer("10", None, Some(10)).is_ok());
    }

    #[test]
    fn test_validate_enum() {
        let allowed = vec!["local".to_string(), "s3".to_string()];
        assert!(validate_enum("local", &allowed).is_ok());
        assert!(validate_enum("S3", &allowed).is_err());
    }

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/hook").is_ok());
        assert!(validate_url("http://localhost:3000").is_ok());
        assert!(validate_url("ftp://example.com").is_err());
        assert!(validate_url("https://example.com/path with spaces").is_err());
    }

    #[test]
    fn test_global_rules() {
        let validator = RuleValidator::global();
        let data = SettingsUpdate::new()
            .set("relative_time", "yes")
            .set("date_format", "  ")
            .set("api_key", "")
            .set("backup_dir", "/var/backups");

        let errors = validator.validate(&data, &BTreeMap::new()).unwrap_err();

        assert_eq!(errors.len(), 2);
        assert!(matches!(
            errors.for_key("relative_time"),
            Some(ValidationError::InvalidFlag(_))
        ));
        assert_eq!(errors.for_key("date_format"), Some(&ValidationError::EmptyValue));
    }

    #[test]
    fn test_reject_unknown_keys() {
        let validator = RuleValidator::global().reject_unknown();
        let data = SettingsUpdate::new().set("my_bad_key", "0");

        let errors = validator.validate(&data, &BTreeMap::new()).unwrap_err();
        assert!(matches!(
            errors.for_key("my_bad_key"),
            Some(ValidationError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_list_value_against_text_rule() {
        let validator = RuleValidator::new().rule("retention", SettingRule::Integer {
            min: Some(1),
            max: None,
        });
        let data = SettingsUpdate::new().set("retention", vec!["1", "2"]);

        let errors = validator.validate(&data, &BTreeMap::new()).unwrap_err();
        assert_eq!(errors.for_key("retention"), Some(&ValidationError::NotText));
    }

    #[test]
    fn test_noop_validator_accepts_everything() {
        let data = SettingsUpdate::new().set("anything", "goes");
        assert!(NoopValidator.validate(&data, &BTreeMap::new()).is_ok());
    }

    #[test]
    fn test_report_localizes_messages() {
        let mut errors = ValidationErrors::new();
        errors.push("api_debug", ValidationError::InvalidFlag("x".to_string()));

        let report = ValidationReport::localize(&errors, &StaticLanguage::english());
        let entry = report.for_key("api_debug").unwrap();

        assert_eq!(entry.message, "Must be 0 or 1");
        assert!(entry.detail.contains("'0' or '1'"));
        assert_eq!(report.to_string(), "api_debug: Must be 0 or 1");
    }
}
