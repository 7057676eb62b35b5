// ABOUTME: Localization provider used to render validation messages

use std::collections::HashMap;

pub trait LanguageProvider: Send + Sync {
    /// Translate a message key, returning the key itself when unknown
    fn translate(&self, key: &str) -> String;
}

/// In-memory message catalog
#[derive(Debug, Clone, Default)]
pub struct StaticLanguage {
    messages: HashMap<String, String>,
}

impl StaticLanguage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(key.into(), message.into());
        self
    }

    /// English messages for the built-in validation errors
    pub fn english() -> Self {
        Self::new()
            .with("invalid_flag", "Must be 0 or 1")
            .with("invalid_integer", "Must be a whole number in range")
            .with("invalid_enum", "Must be one of the listed options")
            .with("invalid_url", "Must be an http(s) URL")
            .with("empty_value", "A value is required")
            .with("unknown_key", "Unknown setting")
            .with("not_text", "Must be a single value")
    }
}

impl LanguageProvider for StaticLanguage {
    fn translate(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}
