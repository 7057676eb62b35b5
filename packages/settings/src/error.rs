// ABOUTME: Error type for settings resolution and persistence

use cairn_security::EncryptionError;
use cairn_storage::StorageError;
use thiserror::Error;

use crate::validation::ValidationReport;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("No encryption provider configured (needed for '{key}')")]
    MissingEncryptionProvider { key: String },

    #[error("Failed to serialize '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read overrides: {0}")]
    Overrides(String),

    #[error("Validation failed: {0}")]
    Validation(ValidationReport),
}

pub type SettingsResult<T> = Result<T, SettingsError>;
