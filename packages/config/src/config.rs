// ABOUTME: Runtime configuration loaded from the environment
// ABOUTME: Database location, settings table, override sources and encryption inputs

use std::env;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid database URL: {0}. Must start with 'sqlite:'")]
    InvalidDatabaseUrl(String),
    #[error("Invalid table name: {0}")]
    InvalidTable(String),
    #[error("{0} is set but {1} is missing")]
    IncompleteEncryption(&'static str, &'static str),
}

/// How the encryption key should be derived
#[derive(Debug, Clone, PartialEq)]
pub enum EncryptionConfig {
    Machine,
    Password { password: String, salt: String },
}

#[derive(Debug, Clone)]
pub struct SettingsConfig {
    pub database_url: String,
    pub table: String,
    pub overrides_file: Option<PathBuf>,
    pub override_prefix: String,
    pub encryption: EncryptionConfig,
}

impl SettingsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url =
            env::var(CAIRN_DATABASE_URL).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        if !database_url.starts_with("sqlite:") {
            return Err(ConfigError::InvalidDatabaseUrl(database_url));
        }

        let table =
            env::var(CAIRN_SETTINGS_TABLE).unwrap_or_else(|_| DEFAULT_SETTINGS_TABLE.to_string());
        if !is_valid_table_name(&table) {
            return Err(ConfigError::InvalidTable(table));
        }

        let overrides_file = env::var(CAIRN_OVERRIDES_FILE)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let override_prefix = env::var(CAIRN_OVERRIDE_PREFIX)
            .unwrap_or_else(|_| DEFAULT_OVERRIDE_PREFIX.to_string());

        let encryption = match (
            env::var(CAIRN_ENCRYPTION_PASSWORD).ok(),
            env::var(CAIRN_ENCRYPTION_SALT).ok(),
        ) {
            (Some(password), Some(salt)) => EncryptionConfig::Password { password, salt },
            (Some(_), None) => {
                return Err(ConfigError::IncompleteEncryption(
                    CAIRN_ENCRYPTION_PASSWORD,
                    CAIRN_ENCRYPTION_SALT,
                ))
            }
            (None, Some(_)) => {
                return Err(ConfigError::IncompleteEncryption(
                    CAIRN_ENCRYPTION_SALT,
                    CAIRN_ENCRYPTION_PASSWORD,
                ))
            }
            (None, None) => EncryptionConfig::Machine,
        };

        debug!(
            "Loaded settings config: database={}, table={}",
            database_url, table
        );

        Ok(Self {
            database_url,
            table,
            overrides_file,
            override_prefix,
            encryption,
        })
    }
}

/// Table names end up inside SQL text, so only plain identifiers are accepted
pub fn is_valid_table_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 64 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
