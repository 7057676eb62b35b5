// ABOUTME: Builds a settings store for one table from config and flags
// ABOUTME: Also parses key=value arguments and formats values for display

use std::sync::Arc;

use cairn_config::config::is_valid_table_name;
use cairn_config::{ConfigError, EncryptionConfig, SettingsConfig};
use cairn_security::SettingsEncryption;
use cairn_settings::{
    KeyPolicies, Overrides, RuleValidator, SettingValue, SettingsStore, SettingsUpdate,
    StaticLanguage,
};
use cairn_storage::SqliteBackend;
use tracing::debug;

use crate::error::{CliError, CliResult};

const MASK: &str = "********";

/// Per-invocation choices layered over [`SettingsConfig`]
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    pub database_url: Option<String>,
    pub table: Option<String>,
    /// Extra `key=value` defaults on top of the global set
    pub defaults: Vec<String>,
    pub serialized: Vec<String>,
    pub encrypted: Vec<String>,
    pub new_lines: Vec<String>,
}

/// Connect to the configured database and build a store for one table
pub async fn open_store(
    config: &SettingsConfig,
    options: &StoreOptions,
) -> CliResult<SettingsStore<RuleValidator>> {
    let database_url = options
        .database_url
        .clone()
        .unwrap_or_else(|| config.database_url.clone());
    let table = options.table.clone().unwrap_or_else(|| config.table.clone());
    if !is_valid_table_name(&table) {
        return Err(ConfigError::InvalidTable(table).into());
    }

    let backend = SqliteBackend::connect(&database_url).await?;
    backend.ensure_table(&table).await?;

    let defaults = parse_assignments(&options.defaults, &options.serialized)?;
    let overrides = load_overrides(config)?;
    let encryption = build_encryption(&config.encryption)?;
    debug!(
        "Opening settings table {} with {} encryption",
        table,
        encryption.mode()
    );

    let mut store = SettingsStore::new(
        Arc::new(backend),
        Arc::new(StaticLanguage::english()),
        RuleValidator::global(),
    );
    store
        .set_table(table)
        .set_defaults(defaults.values().clone())
        .set_serialized(options.serialized.iter().cloned())
        .set_encrypted(options.encrypted.iter().cloned())
        .set_new_lines(options.new_lines.iter().cloned())
        .set_overrides(overrides)
        .set_encrypt(Arc::new(encryption));

    Ok(store)
}

pub fn build_encryption(config: &EncryptionConfig) -> CliResult<SettingsEncryption> {
    let encryption = match config {
        EncryptionConfig::Machine => SettingsEncryption::with_machine_key()?,
        EncryptionConfig::Password { password, salt } => {
            let salt = SettingsEncryption::decode_salt(salt)?;
            SettingsEncryption::with_password(password, &salt)?
        }
    };
    Ok(encryption)
}

/// File overrides first, environment variables on top
pub fn load_overrides(config: &SettingsConfig) -> CliResult<Overrides> {
    let from_file = match &config.overrides_file {
        Some(path) => Overrides::from_file(path)?,
        None => Overrides::new(),
    };
    Ok(from_file.merge(Overrides::from_env_prefix(&config.override_prefix)))
}

/// Parse `key=value` arguments. Values of `list_keys` are split on commas.
pub fn parse_assignments(pairs: &[String], list_keys: &[String]) -> CliResult<SettingsUpdate> {
    let mut update = SettingsUpdate::new();

    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| CliError::InvalidAssignment(pair.clone()))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(CliError::InvalidAssignment(pair.clone()));
        }

        if list_keys.iter().any(|k| k == key) {
            let items: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
            update.insert(key, items);
        } else {
            update.insert(key, value);
        }
    }

    Ok(update)
}

/// Render a resolved value, hiding encrypted keys
pub fn display_value(key: &str, value: &SettingValue, policies: &KeyPolicies) -> String {
    if policies.is_encrypted(key) && !value.is_empty() {
        return MASK.to_string();
    }
    value.to_string()
}
