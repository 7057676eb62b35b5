use cairn_config::ConfigError;
use cairn_security::EncryptionError;
use cairn_settings::SettingsError;
use cairn_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Encryption setup failed: {0}")]
    Encryption(#[from] EncryptionError),

    #[error("Invalid assignment '{0}', expected <key>=<value>")]
    InvalidAssignment(String),
}

pub type CliResult<T> = Result<T, CliError>;
