// ABOUTME: Persistence layer for Cairn settings tables
// ABOUTME: Backend trait plus SQLite and in-memory implementations

pub mod backend;
pub mod memory;
pub mod sqlite;
pub mod types;

use thiserror::Error;

pub use backend::SettingsBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use types::{Column, Fields, Filter, SettingRow};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Invalid table name: {0}")]
    InvalidTable(String),
    #[error("Duplicate setting key: {0}")]
    DuplicateKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Reject table identifiers that are not plain SQL identifiers.
pub fn check_table(table: &str) -> StorageResult<()> {
    if cairn_config::config::is_valid_table_name(table) {
        Ok(())
    } else {
        Err(StorageError::InvalidTable(table.to_string()))
    }
}
