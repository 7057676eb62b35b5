// ABOUTME: Configuration for the Cairn settings store
// ABOUTME: Environment variable names and environment-driven runtime config

pub mod config;
pub mod constants;

pub use config::{ConfigError, EncryptionConfig, SettingsConfig};
