// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across Cairn

// Database
pub const CAIRN_DATABASE_URL: &str = "CAIRN_DATABASE_URL";
pub const CAIRN_SETTINGS_TABLE: &str = "CAIRN_SETTINGS_TABLE";

// Overrides
pub const CAIRN_OVERRIDES_FILE: &str = "CAIRN_OVERRIDES_FILE";
pub const CAIRN_OVERRIDE_PREFIX: &str = "CAIRN_OVERRIDE_PREFIX";

// Encryption
pub const CAIRN_ENCRYPTION_PASSWORD: &str = "CAIRN_ENCRYPTION_PASSWORD";
pub const CAIRN_ENCRYPTION_SALT: &str = "CAIRN_ENCRYPTION_SALT"; // base64, 32 bytes

// Defaults applied when the variables above are unset
pub const DEFAULT_DATABASE_URL: &str = "sqlite:cairn.db";
pub const DEFAULT_SETTINGS_TABLE: &str = "cairn_settings";
pub const DEFAULT_OVERRIDE_PREFIX: &str = "CAIRN_SETTING_";
