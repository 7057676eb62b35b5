// ABOUTME: Encryption for settings stored at rest
// ABOUTME: Provider trait plus a ChaCha20-Poly1305 implementation

pub mod encryption;
pub mod provider;

pub use encryption::{EncryptionError, EncryptionMode, HostIdentity, SettingsEncryption, SALT_LEN};
pub use provider::EncryptionProvider;
