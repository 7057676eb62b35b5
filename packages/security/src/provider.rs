// ABOUTME: Encryption provider trait consumed by the settings store
// ABOUTME: Symmetric encode/decode plus unique identifier generation

use crate::encryption::EncryptionError;

/// Symmetric encryption for individual setting values.
pub trait EncryptionProvider: Send + Sync {
    /// Encrypt plaintext into an opaque, storable string
    fn encode(&self, plaintext: &str) -> Result<String, EncryptionError>;

    /// Reverse of [`EncryptionProvider::encode`]
    fn decode(&self, ciphertext: &str) -> Result<String, EncryptionError>;

    /// A fresh globally unique identifier
    fn generate_identifier(&self) -> String;
}
