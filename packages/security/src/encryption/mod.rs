// ABOUTME: Setting value encryption using ChaCha20-Poly1305 AEAD
// ABOUTME: Sealed values are base64 of nonce, ciphertext and tag
//
// A machine key is bound to the host identity. It keeps values unreadable in
// copies of the settings table, not from other users of the same host.
// A password key needs the same 32-byte salt on every run.

mod keys;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey, NONCE_LEN};
use ring::rand::SystemRandom;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::provider::EncryptionProvider;

pub use keys::{HostIdentity, SALT_LEN};
use keys::{derive_host_key, derive_password_key, random_bytes, KEY_LEN};

const TAG_LEN: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Random generation failed: {0}")]
    RandomGeneration(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Value is not a sealed setting")]
    InvalidFormat,

    #[error("Unknown encryption mode: {0}")]
    InvalidMode(String),

    #[error("Password-based encryption needs a non-empty password")]
    PasswordRequired,
}

/// Where the encryption key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMode {
    Machine,
    Password,
    /// Raw key supplied by the caller
    Static,
}

impl EncryptionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionMode::Machine => "machine",
            EncryptionMode::Password => "password",
            EncryptionMode::Static => "static",
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptionMode {
    type Err = EncryptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            EncryptionMode::Machine,
            EncryptionMode::Password,
            EncryptionMode::Static,
        ]
        .into_iter()
        .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| EncryptionError::InvalidMode(s.to_string()))
    }
}

/// Seals and opens setting values with one key
pub struct SettingsEncryption {
    key: LessSafeKey,
    rng: SystemRandom,
    mode: EncryptionMode,
}

impl fmt::Debug for SettingsEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsEncryption")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl SettingsEncryption {
    /// Key bound to this host's machine id, user and hostname
    pub fn with_machine_key() -> Result<Self, EncryptionError> {
        Self::with_host_identity(&HostIdentity::current()?)
    }

    pub fn with_host_identity(identity: &HostIdentity) -> Result<Self, EncryptionError> {
        let key = derive_host_key(identity)?;
        debug!("Derived settings key from host identity");
        Self::from_key_bytes(&key, EncryptionMode::Machine)
    }

    /// Argon2id key from a password and a [`SALT_LEN`]-byte salt
    pub fn with_password(password: &str, salt: &[u8]) -> Result<Self, EncryptionError> {
        let key = derive_password_key(password, salt)?;
        debug!("Derived settings key from password");
        Self::from_key_bytes(&key, EncryptionMode::Password)
    }

    /// Use a raw 256-bit key as is
    pub fn with_key(key: &[u8]) -> Result<Self, EncryptionError> {
        if key.len() != KEY_LEN {
            return Err(EncryptionError::KeyDerivation(format!(
                "key is {} bytes, expected {}",
                key.len(),
                KEY_LEN
            )));
        }
        Self::from_key_bytes(key, EncryptionMode::Static)
    }

    fn from_key_bytes(key: &[u8], mode: EncryptionMode) -> Result<Self, EncryptionError> {
        let unbound = UnboundKey::new(&aead::CHACHA20_POLY1305, key)
            .map_err(|_| EncryptionError::KeyDerivation("key rejected by cipher".to_string()))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
            mode,
        })
    }

    pub fn mode(&self) -> EncryptionMode {
        self.mode
    }

    /// Fresh salt for [`with_password`](Self::with_password)
    pub fn generate_salt() -> Result<Vec<u8>, EncryptionError> {
        Ok(random_bytes::<SALT_LEN>(&SystemRandom::new())?.to_vec())
    }

    /// Decode a base64 salt as stored in configuration
    pub fn decode_salt(encoded: &str) -> Result<Vec<u8>, EncryptionError> {
        BASE64
            .decode(encoded.trim())
            .map_err(|_| EncryptionError::InvalidFormat)
    }

    /// Seal `plaintext`. The empty string stays empty.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let nonce_bytes = random_bytes::<NONCE_LEN>(&self.rng)?;
        let mut sealed = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(plaintext.as_bytes());

        let tag = self
            .key
            .seal_in_place_separate_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::empty(),
                &mut sealed[NONCE_LEN..],
            )
            .map_err(|_| EncryptionError::Encryption("seal failed".to_string()))?;
        sealed.extend_from_slice(tag.as_ref());

        Ok(BASE64.encode(sealed))
    }

    /// Open a value produced by [`encrypt`](Self::encrypt). The empty string stays empty.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String, EncryptionError> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }

        let mut sealed = Self::decode_sealed(ciphertext).ok_or(EncryptionError::InvalidFormat)?;
        let (nonce_bytes, body) = sealed.split_at_mut(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| EncryptionError::InvalidFormat)?;

        let opened = self
            .key
            .open_in_place(nonce, Aad::empty(), body)
            .map_err(|_| EncryptionError::Decryption("wrong key or tampered value".to_string()))?;

        String::from_utf8(opened.to_vec())
            .map_err(|_| EncryptionError::Decryption("plaintext is not UTF-8".to_string()))
    }

    /// Whether `value` has the shape of a sealed value
    pub fn is_encrypted(value: &str) -> bool {
        Self::decode_sealed(value).is_some()
    }

    fn decode_sealed(value: &str) -> Option<Vec<u8>> {
        BASE64
            .decode(value)
            .ok()
            .filter(|bytes| bytes.len() >= NONCE_LEN + TAG_LEN)
    }
}

impl EncryptionProvider for SettingsEncryption {
    fn encode(&self, plaintext: &str) -> Result<String, EncryptionError> {
        self.encrypt(plaintext)
    }

    fn decode(&self, ciphertext: &str) -> Result<String, EncryptionError> {
        self.decrypt(ciphertext)
    }

    fn generate_identifier(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn static_encryption() -> SettingsEncryption {
        SettingsEncryption::with_key(&[7u8; 32]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let encryption = static_encryption();
        let plaintext = "smtp-password-1234567890";

        let encrypted = encryption.encrypt(plaintext).unwrap();
        assert!(!encrypted.is_empty());
        assert_ne!(encrypted, plaintext);

        let decrypted = encryption.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_encrypt_empty_string() {
        let encryption = static_encryption();
        assert_eq!(encryption.encrypt("").unwrap(), "");
        assert_eq!(encryption.decrypt("").unwrap(), "");
    }

    #[test]
    fn test_different_nonces() {
        let encryption = static_encryption();
        let plaintext = "s3-secret";

        let encrypted1 = encryption.encrypt(plaintext).unwrap();
        let encrypted2 = encryption.encrypt(plaintext).unwrap();

        assert_ne!(encrypted1, encrypted2);
        assert_eq!(encryption.decrypt(&encrypted1).unwrap(), plaintext);
        assert_eq!(encryption.decrypt(&encrypted2).unwrap(), plaintext);
    }

    #[test]
    fn test_is_encrypted() {
        let encryption = static_encryption();
        let encrypted = encryption.encrypt("s3-secret").unwrap();

        assert!(SettingsEncryption::is_encrypted(&encrypted));
        assert!(!SettingsEncryption::is_encrypted("s3-secret"));
        assert!(!SettingsEncryption::is_encrypted(""));
        assert!(!SettingsEncryption::is_encrypted("not-base64!@#"));
    }

    #[test]
    fn test_decrypt_invalid_data() {
        let encryption = static_encryption();

        assert!(encryption.decrypt("not-valid-base64!@#").is_err());
        assert!(encryption.decrypt(&BASE64.encode(b"short")).is_err());
        assert!(encryption.decrypt(&BASE64.encode(vec![0u8; 50])).is_err());
    }

    #[test]
    fn test_wrong_key_fails_decrypt() {
        let encrypted = static_encryption().encrypt("s3-secret").unwrap();
        let other = SettingsEncryption::with_key(&[9u8; 32]).unwrap();

        assert!(other.decrypt(&encrypted).is_err());
    }

    #[test]
    fn test_same_host_identity_shares_key() {
        let identity = HostIdentity {
            machine_id: "4c4c4544-0042".to_string(),
            user: "deploy".to_string(),
            hostname: "web-01".to_string(),
        };
        let sealed = SettingsEncryption::with_host_identity(&identity)
            .unwrap()
            .encrypt("db-password")
            .unwrap();

        let reopened = SettingsEncryption::with_host_identity(&identity).unwrap();
        assert_eq!(reopened.mode(), EncryptionMode::Machine);
        assert_eq!(reopened.decrypt(&sealed).unwrap(), "db-password");
    }

    #[test]
    fn test_with_key_rejects_wrong_length() {
        assert!(SettingsEncryption::with_key(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_password_encryption_roundtrip() {
        let salt = SettingsEncryption::generate_salt().unwrap();
        let encryption = SettingsEncryption::with_password("correct horse", &salt).unwrap();
        assert_eq!(encryption.mode(), EncryptionMode::Password);

        let encrypted = encryption.encrypt("ftp-password").unwrap();
        let again = SettingsEncryption::with_password("correct horse", &salt).unwrap();
        assert_eq!(again.decrypt(&encrypted).unwrap(), "ftp-password");
    }

    #[test]
    fn test_password_requires_password_and_full_salt() {
        let salt = SettingsEncryption::generate_salt().unwrap();
        assert!(matches!(
            SettingsEncryption::with_password("", &salt),
            Err(EncryptionError::PasswordRequired)
        ));
        assert!(SettingsEncryption::with_password("pw", &[0u8; 16]).is_err());
    }

    #[test]
    fn test_salt_round_trips_through_base64() {
        let salt = SettingsEncryption::generate_salt().unwrap();
        let decoded = SettingsEncryption::decode_salt(&BASE64.encode(&salt)).unwrap();
        assert_eq!(decoded, salt);
    }

    #[test]
    fn test_generate_identifier_is_unique_uuid() {
        let encryption = static_encryption();
        let a = encryption.generate_identifier();
        let b = encryption.generate_identifier();

        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn test_provider_trait_delegates() {
        let provider: &dyn EncryptionProvider = &static_encryption();
        let encoded = provider.encode("value").unwrap();
        assert_eq!(provider.decode(&encoded).unwrap(), "value");
    }

    #[rstest]
    #[case("machine", EncryptionMode::Machine)]
    #[case("PASSWORD", EncryptionMode::Password)]
    #[case("Static", EncryptionMode::Static)]
    fn test_encryption_mode_from_str(#[case] input: &str, #[case] expected: EncryptionMode) {
        assert_eq!(input.parse::<EncryptionMode>().unwrap(), expected);
    }

    #[test]
    fn test_encryption_mode_display_and_invalid() {
        assert_eq!(EncryptionMode::Machine.to_string(), "machine");
        assert_eq!(EncryptionMode::Password.to_string(), "password");
        assert!("invalid".parse::<EncryptionMode>().is_err());
    }
}
