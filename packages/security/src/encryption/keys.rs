// ABOUTME: Key derivation for settings encryption
// ABOUTME: HKDF over host identity, Argon2id over a password, and salt generation

use argon2::{Algorithm, Argon2, ParamsBuilder, Version};
use ring::hkdf;
use ring::rand::{SecureRandom, SystemRandom};

use super::EncryptionError;

pub(crate) const KEY_LEN: usize = 32;
pub const SALT_LEN: usize = 32;

const HKDF_SALT: &[u8] = b"cairn-settings-hkdf-salt";
const HKDF_INFO: &[u8] = b"cairn-settings-value-key-v1";

// Argon2id cost: 64 MiB, 3 passes, 4 lanes
const ARGON_MEMORY_KIB: u32 = 64 * 1024;
const ARGON_PASSES: u32 = 3;
const ARGON_LANES: u32 = 4;

/// What a machine key is bound to. Any change produces a different key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub machine_id: String,
    pub user: String,
    pub hostname: String,
}

impl HostIdentity {
    pub fn current() -> Result<Self, EncryptionError> {
        let machine_id = machine_uid::get()
            .map_err(|e| EncryptionError::KeyDerivation(format!("machine id unavailable: {}", e)))?;
        let hostname = hostname::get()
            .map_err(|e| EncryptionError::KeyDerivation(format!("hostname unavailable: {}", e)))?
            .to_string_lossy()
            .into_owned();
        let user = ["USER", "USERNAME"]
            .iter()
            .find_map(|name| std::env::var(name).ok())
            .unwrap_or_default();

        Ok(Self {
            machine_id,
            user,
            hostname,
        })
    }

    /// Length-prefixed fields, so ("ab", "c") and ("a", "bc") never collide
    fn key_material(&self) -> Vec<u8> {
        let mut material = Vec::new();
        for part in [&self.machine_id, &self.user, &self.hostname] {
            material.extend_from_slice(&(part.len() as u32).to_be_bytes());
            material.extend_from_slice(part.as_bytes());
        }
        material
    }
}

struct KeyLen;

impl hkdf::KeyType for KeyLen {
    fn len(&self) -> usize {
        KEY_LEN
    }
}

pub(crate) fn derive_host_key(identity: &HostIdentity) -> Result<[u8; KEY_LEN], EncryptionError> {
    let prk = hkdf::Salt::new(hkdf::HKDF_SHA256, HKDF_SALT).extract(&identity.key_material());

    let mut key = [0u8; KEY_LEN];
    prk.expand(&[HKDF_INFO], KeyLen)
        .and_then(|okm| okm.fill(&mut key))
        .map_err(|_| EncryptionError::KeyDerivation("HKDF expand failed".to_string()))?;
    Ok(key)
}

pub(crate) fn derive_password_key(
    password: &str,
    salt: &[u8],
) -> Result<[u8; KEY_LEN], EncryptionError> {
    if password.is_empty() {
        return Err(EncryptionError::PasswordRequired);
    }
    if salt.len() != SALT_LEN {
        return Err(EncryptionError::KeyDerivation(format!(
            "salt is {} bytes, expected {}",
            salt.len(),
            SALT_LEN
        )));
    }

    let params = ParamsBuilder::new()
        .m_cost(ARGON_MEMORY_KIB)
        .t_cost(ARGON_PASSES)
        .p_cost(ARGON_LANES)
        .output_len(KEY_LEN)
        .build()
        .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;

    let mut key = [0u8; KEY_LEN];
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

pub(crate) fn random_bytes<const N: usize>(rng: &SystemRandom) -> Result<[u8; N], EncryptionError> {
    let mut bytes = [0u8; N];
    rng.fill(&mut bytes)
        .map_err(|_| EncryptionError::RandomGeneration(format!("{} random bytes", N)))?;
    Ok(bytes)
}
