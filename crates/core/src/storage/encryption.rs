use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

pub const SALT_LEN: usize = 16;
pub const NONCE_LEN: usize = 12;
pub const KEY_LEN: usize = 32;

/// Argon2id cost parameters, written into every snapshot header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65_536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }
}

impl KdfParams {
    /// Bounds accepted when reading a file. A crafted header must not be
    /// able to demand gigabytes of memory or minutes of hashing.
    pub fn validate(&self) -> Result<(), CoreError> {
        let checks = [
            ("memory_cost", self.memory_cost, 8, 1_048_576),
            ("time_cost", self.time_cost, 1, 20),
            ("parallelism", self.parallelism, 1, 16),
        ];
        for (field, value, min, max) in checks {
            if !(min..=max).contains(&value) {
                return Err(CoreError::InvalidFileFormat(format!(
                    "KDF {field} out of safe range: {value} (expected {min}..={max})"
                )));
            }
        }
        Ok(())
    }

    fn hasher(&self) -> Result<Argon2<'static>, CoreError> {
        let params = Params::new(
            self.memory_cost,
            self.time_cost,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// AES-256-GCM keyed from a password with Argon2id.
///
/// One cipher per (password, salt) pair. Ciphertexts carry the 16-byte
/// authentication tag, so a wrong password and a tampered file both
/// surface as [`CoreError::Decryption`].
pub struct SnapshotCipher {
    cipher: Aes256Gcm,
}

impl SnapshotCipher {
    pub fn derive(password: &str, salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<Self, CoreError> {
        let mut key = [0u8; KEY_LEN];
        params
            .hasher()?
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
        Self::from_key(&key)
    }

    pub fn from_key(key: &[u8; KEY_LEN]) -> Result<Self, CoreError> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        Ok(Self { cipher })
    }

    pub fn seal(&self, plaintext: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>, CoreError> {
        self.cipher
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))
    }

    pub fn open(&self, ciphertext: &[u8], nonce: &[u8; NONCE_LEN]) -> Result<Vec<u8>, CoreError> {
        self.cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CoreError::Decryption)
    }
}

/// `N` bytes from the OS CSPRNG (salts and nonces).
pub fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut out = [0u8; N];
    getrandom::getrandom(&mut out)
        .map_err(|e| CoreError::Encryption(format!("Failed to gather randomness: {e}")))?;
    Ok(out)
}
