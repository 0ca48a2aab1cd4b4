#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use tracing::debug;

use crate::errors::CoreError;
use crate::models::snapshot::FinanceSnapshot;

use super::encryption::{random_bytes, KdfParams, SnapshotCipher};
use super::format::SnapshotHeader;

/// Encrypted offline copies of a [`FinanceSnapshot`].
///
/// Flow: snapshot → bincode → AES-256-GCM(Argon2id(password, salt)) → FVLT bytes.
/// A fresh salt and nonce are drawn on every save.
pub struct StorageManager;

impl StorageManager {
    pub fn save_to_bytes(snapshot: &FinanceSnapshot, password: &str) -> Result<Vec<u8>, CoreError> {
        Self::save_with_params(snapshot, password, KdfParams::default())
    }

    /// Same as [`StorageManager::save_to_bytes`] with explicit KDF costs.
    pub fn save_with_params(
        snapshot: &FinanceSnapshot,
        password: &str,
        kdf_params: KdfParams,
    ) -> Result<Vec<u8>, CoreError> {
        if password.is_empty() {
            return Err(CoreError::Validation("Password must not be empty".into()));
        }
        kdf_params.validate()?;

        let plaintext = bincode::serialize(snapshot)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize snapshot: {e}")))?;

        let header = SnapshotHeader::new(kdf_params, random_bytes()?, random_bytes()?);
        let cipher = SnapshotCipher::derive(password, &header.salt, &header.kdf_params)?;
        let ciphertext = cipher.seal(&plaintext, &header.nonce)?;

        debug!(
            transactions = snapshot.transactions.len(),
            bytes = ciphertext.len(),
            "snapshot sealed"
        );
        Ok(header.encode(&ciphertext))
    }

    pub fn load_from_bytes(data: &[u8], password: &str) -> Result<FinanceSnapshot, CoreError> {
        let (header, ciphertext) = SnapshotHeader::decode(data)?;
        let cipher = SnapshotCipher::derive(password, &header.salt, &header.kdf_params)?;
        let plaintext = cipher.open(ciphertext, &header.nonce)?;

        bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize snapshot: {e}")))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(
        snapshot: &FinanceSnapshot,
        path: impl AsRef<Path>,
        password: &str,
    ) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(snapshot, password)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<Path>, password: &str) -> Result<FinanceSnapshot, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes, password)
    }
}
