use crate::errors::CoreError;

use super::encryption::{KdfParams, NONCE_LEN, SALT_LEN};

/// Magic bytes of an encrypted finance snapshot.
pub const MAGIC: &[u8; 4] = b"FVLT";

pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8)
pub const MIN_HEADER_SIZE: usize = 54;

/// Fixed-size preamble of a snapshot file.
///
/// ```text
/// [FVLT: 4B] [version: 2B LE] [memory_cost: 4B LE] [time_cost: 4B LE]
/// [parallelism: 4B LE] [salt: 16B] [nonce: 12B] [ciphertext_len: 8B LE]
/// [ciphertext: variable]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
}

impl SnapshotHeader {
    pub fn new(kdf_params: KdfParams, salt: [u8; SALT_LEN], nonce: [u8; NONCE_LEN]) -> Self {
        Self {
            version: CURRENT_VERSION,
            kdf_params,
            salt,
            nonce,
        }
    }

    /// Header followed by the length-prefixed ciphertext.
    pub fn encode(&self, ciphertext: &[u8]) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_HEADER_SIZE + ciphertext.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
        buf.extend_from_slice(ciphertext);
        buf
    }

    /// Parse and validate a header; returns it with the ciphertext slice.
    /// Bytes after the declared ciphertext are ignored.
    pub fn decode(data: &[u8]) -> Result<(Self, &[u8]), CoreError> {
        if data.len() < MIN_HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "File too small to be a snapshot file".into(),
            ));
        }

        let mut reader = Reader::new(data);
        if &reader.array::<4>("magic")? != MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes, not a snapshot file".into(),
            ));
        }

        let version = reader.u16("version")?;
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: reader.u32("KDF memory_cost")?,
            time_cost: reader.u32("KDF time_cost")?,
            parallelism: reader.u32("KDF parallelism")?,
        };
        kdf_params.validate()?;

        let salt = reader.array("salt")?;
        let nonce = reader.array("nonce")?;
        let declared = reader.u64("ciphertext length")?;

        let available = reader.remaining();
        let ciphertext_len = usize::try_from(declared)
            .ok()
            .filter(|len| *len <= available)
            .ok_or_else(|| {
                CoreError::InvalidFileFormat(format!(
                    "File truncated: expected {declared} bytes of ciphertext, got {available}"
                ))
            })?;
        let ciphertext = reader.take(ciphertext_len, "ciphertext")?;

        Ok((
            Self {
                version,
                kdf_params,
                salt,
                nonce,
            },
            ciphertext,
        ))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], CoreError> {
        if len > self.remaining() {
            return Err(CoreError::InvalidFileFormat(format!("Failed to read {what}")));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N], CoreError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u16(&mut self, what: &str) -> Result<u16, CoreError> {
        self.array(what).map(u16::from_le_bytes)
    }

    fn u32(&mut self, what: &str) -> Result<u32, CoreError> {
        self.array(what).map(u32::from_le_bytes)
    }

    fn u64(&mut self, what: &str) -> Result<u64, CoreError> {
        self.array(what).map(u64::from_le_bytes)
    }
}
