//! Immutable parameter set shared by the KDF and the file service

use crate::error::{CryptoError, CryptoResult};
use crate::{BLOCK_SIZE, DEFAULT_ITERATIONS, KEY_SIZE};

/// PBKDF2-HMAC-SHA256 parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Iteration count (default: 100000)
    pub iterations: u32,
    /// Output length in bytes; only 32 (AES-256) is supported
    pub key_len: usize,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            key_len: KEY_SIZE,
        }
    }
}

impl KdfParams {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CryptoResult<()> {
        if self.iterations == 0 {
            return Err(CryptoError::InvalidParameter(
                "KDF iterations must be at least 1".into(),
            ));
        }
        if self.key_len != KEY_SIZE {
            return Err(CryptoError::InvalidParameter(format!(
                "key length must be {KEY_SIZE} bytes, got {}",
                self.key_len
            )));
        }
        Ok(())
    }
}

/// Everything `FileCrypto` needs besides the passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoParams {
    pub kdf: KdfParams,
    /// Padding block size (default: 16, the AES block size)
    pub block_size: usize,
}

impl Default for CryptoParams {
    fn default() -> Self {
        Self {
            kdf: KdfParams::default(),
            block_size: BLOCK_SIZE,
        }
    }
}

impl CryptoParams {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            kdf: KdfParams::with_iterations(iterations),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CryptoResult<()> {
        self.kdf.validate()?;
        if self.block_size == 0 || self.block_size > u8::MAX as usize {
            return Err(CryptoError::InvalidParameter(format!(
                "block size must be in 1..=255, got {}",
                self.block_size
            )));
        }
        Ok(())
    }
}
