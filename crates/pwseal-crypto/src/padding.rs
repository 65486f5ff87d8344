//! PKCS#7 padding
//!
//! `pad` always appends between 1 and `block_size` bytes, each holding the
//! pad length, so an aligned input gains a full block. `unpad` checks every
//! padding byte instead of trusting the last one.

use crate::error::{CryptoError, CryptoResult};

/// Pad `data` to a positive multiple of `block_size` (1..=255).
pub fn pad(data: &[u8], block_size: usize) -> CryptoResult<Vec<u8>> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(CryptoError::InvalidParameter(format!(
            "block size must be in 1..=255, got {block_size}"
        )));
    }

    let n = block_size - data.len() % block_size;
    let mut padded = Vec::with_capacity(data.len() + n);
    padded.extend_from_slice(data);
    padded.resize(data.len() + n, n as u8);
    Ok(padded)
}

/// Strip PKCS#7 padding, returning the original data as a sub-slice.
pub fn unpad(data: &[u8]) -> CryptoResult<&[u8]> {
    let Some(&last) = data.last() else {
        return Err(CryptoError::MalformedPadding);
    };

    let n = last as usize;
    if n == 0 || n > data.len() {
        return Err(CryptoError::MalformedPadding);
    }

    let (body, padding) = data.split_at(data.len() - n);
    // Fold over every byte so the check does not exit early on the first mismatch.
    let mismatch = padding.iter().fold(0u8, |acc, &b| acc | (b ^ last));
    if mismatch != 0 {
        return Err(CryptoError::MalformedPadding);
    }

    Ok(body)
}
