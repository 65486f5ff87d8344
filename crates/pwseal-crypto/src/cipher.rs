//! AES-256-GCM with a 128-bit nonce and detached tag
//!
//! The container stores a 16-byte nonce, so the cipher is instantiated as
//! `AesGcm<Aes256, U16>` rather than the 12-byte `Aes256Gcm` alias. No
//! associated data is bound. Ciphertext length always equals plaintext
//! length; padding happens before this layer.

use aes_gcm::{
    aead::{consts::U16, generic_array::GenericArray, AeadInPlace, KeyInit},
    aes::Aes256,
    AesGcm,
};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::DerivedKey;
use crate::{NONCE_SIZE, TAG_SIZE};

type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Generate a fresh random nonce. Draw a new one for every `seal`.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);
    nonce
}

/// Encrypt `plaintext`, returning `(ciphertext, tag)`.
///
/// Reusing a nonce under the same key breaks both confidentiality and
/// authenticity; this function cannot check that.
pub fn seal(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> CryptoResult<(Vec<u8>, [u8; TAG_SIZE])> {
    let cipher = Aes256Gcm16::new(key.as_bytes().into());

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(nonce), b"", &mut buffer)
        .map_err(|_| {
            CryptoError::InvalidParameter(format!(
                "plaintext of {} bytes exceeds the AES-GCM limit",
                plaintext.len()
            ))
        })?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);
    Ok((buffer, tag_bytes))
}

/// Verify `tag` and decrypt `ciphertext`.
///
/// The tag is checked before the keystream is applied; on mismatch nothing
/// but `AuthenticationFailure` is returned.
pub fn open(
    key: &DerivedKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm16::new(key.as_bytes().into());

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(nonce),
            b"",
            &mut buffer,
            GenericArray::from_slice(tag),
        )
        .map_err(|_| CryptoError::AuthenticationFailure)?;

    Ok(buffer)
}
