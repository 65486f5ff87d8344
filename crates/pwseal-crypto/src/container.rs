//! Text container format
//!
//! ```text
//! base64(salt) ":" base64(nonce || tag || ciphertext)
//!
//! salt       16 bytes   PBKDF2 salt
//! nonce      16 bytes   AES-GCM nonce
//! tag        16 bytes   GCM authentication tag
//! ciphertext  N bytes   N = padded plaintext length, a multiple of 16
//! ```
//!
//! Both fields use the standard base64 alphabet with padding, which never
//! contains `:`.
//!
//! Files written before the salt-only header carry `base64(salt || key)` in
//! the header (48 bytes decoded). Those are still readable: the key bytes are
//! discarded and the key is re-derived from the passphrase. They are never
//! written.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, NONCE_SIZE, SALT_SIZE, TAG_SIZE};

/// Separator between header and body
pub const DELIMITER: char = ':';

/// Header layout detected on decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerFormat {
    /// `base64(salt)`; the only layout written
    SaltOnly,
    /// `base64(salt || derived key)`; read-only compatibility
    LegacyEmbeddedKey,
}

impl ContainerFormat {
    fn from_header_len(len: usize) -> CryptoResult<Self> {
        match len {
            SALT_SIZE => Ok(Self::SaltOnly),
            n if n == SALT_SIZE + KEY_SIZE => Ok(Self::LegacyEmbeddedKey),
            n => Err(CryptoError::Format(format!(
                "header is {n} bytes (expected {SALT_SIZE}, or {} for legacy files)",
                SALT_SIZE + KEY_SIZE
            ))),
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SaltOnly => f.write_str("salt-only"),
            Self::LegacyEmbeddedKey => f.write_str("legacy (embedded key)"),
        }
    }
}

/// A decoded container: everything needed to decrypt except the passphrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub format: ContainerFormat,
    pub salt: [u8; SALT_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub tag: [u8; TAG_SIZE],
    pub ciphertext: Vec<u8>,
}

/// Public container metadata, for display.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerInfo {
    pub format: ContainerFormat,
    pub salt: String,
    pub nonce: String,
    pub ciphertext_len: usize,
    pub max_plaintext_len: usize,
}

impl Container {
    pub fn new(
        salt: [u8; SALT_SIZE],
        nonce: [u8; NONCE_SIZE],
        tag: [u8; TAG_SIZE],
        ciphertext: Vec<u8>,
    ) -> Self {
        Self {
            format: ContainerFormat::SaltOnly,
            salt,
            nonce,
            tag,
            ciphertext,
        }
    }

    /// Serialize to container text. Always writes the salt-only header.
    pub fn encode(&self) -> String {
        encode(&self.salt, &self.nonce, &self.tag, &self.ciphertext)
    }

    /// Parse container text.
    pub fn decode(text: &str) -> CryptoResult<Self> {
        decode(text)
    }

    pub fn info(&self) -> ContainerInfo {
        ContainerInfo {
            format: self.format,
            salt: STANDARD.encode(self.salt),
            nonce: STANDARD.encode(self.nonce),
            ciphertext_len: self.ciphertext.len(),
            // at least one padding byte is always present
            max_plaintext_len: self.ciphertext.len().saturating_sub(1),
        }
    }
}

/// Serialize the four container parts into container text.
pub fn encode(
    salt: &[u8; SALT_SIZE],
    nonce: &[u8; NONCE_SIZE],
    tag: &[u8; TAG_SIZE],
    ciphertext: &[u8],
) -> String {
    let mut body = Vec::with_capacity(NONCE_SIZE + TAG_SIZE + ciphertext.len());
    body.extend_from_slice(nonce);
    body.extend_from_slice(tag);
    body.extend_from_slice(ciphertext);

    let mut text = STANDARD.encode(salt);
    text.push(DELIMITER);
    STANDARD.encode_string(&body, &mut text);
    text
}

/// Parse container text into its parts.
///
/// Surrounding ASCII whitespace is ignored.
pub fn decode(text: &str) -> CryptoResult<Container> {
    let text = text.trim_matches(|c: char| c.is_ascii_whitespace());

    let (header_b64, body_b64) = text
        .split_once(DELIMITER)
        .ok_or_else(|| CryptoError::Format(format!("missing '{DELIMITER}' delimiter")))?;
    if body_b64.contains(DELIMITER) {
        return Err(CryptoError::Format(format!(
            "more than one '{DELIMITER}' delimiter"
        )));
    }

    // A legacy header holds key material; wipe it once the salt is copied out.
    let header = Zeroizing::new(
        STANDARD
            .decode(header_b64)
            .map_err(|e| CryptoError::Format(format!("header base64: {e}")))?,
    );
    let format = ContainerFormat::from_header_len(header.len())?;
    if format == ContainerFormat::LegacyEmbeddedKey {
        tracing::warn!(
            "container uses the legacy header with an embedded key; \
             re-encrypt it to drop the key from the file"
        );
    }

    let body = STANDARD
        .decode(body_b64)
        .map_err(|e| CryptoError::Format(format!("body base64: {e}")))?;
    if body.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::Format(format!(
            "body too short: {} bytes (minimum {})",
            body.len(),
            NONCE_SIZE + TAG_SIZE
        )));
    }

    let mut salt = [0u8; SALT_SIZE];
    salt.copy_from_slice(&header[..SALT_SIZE]);

    let (nonce_bytes, rest) = body.split_at(NONCE_SIZE);
    let (tag_bytes, ciphertext) = rest.split_at(TAG_SIZE);

    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(nonce_bytes);
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(tag_bytes);

    Ok(Container {
        format,
        salt,
        nonce,
        tag,
        ciphertext: ciphertext.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Container {
        Container::new([1u8; SALT_SIZE], [2u8; NONCE_SIZE], [3u8; TAG_SIZE], vec![4u8; 32])
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let container = sample();
        let text = container.encode();
        assert_eq!(Container::decode(&text).unwrap(), container);
    }

    #[test]
    fn test_encoded_layout() {
        let text = sample().encode();
        let (header, body) = text.split_once(':').unwrap();

        assert_eq!(STANDARD.decode(header).unwrap(), vec![1u8; SALT_SIZE]);

        let body = STANDARD.decode(body).unwrap();
        assert_eq!(body.len(), NONCE_SIZE + TAG_SIZE + 32);
        assert_eq!(&body[..16], &[2u8; 16]);
        assert_eq!(&body[16..32], &[3u8; 16]);
        assert_eq!(&body[32..], &[4u8; 32]);
    }

    #[test]
    fn test_decode_empty_ciphertext_is_well_formed() {
        let container = Container::new([0; 16], [0; 16], [0; 16], Vec::new());
        let decoded = decode(&container.encode()).unwrap();
        assert!(decoded.ciphertext.is_empty());
    }

    #[test]
    fn test_decode_ignores_trailing_newline() {
        let text = format!("{}\n", sample().encode());
        assert_eq!(decode(&text).unwrap(), sample());
    }

    #[test]
    fn test_decode_missing_delimiter() {
        let text = sample().encode().replace(':', "");
        assert!(matches!(decode(&text), Err(CryptoError::Format(_))));
    }

    #[test]
    fn test_decode_extra_delimiter() {
        let text = format!("{}:AAAA", sample().encode());
        assert!(matches!(decode(&text), Err(CryptoError::Format(_))));
    }

    #[test]
    fn test_decode_bad_base64() {
        let text = sample().encode();
        let (header, _) = text.split_once(':').unwrap();
        let broken = format!("{header}:not*base64!");
        assert!(matches!(decode(&broken), Err(CryptoError::Format(_))));

        assert!(matches!(
            decode("%%%%:AAAA"),
            Err(CryptoError::Format(_))
        ));
    }

    #[test]
    fn test_decode_body_too_short() {
        let header = STANDARD.encode([0u8; SALT_SIZE]);
        let body = STANDARD.encode([0u8; NONCE_SIZE + TAG_SIZE - 1]);
        let err = decode(&format!("{header}:{body}")).unwrap_err();
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_decode_wrong_header_length() {
        let header = STANDARD.encode([0u8; 20]);
        let body = STANDARD.encode([0u8; 48]);
        assert!(matches!(
            decode(&format!("{header}:{body}")),
            Err(CryptoError::Format(_))
        ));
    }

    #[test]
    fn test_decode_legacy_header() {
        let mut header = vec![5u8; SALT_SIZE];
        header.extend_from_slice(&[0xEEu8; KEY_SIZE]);
        let body = STANDARD.encode([6u8; 64]);
        let text = format!("{}:{body}", STANDARD.encode(&header));

        let container = decode(&text).unwrap();
        assert_eq!(container.format, ContainerFormat::LegacyEmbeddedKey);
        assert_eq!(container.salt, [5u8; SALT_SIZE]);
        assert_eq!(container.ciphertext.len(), 32);

        // re-encoding drops the key bytes
        let rewritten = container.encode();
        let (new_header, _) = rewritten.split_once(':').unwrap();
        assert_eq!(STANDARD.decode(new_header).unwrap().len(), SALT_SIZE);
    }

    #[test]
    fn test_info() {
        let info = sample().info();
        assert_eq!(info.format, ContainerFormat::SaltOnly);
        assert_eq!(info.ciphertext_len, 32);
        assert_eq!(info.max_plaintext_len, 31);
        assert_eq!(info.salt, STANDARD.encode([1u8; SALT_SIZE]));
    }
}
