//! pwseal-crypto: passphrase-based authenticated file encryption
//!
//! Pipeline (encrypt):
//! ```text
//! passphrase + random salt ──PBKDF2-HMAC-SHA256──▶ 256-bit key
//! plaintext ──PKCS#7 pad──▶ padded ──AES-256-GCM (random 128-bit nonce)──▶ ciphertext + tag
//! base64(salt) ":" base64(nonce || tag || ciphertext)  ──▶ container file
//! ```
//!
//! Decryption is the exact inverse. The tag is verified before any
//! plaintext leaves the cipher, and only the salt is stored in the header:
//! the key is always re-derived from the passphrase.

pub mod cipher;
pub mod container;
pub mod error;
pub mod file;
pub mod kdf;
pub mod padding;
pub mod params;

pub use cipher::{generate_nonce, open, seal};
pub use container::{decode, encode, Container, ContainerFormat, ContainerInfo};
pub use error::{CryptoError, CryptoResult};
pub use file::{FileCrypto, OpReport};
pub use kdf::{derive_key, generate_salt, DerivedKey};
pub use padding::{pad, unpad};
pub use params::{CryptoParams, KdfParams};

/// Size of a KDF salt in bytes
pub const SALT_SIZE: usize = 16;

/// Size of a derived AES-256 key in bytes
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce as stored in the container (128-bit)
pub const NONCE_SIZE: usize = 16;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// AES block size; plaintext is padded to a multiple of this
pub const BLOCK_SIZE: usize = 16;

/// Default PBKDF2 iteration count
pub const DEFAULT_ITERATIONS: u32 = 100_000;
