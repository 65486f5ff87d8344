//! `pwseal bench`: wall-clock timing of encrypt/decrypt over random inputs

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::RngCore;
use secrecy::SecretString;
use serde::Serialize;

use pwseal_crypto::FileCrypto;

#[derive(Debug, Clone, Serialize)]
pub struct BenchSample {
    pub size: usize,
    pub iterations: u32,
    /// Key derivation + padding + sealing
    pub encrypt_ms: f64,
    /// Key derivation + opening + unpadding
    pub decrypt_ms: f64,
}

/// Time one encrypt and one decrypt for each size.
pub fn run(svc: &FileCrypto, sizes: &[usize]) -> Result<Vec<BenchSample>> {
    let passphrase = SecretString::from("testpassword".to_string());
    let mut samples = Vec::with_capacity(sizes.len());

    for &size in sizes {
        let mut plaintext = vec![0u8; size];
        rand::thread_rng().fill_bytes(&mut plaintext);

        let started = Instant::now();
        let container = svc
            .encrypt_bytes(&plaintext, &passphrase)
            .with_context(|| format!("encrypting {size} bytes"))?;
        let encrypt = started.elapsed();

        let started = Instant::now();
        let restored = svc
            .decrypt_container(&container, &passphrase)
            .with_context(|| format!("decrypting {size} bytes"))?;
        let decrypt = started.elapsed();

        anyhow::ensure!(
            restored.as_slice() == plaintext.as_slice(),
            "round-trip mismatch at {size} bytes"
        );

        tracing::debug!(size, ?encrypt, ?decrypt, "bench sample");
        samples.push(BenchSample {
            size,
            iterations: svc.params().kdf.iterations,
            encrypt_ms: millis(encrypt),
            decrypt_ms: millis(decrypt),
        });
    }

    Ok(samples)
}

/// Parse a comma-separated size list such as `1024,32768,1048576`.
pub fn parse_sizes(s: &str) -> Result<Vec<usize>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<usize>()
                .with_context(|| format!("invalid size: {p:?}"))
        })
        .collect()
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
