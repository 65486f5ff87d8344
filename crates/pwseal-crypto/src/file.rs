//! Whole-file encrypt/decrypt
//!
//! Each call is synchronous, reads its input fully into memory and shares no
//! state with other calls. Output goes to a temporary file in the
//! destination directory and is renamed into place only on success, so a
//! failed call never leaves a partial output behind.

use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, SecretString};
use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use crate::cipher::{generate_nonce, open, seal};
use crate::container::Container;
use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, generate_salt, DerivedKey};
use crate::padding::{pad, unpad};
use crate::params::CryptoParams;

/// Byte counts and timings for one file operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpReport {
    pub bytes_in: u64,
    pub bytes_out: u64,
    /// Time spent in PBKDF2
    pub kdf_elapsed: Duration,
    pub total_elapsed: Duration,
}

/// Passphrase file encryption service.
#[derive(Debug, Clone, Default)]
pub struct FileCrypto {
    params: CryptoParams,
}

impl FileCrypto {
    /// Build a service, rejecting invalid parameters up front.
    pub fn new(params: CryptoParams) -> CryptoResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CryptoParams {
        &self.params
    }

    /// Encrypt `input` into a container text file at `output`.
    pub fn encrypt_file(
        &self,
        input: &Path,
        output: &Path,
        passphrase: &SecretString,
    ) -> CryptoResult<OpReport> {
        let started = Instant::now();
        let plaintext =
            Zeroizing::new(std::fs::read(input).map_err(|e| CryptoError::io(input, e))?);

        let (container, kdf_elapsed) = self.encrypt_timed(&plaintext, passphrase)?;
        let text = container.encode();
        write_atomic(output, text.as_bytes())?;

        let report = OpReport {
            bytes_in: plaintext.len() as u64,
            bytes_out: text.len() as u64,
            kdf_elapsed,
            total_elapsed: started.elapsed(),
        };
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            bytes_in = report.bytes_in,
            bytes_out = report.bytes_out,
            kdf_ms = report.kdf_elapsed.as_millis() as u64,
            total_ms = report.total_elapsed.as_millis() as u64,
            "encrypted file"
        );
        Ok(report)
    }

    /// Decrypt the container at `input` and write the plaintext to `output`.
    pub fn decrypt_file(
        &self,
        input: &Path,
        output: &Path,
        passphrase: &SecretString,
    ) -> CryptoResult<OpReport> {
        let started = Instant::now();
        let text = std::fs::read_to_string(input).map_err(|e| match e.kind() {
            std::io::ErrorKind::InvalidData => {
                CryptoError::Format("container is not valid UTF-8 text".into())
            }
            _ => CryptoError::io(input, e),
        })?;

        let container = Container::decode(&text)?;
        let (plaintext, kdf_elapsed) = self.decrypt_timed(&container, passphrase)?;
        write_atomic(output, &plaintext)?;

        let report = OpReport {
            bytes_in: text.len() as u64,
            bytes_out: plaintext.len() as u64,
            kdf_elapsed,
            total_elapsed: started.elapsed(),
        };
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            format = %container.format,
            bytes_in = report.bytes_in,
            bytes_out = report.bytes_out,
            kdf_ms = report.kdf_elapsed.as_millis() as u64,
            total_ms = report.total_elapsed.as_millis() as u64,
            "decrypted file"
        );
        Ok(report)
    }

    /// Encrypt a buffer into a container with a fresh salt and nonce.
    pub fn encrypt_bytes(
        &self,
        plaintext: &[u8],
        passphrase: &SecretString,
    ) -> CryptoResult<Container> {
        self.encrypt_timed(plaintext, passphrase)
            .map(|(container, _)| container)
    }

    /// Decrypt a container. Any tag or padding failure is reported as
    /// `AuthenticationFailure`.
    pub fn decrypt_container(
        &self,
        container: &Container,
        passphrase: &SecretString,
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        self.decrypt_timed(container, passphrase)
            .map(|(plaintext, _)| plaintext)
    }

    fn derive(
        &self,
        passphrase: &SecretString,
        salt: &[u8; crate::SALT_SIZE],
    ) -> CryptoResult<(DerivedKey, Duration)> {
        let started = Instant::now();
        let key = derive_key(passphrase.expose_secret().as_bytes(), salt, &self.params.kdf)?;
        Ok((key, started.elapsed()))
    }

    fn encrypt_timed(
        &self,
        plaintext: &[u8],
        passphrase: &SecretString,
    ) -> CryptoResult<(Container, Duration)> {
        let salt = generate_salt();
        let (key, kdf_elapsed) = self.derive(passphrase, &salt)?;

        let nonce = generate_nonce();
        let padded = Zeroizing::new(pad(plaintext, self.params.block_size)?);
        let (ciphertext, tag) = seal(&key, &nonce, &padded)?;

        Ok((Container::new(salt, nonce, tag, ciphertext), kdf_elapsed))
    }

    fn decrypt_timed(
        &self,
        container: &Container,
        passphrase: &SecretString,
    ) -> CryptoResult<(Zeroizing<Vec<u8>>, Duration)> {
        let (key, kdf_elapsed) = self.derive(passphrase, &container.salt)?;

        let padded = Zeroizing::new(open(
            &key,
            &container.nonce,
            &container.ciphertext,
            &container.tag,
        )?);
        let plaintext = unpad(&padded).map_err(|_| CryptoError::AuthenticationFailure)?;

        Ok((Zeroizing::new(plaintext.to_vec()), kdf_elapsed))
    }
}

/// Write `data` to a temp file beside `path`, then rename it over `path`.
///
/// The temp file is removed automatically if anything fails before the rename.
fn write_atomic(path: &Path, data: &[u8]) -> CryptoResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CryptoError::io(dir, e))?;
    tmp.write_all(data).map_err(|e| CryptoError::io(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CryptoError::io(tmp.path(), e))?;
    tmp.persist(path)
        .map_err(|e| CryptoError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn service() -> FileCrypto {
        FileCrypto::new(CryptoParams::with_iterations(1_000)).unwrap()
    }

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_new_rejects_invalid_params() {
        let result = FileCrypto::new(CryptoParams::with_iterations(0));
        assert!(matches!(result, Err(CryptoError::InvalidParameter(_))));
    }

    #[test]
    fn test_bytes_roundtrip() {
        let svc = service();
        let container = svc.encrypt_bytes(b"some bytes", &pw("pw")).unwrap();
        let plaintext = svc.decrypt_container(&container, &pw("pw")).unwrap();
        assert_eq!(plaintext.as_slice(), b"some bytes");
    }

    #[test]
    fn test_padding_failure_reported_as_auth_failure() {
        // A correctly sealed payload whose padding is invalid.
        let svc = service();
        let salt = [3u8; crate::SALT_SIZE];
        let key = derive_key(b"pw", &salt, &svc.params().kdf).unwrap();
        let nonce = generate_nonce();
        let (ciphertext, tag) = seal(&key, &nonce, &[0u8; 16]).unwrap();
        let container = Container::new(salt, nonce, tag, ciphertext);

        let result = svc.decrypt_container(&container, &pw("pw"));
        assert!(matches!(result, Err(CryptoError::AuthenticationFailure)));
    }

    #[test]
    fn test_file_roundtrip_reports_sizes() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("plain.bin");
        let sealed = tmp.path().join("plain.bin.pws");
        let output = tmp.path().join("restored.bin");
        std::fs::write(&input, b"hello world").unwrap();

        let svc = service();
        let enc = svc.encrypt_file(&input, &sealed, &pw("pw")).unwrap();
        assert_eq!(enc.bytes_in, 11);
        assert_eq!(enc.bytes_out, std::fs::metadata(&sealed).unwrap().len());

        let dec = svc.decrypt_file(&sealed, &output, &pw("pw")).unwrap();
        assert_eq!(dec.bytes_out, 11);
        assert_eq!(std::fs::read(&output).unwrap(), b"hello world");
    }

    #[test]
    fn test_write_atomic_creates_file() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("out.txt");
        write_atomic(&target, b"data").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"data");
    }

    #[test]
    fn test_write_atomic_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("missing").join("out.txt");
        assert!(matches!(
            write_atomic(&target, b"data"),
            Err(CryptoError::Io { .. })
        ));
        assert!(!target.exists());
    }
}
