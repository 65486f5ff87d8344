use std::path::PathBuf;
use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed container: {0}")]
    Format(String),

    /// Wrong passphrase or tampered data. Deliberately carries no detail.
    #[error("authentication failed: wrong passphrase or corrupted data")]
    AuthenticationFailure,

    #[error("malformed padding")]
    MalformedPadding,

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl CryptoError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for both tag mismatches and padding failures, which callers
    /// must not tell apart.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailure | Self::MalformedPadding)
    }
}
