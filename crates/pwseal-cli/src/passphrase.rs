//! Passphrase acquisition
//!
//! Sources, in order of precedence:
//!   1. the environment variable named by `--passphrase-env`
//!   2. `$PWSEAL_PASSPHRASE`
//!   3. interactive prompt on the terminal (asked twice when encrypting)

use anyhow::{Context, Result};
use secrecy::{ExposeSecret, SecretString};

/// Default environment variable consulted for a non-interactive passphrase
pub const PASSPHRASE_ENV: &str = "PWSEAL_PASSPHRASE";

pub fn resolve(env_override: Option<&str>, confirm: bool) -> Result<SecretString> {
    if let Some(var) = env_override {
        let value = std::env::var(var)
            .with_context(|| format!("passphrase environment variable {var} is not set"))?;
        return Ok(SecretString::from(value));
    }

    if let Ok(value) = std::env::var(PASSPHRASE_ENV) {
        tracing::debug!("using passphrase from ${PASSPHRASE_ENV}");
        return Ok(SecretString::from(value));
    }

    prompt(confirm)
}

fn prompt(confirm: bool) -> Result<SecretString> {
    let first = SecretString::from(
        rpassword::prompt_password("Passphrase: ").context("reading passphrase")?,
    );
    if confirm {
        let second = SecretString::from(
            rpassword::prompt_password("Confirm passphrase: ")
                .context("reading passphrase confirmation")?,
        );
        if first.expose_secret() != second.expose_secret() {
            anyhow::bail!("passphrases do not match");
        }
    }
    Ok(first)
}
