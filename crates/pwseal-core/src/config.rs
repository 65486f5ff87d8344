use serde::{Deserialize, Serialize};
use std::path::Path;

use pwseal_crypto::CryptoParams;

use crate::error::{PwsealError, PwsealResult};

/// Top-level configuration (loaded from pwseal.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PwsealConfig {
    pub crypto: CryptoConfig,
    pub log: LogConfig,
    pub output: OutputConfig,
}

/// Key derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// PBKDF2-HMAC-SHA256 iterations (default: 100000)
    pub iterations: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            iterations: pwseal_crypto::DEFAULT_ITERATIONS,
        }
    }
}

impl CryptoConfig {
    /// Build validated codec parameters from this section.
    pub fn to_params(&self) -> PwsealResult<CryptoParams> {
        let params = CryptoParams::with_iterations(self.iterations);
        params
            .validate()
            .map_err(|e| PwsealError::Config(format!("[crypto] {e}")))?;
        Ok(params)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Replace an existing output file (default: true)
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { overwrite: true }
    }
}

/// Load configuration from `path`, falling back to defaults if it does not exist.
pub fn load_config(path: &Path) -> PwsealResult<PwsealConfig> {
    if !path.exists() {
        tracing::debug!("config file not found: {}  (using defaults)", path.display());
        return Ok(PwsealConfig::default());
    }

    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| PwsealError::Config(format!("parsing {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[crypto]
iterations = 250000

[log]
level = "debug"
format = "json"

[output]
overwrite = false
"#;
        let config: PwsealConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(config.crypto.iterations, 250_000);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.format, "json");
        assert!(!config.output.overwrite);
    }

    #[test]
    fn test_parse_defaults() {
        let config: PwsealConfig = toml::from_str("").unwrap();

        assert_eq!(config.crypto.iterations, 100_000);
        assert_eq!(config.log.level, "warn");
        assert_eq!(config.log.format, "text");
        assert!(config.output.overwrite);
    }

    #[test]
    fn test_parse_partial_config() {
        let toml_str = r#"
[crypto]
iterations = 5000
"#;
        let config: PwsealConfig = toml::from_str(toml_str).unwrap();

        // Overridden
        assert_eq!(config.crypto.iterations, 5000);
        // Defaults
        assert_eq!(config.log.level, "warn");
        assert!(config.output.overwrite);
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = PwsealConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PwsealConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.crypto.iterations, parsed.crypto.iterations);
        assert_eq!(config.log.format, parsed.log.format);
    }

    #[test]
    fn test_to_params() {
        let params = CryptoConfig { iterations: 42 }.to_params().unwrap();
        assert_eq!(params.kdf.iterations, 42);
        assert_eq!(params.block_size, 16);
    }

    #[test]
    fn test_zero_iterations_is_config_error() {
        let err = CryptoConfig { iterations: 0 }.to_params().unwrap_err();
        assert!(matches!(err, PwsealError::Config(_)));
        assert!(err.to_string().contains("[crypto]"));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.crypto.iterations, 100_000);
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pwseal.toml");
        std::fs::write(&path, "[crypto]\niterations = 7\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.crypto.iterations, 7);
    }

    #[test]
    fn test_load_invalid_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("pwseal.toml");
        std::fs::write(&path, "[crypto\niterations = ").unwrap();

        assert!(matches!(load_config(&path), Err(PwsealError::Config(_))));
    }
}
