//! pwseal: passphrase file encryption CLI
//!
//! Commands:
//!   encrypt <input> <output>       - encrypt a file into a text container
//!   decrypt <input> <output>       - decrypt a container back to the original bytes
//!   verify <original> <container>  - decrypt in memory and compare with the original
//!   inspect <container>            - show the public header/body metadata
//!   bench                          - time encrypt/decrypt over random inputs
//!   config show                    - display current configuration

mod bench;
mod passphrase;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pwseal_core::config::PwsealConfig;
use pwseal_crypto::{Container, CryptoError, FileCrypto, DEFAULT_ITERATIONS};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "pwseal",
    version,
    about = "Passphrase-based authenticated file encryption",
    long_about = "pwseal: encrypt files with AES-256-GCM under a PBKDF2-HMAC-SHA256 key \
                  derived from a passphrase"
)]
struct Cli {
    /// Path to pwseal.toml configuration file
    #[arg(long, short = 'c', env = "PWSEAL_CONFIG", default_value = "pwseal.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides config
    #[arg(long, env = "PWSEAL_LOG")]
    log: Option<String>,

    /// Log format; overrides config
    #[arg(long, env = "PWSEAL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file into a passphrase-protected container
    Encrypt {
        /// Plaintext input file
        input: PathBuf,
        /// Container output file
        output: PathBuf,
        /// Read the passphrase from this environment variable
        #[arg(long)]
        passphrase_env: Option<String>,
    },

    /// Decrypt a container back into the original file
    Decrypt {
        /// Container input file
        input: PathBuf,
        /// Plaintext output file
        output: PathBuf,
        /// PBKDF2 iterations used at encryption time (overrides config)
        #[arg(long)]
        iterations: Option<u32>,
        /// Read the passphrase from this environment variable
        #[arg(long)]
        passphrase_env: Option<String>,
    },

    /// Decrypt a container in memory and check it matches the original file
    Verify {
        /// The original plaintext file
        original: PathBuf,
        /// The container to check
        container: PathBuf,
        /// PBKDF2 iterations used at encryption time (overrides config)
        #[arg(long)]
        iterations: Option<u32>,
        /// Read the passphrase from this environment variable
        #[arg(long)]
        passphrase_env: Option<String>,
    },

    /// Show public container metadata (no passphrase needed)
    Inspect {
        /// Container file
        container: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Time key derivation + encryption and decryption for several input sizes
    Bench {
        /// Comma-separated input sizes in bytes (default: 1 KiB, 32 KiB, 1 MiB)
        #[arg(long, default_value = "1024,32768,1048576")]
        sizes: String,
        /// PBKDF2 iterations (overrides config)
        #[arg(long)]
        iterations: Option<u32>,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = pwseal_core::load_config(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;

    init_logging(&cli, &config);
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "pwseal starting"
    );

    match cli.command {
        Commands::Encrypt { input, output, passphrase_env } => {
            cmd_encrypt(&config, &input, &output, passphrase_env.as_deref())
        }
        Commands::Decrypt { input, output, iterations, passphrase_env } => {
            cmd_decrypt(&config, &input, &output, iterations, passphrase_env.as_deref())
        }
        Commands::Verify { original, container, iterations, passphrase_env } => {
            cmd_verify(&config, &original, &container, iterations, passphrase_env.as_deref())
        }
        Commands::Inspect { container, json } => cmd_inspect(&container, json),
        Commands::Bench { sizes, iterations, json } => cmd_bench(&config, &sizes, iterations, json),
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

fn init_logging(cli: &Cli, config: &PwsealConfig) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = cli.log.as_deref().unwrap_or(&config.log.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let json = match &cli.log_format {
        Some(LogFormat::Json) => true,
        Some(LogFormat::Text) => false,
        None => config.log.format.eq_ignore_ascii_case("json"),
    };

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build the codec service: CLI flag > config file > default.
fn build_service(config: &PwsealConfig, iterations: Option<u32>) -> Result<FileCrypto> {
    let mut crypto = config.crypto.clone();
    if let Some(n) = iterations {
        crypto.iterations = n;
    }
    let params = crypto.to_params()?;
    FileCrypto::new(params).context("building crypto service")
}

/// Spinner shown while PBKDF2 runs; hidden when stderr is not a terminal.
fn make_spinner(prefix: &str) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{prefix:.bold} {spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_prefix(prefix.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn check_overwrite(config: &PwsealConfig, output: &Path) -> Result<()> {
    if !config.output.overwrite && output.exists() {
        anyhow::bail!(
            "refusing to overwrite {} (set output.overwrite = true to allow)",
            output.display()
        );
    }
    Ok(())
}

/// Collapse tag and padding failures into one user-facing message.
///
/// The container does not record the PBKDF2 iteration count, so a
/// non-default count is named as a possible cause.
fn describe(err: CryptoError, iterations: u32) -> anyhow::Error {
    if err.is_authentication_failure() {
        if iterations != DEFAULT_ITERATIONS {
            anyhow::anyhow!(
                "decryption failed: wrong passphrase or corrupted data \
                 (derived with {iterations} PBKDF2 iterations; the file may have been \
                 encrypted with a different count)"
            )
        } else {
            anyhow::anyhow!("decryption failed: wrong passphrase or corrupted data")
        }
    } else {
        anyhow::Error::new(err)
    }
}

fn format_bytes(n: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = 1024 * KIB;
    if n >= MIB {
        format!("{:.1} MiB", n as f64 / MIB as f64)
    } else if n >= KIB {
        format!("{:.1} KiB", n as f64 / KIB as f64)
    } else {
        format!("{n} B")
    }
}

// ── `pwseal encrypt` / `pwseal decrypt` ───────────────────────────────────────

fn cmd_encrypt(
    config: &PwsealConfig,
    input: &Path,
    output: &Path,
    passphrase_env: Option<&str>,
) -> Result<()> {
    let svc = build_service(config, None)?;
    let iterations = svc.params().kdf.iterations;
    if iterations != DEFAULT_ITERATIONS {
        tracing::warn!(
            iterations,
            default = DEFAULT_ITERATIONS,
            "[crypto] iterations is not the default; the count is not stored in the \
             container, so decrypting needs the same setting or --iterations {iterations}"
        );
    }
    check_overwrite(config, output)?;
    let passphrase = passphrase::resolve(passphrase_env, true)?;

    let pb = make_spinner("encrypt");
    pb.set_message(format!("{}", input.display()));
    let result = svc.encrypt_file(input, output, &passphrase);
    pb.finish_and_clear();

    let report = result.map_err(|e| describe(e, iterations))?;
    println!(
        "encrypted {} ({}) -> {} ({}) in {:.2?} (key derivation {:.2?})",
        input.display(),
        format_bytes(report.bytes_in),
        output.display(),
        format_bytes(report.bytes_out),
        report.total_elapsed,
        report.kdf_elapsed,
    );
    Ok(())
}

fn cmd_decrypt(
    config: &PwsealConfig,
    input: &Path,
    output: &Path,
    iterations: Option<u32>,
    passphrase_env: Option<&str>,
) -> Result<()> {
    let svc = build_service(config, iterations)?;
    check_overwrite(config, output)?;
    let passphrase = passphrase::resolve(passphrase_env, false)?;

    let pb = make_spinner("decrypt");
    pb.set_message(format!("{}", input.display()));
    let result = svc.decrypt_file(input, output, &passphrase);
    pb.finish_and_clear();

    let report = result.map_err(|e| describe(e, svc.params().kdf.iterations))?;
    println!(
        "decrypted {} -> {} ({}) in {:.2?}",
        input.display(),
        output.display(),
        format_bytes(report.bytes_out),
        report.total_elapsed,
    );
    Ok(())
}

// ── `pwseal verify` ───────────────────────────────────────────────────────────

fn cmd_verify(
    config: &PwsealConfig,
    original: &Path,
    container_path: &Path,
    iterations: Option<u32>,
    passphrase_env: Option<&str>,
) -> Result<()> {
    let svc = build_service(config, iterations)?;

    let expected = std::fs::read(original)
        .with_context(|| format!("reading {}", original.display()))?;
    let text = std::fs::read_to_string(container_path)
        .with_context(|| format!("reading {}", container_path.display()))?;
    let container = Container::decode(&text)
        .with_context(|| format!("decoding {}", container_path.display()))?;

    let passphrase = passphrase::resolve(passphrase_env, false)?;
    let pb = make_spinner("verify");
    let result = svc.decrypt_container(&container, &passphrase);
    pb.finish_and_clear();
    let plaintext = result.map_err(|e| describe(e, svc.params().kdf.iterations))?;

    if plaintext.as_slice() != expected.as_slice() {
        anyhow::bail!(
            "verification failed: {} does not match {}",
            container_path.display(),
            original.display()
        );
    }
    println!("verified: content matches {}", original.display());
    Ok(())
}

// ── `pwseal inspect` ──────────────────────────────────────────────────────────

fn cmd_inspect(path: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let container =
        Container::decode(&text).with_context(|| format!("decoding {}", path.display()))?;
    let info = container.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("container:      {}", path.display());
    println!("format:         {}", info.format);
    println!("salt:           {}", info.salt);
    println!("nonce:          {}", info.nonce);
    println!("ciphertext:     {} bytes", info.ciphertext_len);
    println!("plaintext:      at most {} bytes", info.max_plaintext_len);
    Ok(())
}

// ── `pwseal bench` ────────────────────────────────────────────────────────────

fn cmd_bench(
    config: &PwsealConfig,
    sizes: &str,
    iterations: Option<u32>,
    json: bool,
) -> Result<()> {
    let svc = build_service(config, iterations)?;
    let sizes = bench::parse_sizes(sizes)?;
    let samples = bench::run(&svc, &sizes)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&samples)?);
        return Ok(());
    }

    println!(
        "{:>12}  {:>12}  {:>12}  (PBKDF2 iterations: {})",
        "size",
        "encrypt",
        "decrypt",
        svc.params().kdf.iterations
    );
    for s in &samples {
        println!(
            "{:>12}  {:>9.2} ms  {:>9.2} ms",
            format_bytes(s.size as u64),
            s.encrypt_ms,
            s.decrypt_ms
        );
    }
    Ok(())
}

// ── `pwseal config show` ──────────────────────────────────────────────────────

fn cmd_config_show(config: &PwsealConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(config).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
