//! keyseal: protect and unprotect payloads from the command line
//!
//! Commands:
//!   demo                 - interactive protect/unprotect round trip under a throwaway key
//!   keygen               - print a random key sized for the configured algorithm
//!   encrypt <plaintext>  - protect a UTF-8 payload, print base64url
//!   decrypt <payload>    - unprotect a base64url payload
//!   probe                - show platform capabilities and the backend selection
//!   config show          - display the effective configuration

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use clap::{Parser, Subcommand, ValueEnum};
use rand::RngCore;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use keyseal_core::config::KeysealConfig;
use keyseal_crypto::{
    AlgorithmSpec, AuthenticatedEncryptor, Encryptor, EncryptorFactory, KeyDescriptor,
    PlatformCapabilities, SecretMaterial,
};

/// Purpose bound into every payload the demo protects
const DEMO_PURPOSE: &[u8] = b"keyseal.demo";

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "keyseal",
    version,
    about = "Authenticated payload protection",
    long_about = "keyseal: protect tokens and secrets with AES-GCM or AES-CBC+HMAC, \
                  using the native crypto provider when the host has one"
)]
struct Cli {
    /// Path to keyseal.toml configuration file
    #[arg(long, short = 'c', env = "KEYSEAL_CONFIG", default_value = "keyseal.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long, env = "KEYSEAL_LOG")]
    log: Option<String>,

    /// Log format; overrides the config file
    #[arg(long, env = "KEYSEAL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prompt for input, protect it under a fresh key, then unprotect it
    Demo,

    /// Print a random base64url key sized for the configured algorithm
    Keygen,

    /// Protect a UTF-8 payload
    Encrypt {
        /// Payload to protect
        plaintext: String,
        /// Key material (base64url, no padding)
        #[arg(long, env = "KEYSEAL_KEY")]
        key: String,
        /// Additional authenticated data
        #[arg(long, default_value = "")]
        aad: String,
    },

    /// Unprotect a base64url payload
    Decrypt {
        /// Protected payload (base64url, no padding)
        payload: String,
        /// Key material (base64url, no padding)
        #[arg(long, env = "KEYSEAL_KEY")]
        key: String,
        /// Additional authenticated data supplied at protect time
        #[arg(long, default_value = "")]
        aad: String,
    },

    /// Show detected capabilities and which backend the configured algorithm uses
    Probe,

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

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

/// Configuration bound once at startup
struct Runtime {
    config: KeysealConfig,
    spec: AlgorithmSpec,
    factory: EncryptorFactory,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = KeysealConfig::read(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    let (level, format) = log_settings(&cli, &config);
    init_logging(&level, &format);
    if !found {
        warn!(
            "config file not found: {}  (using defaults)",
            cli.config.display()
        );
    }

    // Bad algorithm combinations fail here, before any payload is touched.
    let spec = AlgorithmSpec::from_config(&config.algorithms)
        .context("binding [algorithms] configuration")?;
    let factory = EncryptorFactory::new(PlatformCapabilities::from_override(
        config.platform.force_native,
    ));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        cipher = %spec.cipher(),
        "keyseal starting"
    );

    let rt = Runtime {
        config,
        spec,
        factory,
    };

    match cli.command {
        Commands::Demo => cmd_demo(&rt),
        Commands::Keygen => cmd_keygen(&rt),
        Commands::Encrypt {
            plaintext,
            key,
            aad,
        } => cmd_encrypt(&rt, &plaintext, &key, &aad),
        Commands::Decrypt { payload, key, aad } => cmd_decrypt(&rt, &payload, &key, &aad),
        Commands::Probe => cmd_probe(&rt),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&rt.config, &cli.config),
    }
}

/// Command-line flags win over the `[logging]` section.
fn log_settings(cli: &Cli, config: &KeysealConfig) -> (String, LogFormat) {
    let level = cli.log.clone().unwrap_or_else(|| config.logging.level.clone());
    let format = cli.log_format.clone().unwrap_or(match config.logging.format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    });
    (level, format)
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Logs go to stderr so stdout carries only command output.
    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Key handling ──────────────────────────────────────────────────────────────

fn generate_key(spec: &AlgorithmSpec) -> Vec<u8> {
    let mut bytes = vec![0u8; spec.key_material_len()];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

fn encryptor_from_key(rt: &Runtime, key_b64: &str) -> Result<AuthenticatedEncryptor> {
    let bytes = URL_SAFE_NO_PAD
        .decode(key_b64.trim())
        .context("key is not valid base64url")?;
    let descriptor = KeyDescriptor::new(rt.spec, SecretMaterial::from_bytes(bytes))
        .context("key does not match the configured algorithm")?;
    rt.factory
        .create_encryptor_instance(&descriptor)?
        .context("no algorithm configured")
}

// ── `keyseal demo` ────────────────────────────────────────────────────────────

fn cmd_demo(rt: &Runtime) -> Result<()> {
    let descriptor = KeyDescriptor::new(rt.spec, SecretMaterial::from_bytes(generate_key(&rt.spec)))?;
    let encryptor = rt
        .factory
        .create_encryptor_instance(&descriptor)?
        .context("no algorithm configured")?;

    print!("Enter input: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("reading input")?;
    let input = input.trim_end_matches(['\r', '\n']);

    let protected = encryptor.encrypt(input.as_bytes(), DEMO_PURPOSE)?;
    println!("Protect returned: {}", URL_SAFE_NO_PAD.encode(&protected));

    let unprotected = encryptor.decrypt(&protected, DEMO_PURPOSE)?;
    println!(
        "Unprotect returned: {}",
        String::from_utf8(unprotected).context("unprotected payload is not UTF-8")?
    );
    Ok(())
}

// ── `keyseal keygen` ──────────────────────────────────────────────────────────

fn cmd_keygen(rt: &Runtime) -> Result<()> {
    println!("{}", URL_SAFE_NO_PAD.encode(generate_key(&rt.spec)));
    Ok(())
}

// ── `keyseal encrypt` / `keyseal decrypt` ─────────────────────────────────────

fn cmd_encrypt(rt: &Runtime, plaintext: &str, key: &str, aad: &str) -> Result<()> {
    let encryptor = encryptor_from_key(rt, key)?;
    let protected = encryptor.encrypt(plaintext.as_bytes(), aad.as_bytes())?;
    println!("{}", URL_SAFE_NO_PAD.encode(protected));
    Ok(())
}

fn cmd_decrypt(rt: &Runtime, payload: &str, key: &str, aad: &str) -> Result<()> {
    let encryptor = encryptor_from_key(rt, key)?;
    let protected = URL_SAFE_NO_PAD
        .decode(payload.trim())
        .context("payload is not valid base64url")?;
    let plaintext = encryptor.decrypt(&protected, aad.as_bytes())?;
    println!(
        "{}",
        String::from_utf8(plaintext).context("unprotected payload is not UTF-8")?
    );
    Ok(())
}

// ── `keyseal probe` ───────────────────────────────────────────────────────────

fn cmd_probe(rt: &Runtime) -> Result<()> {
    let caps = rt.factory.capabilities();
    println!("native provider:   {}", yes_no(caps.native_available));
    println!("native AEAD:       {}", yes_no(caps.native_aead_available));
    match rt.spec.validation() {
        Some(validation) => println!("algorithm:         {} + {validation}", rt.spec.cipher()),
        None => println!("algorithm:         {}", rt.spec.cipher()),
    }
    println!("prefer native:     {}", yes_no(rt.spec.prefer_native()));

    let secret = SecretMaterial::from_bytes(generate_key(&rt.spec));
    match rt.factory.create_encryptor(Some(&rt.spec), &secret) {
        Ok(Some(encryptor)) => println!("backend:           {}", encryptor.backend()),
        Ok(None) => println!("backend:           none"),
        Err(e) => println!("backend:           unavailable ({e})"),
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

// ── `keyseal config show` ─────────────────────────────────────────────────────

fn cmd_config_show(config: &KeysealConfig, config_path: &Path) -> Result<()> {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_flags_override_config() {
        let cli = Cli::parse_from(["keyseal", "--log", "debug", "--log-format", "json", "probe"]);
        let (level, format) = log_settings(&cli, &KeysealConfig::default());
        assert_eq!(level, "debug");
        assert!(matches!(format, LogFormat::Json));
    }

    #[test]
    fn test_log_settings_fall_back_to_config() {
        let cli = Cli::parse_from(["keyseal", "probe"]);
        let mut config = KeysealConfig::default();
        config.logging.level = "warn".into();
        config.logging.format = "json".into();
        let (level, format) = log_settings(&cli, &config);
        assert_eq!(level, "warn");
        assert!(matches!(format, LogFormat::Json));
    }
}
