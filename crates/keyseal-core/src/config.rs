use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KeysealError, KeysealResult};
use crate::types::{EncryptionAlgorithm, ValidationAlgorithm};

/// Top-level configuration (loaded from keyseal.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysealConfig {
    pub algorithms: AlgorithmConfig,
    pub platform: PlatformConfig,
    pub logging: LoggingConfig,
}

impl KeysealConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    pub fn load(path: &Path) -> KeysealResult<Self> {
        match Self::read(path)? {
            Some(config) => Ok(config),
            None => {
                tracing::warn!(
                    "config file not found: {}  (using defaults)",
                    path.display()
                );
                Ok(Self::default())
            }
        }
    }

    /// Read configuration from `path` without logging. Returns `None` when the
    /// file does not exist, for callers that install a subscriber afterwards.
    pub fn read(path: &Path) -> KeysealResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| KeysealError::Config(format!("parsing {}: {e}", path.display())))
    }
}

/// Algorithm selection for newly created keys
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmConfig {
    /// Cipher (default: AES-256-CBC)
    pub encryption_algorithm: EncryptionAlgorithm,
    /// HMAC paired with a CBC cipher (default: HMACSHA256 for CBC); must be
    /// omitted for GCM
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_algorithm: Option<ValidationAlgorithm>,
    /// Use the native provider for CBC+HMAC when it is available (default: true)
    pub prefer_native: bool,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            encryption_algorithm: EncryptionAlgorithm::Aes256Cbc,
            validation_algorithm: None,
            prefer_native: true,
        }
    }
}

/// Override for the native-crypto capability probe
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeOverride {
    /// Probe the host once at startup
    #[default]
    Auto,
    /// Treat native crypto (including AEAD) as available
    Native,
    /// Treat the host as having no native provider
    Portable,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub force_native: NativeOverride,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[algorithms]
encryption_algorithm = "AES-128-GCM"
prefer_native = false

[platform]
force_native = "portable"

[logging]
level = "debug"
format = "json"
"#;
        let config: KeysealConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(
            config.algorithms.encryption_algorithm,
            EncryptionAlgorithm::Aes128Gcm
        );
        assert!(config.algorithms.validation_algorithm.is_none());
        assert!(!config.algorithms.prefer_native);
        assert_eq!(config.platform.force_native, NativeOverride::Portable);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_parse_defaults() {
        let config: KeysealConfig = toml::from_str("").unwrap();

        assert_eq!(
            config.algorithms.encryption_algorithm,
            EncryptionAlgorithm::Aes256Cbc
        );
        assert!(config.algorithms.validation_algorithm.is_none());
        assert!(config.algorithms.prefer_native);
        assert_eq!(config.platform.force_native, NativeOverride::Auto);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_explicit_validation_algorithm_kept() {
        let toml_str = r#"
[algorithms]
encryption_algorithm = "AES-192-CBC"
validation_algorithm = "HMACSHA512"
"#;
        let config: KeysealConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.algorithms.validation_algorithm,
            Some(ValidationAlgorithm::HmacSha512)
        );
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let toml_str = r#"
[algorithms]
encryption_algorithm = "DES-CBC"
"#;
        assert!(toml::from_str::<KeysealConfig>(toml_str).is_err());

        let toml_str = r#"
[algorithms]
validation_algorithm = "HMACMD5"
"#;
        assert!(toml::from_str::<KeysealConfig>(toml_str).is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let config = KeysealConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: KeysealConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(
            config.algorithms.encryption_algorithm,
            parsed.algorithms.encryption_algorithm
        );
        assert_eq!(
            config.algorithms.validation_algorithm,
            parsed.algorithms.validation_algorithm
        );
        assert_eq!(config.logging.format, parsed.logging.format);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = KeysealConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.platform.force_native, NativeOverride::Auto);
    }

    #[test]
    fn test_read_distinguishes_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("keyseal.toml");
        assert!(KeysealConfig::read(&path).unwrap().is_none());

        std::fs::write(&path, "[logging]\nformat = \"json\"\n").unwrap();
        let config = KeysealConfig::read(&path).unwrap().unwrap();
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_load_reports_parse_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("keyseal.toml");
        std::fs::write(&path, "[algorithms]\nprefer_native = \"yes\"\n").unwrap();

        let err = KeysealConfig::load(&path).unwrap_err();
        assert!(matches!(err, KeysealError::Config(_)));
    }
}
