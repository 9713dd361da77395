//! Algorithm descriptions and their mapping onto concrete backends

use keyseal_core::config::AlgorithmConfig;
use keyseal_core::{EncryptionAlgorithm, ValidationAlgorithm};
use ring::{aead, hmac};

use crate::error::{CryptoError, CryptoResult};

/// Immutable description of how payloads are protected under one key.
///
/// The two variants are closed: an AEAD spec cannot carry an HMAC, and a
/// classical spec always has one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgorithmSpec {
    Aead {
        cipher: EncryptionAlgorithm,
        prefer_native: bool,
    },
    Classical {
        cipher: EncryptionAlgorithm,
        validation: ValidationAlgorithm,
        prefer_native: bool,
    },
}

impl AlgorithmSpec {
    /// AES-GCM spec. Fails for CBC ciphers and for AES-192-GCM, which no
    /// backend implements.
    pub fn aead(cipher: EncryptionAlgorithm) -> CryptoResult<Self> {
        if !cipher.is_gcm() {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "{cipher} is not an AEAD cipher"
            )));
        }
        if native_aead_algorithm(cipher).is_none() {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "{cipher} has no AEAD implementation"
            )));
        }
        Ok(Self::Aead {
            cipher,
            prefer_native: true,
        })
    }

    /// AES-CBC + HMAC spec. Fails for GCM ciphers.
    pub fn classical(
        cipher: EncryptionAlgorithm,
        validation: ValidationAlgorithm,
    ) -> CryptoResult<Self> {
        if cipher.is_gcm() {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "{cipher} cannot be paired with {validation}"
            )));
        }
        Ok(Self::Classical {
            cipher,
            validation,
            prefer_native: true,
        })
    }

    /// Bind a configuration section, rejecting mismatched combinations. A CBC
    /// cipher with no validation algorithm is paired with HMACSHA256.
    pub fn from_config(config: &AlgorithmConfig) -> CryptoResult<Self> {
        let cipher = config.encryption_algorithm;
        let spec = match (cipher.is_gcm(), config.validation_algorithm) {
            (true, None) => Self::aead(cipher)?,
            (true, Some(validation)) => {
                return Err(CryptoError::UnsupportedAlgorithm(format!(
                    "{cipher} authenticates on its own; remove validation_algorithm ({validation})"
                )))
            }
            (false, validation) => Self::classical(
                cipher,
                validation.unwrap_or(ValidationAlgorithm::HmacSha256),
            )?,
        };
        Ok(spec.with_prefer_native(config.prefer_native))
    }

    pub fn with_prefer_native(self, prefer: bool) -> Self {
        match self {
            Self::Aead { cipher, .. } => Self::Aead {
                cipher,
                prefer_native: prefer,
            },
            Self::Classical {
                cipher, validation, ..
            } => Self::Classical {
                cipher,
                validation,
                prefer_native: prefer,
            },
        }
    }

    pub fn is_aead_algorithm(&self) -> bool {
        matches!(self, Self::Aead { .. })
    }

    pub fn cipher(&self) -> EncryptionAlgorithm {
        match *self {
            Self::Aead { cipher, .. } | Self::Classical { cipher, .. } => cipher,
        }
    }

    pub fn validation(&self) -> Option<ValidationAlgorithm> {
        match *self {
            Self::Aead { .. } => None,
            Self::Classical { validation, .. } => Some(validation),
        }
    }

    pub fn prefer_native(&self) -> bool {
        match *self {
            Self::Aead { prefer_native, .. } | Self::Classical { prefer_native, .. } => {
                prefer_native
            }
        }
    }

    pub fn cipher_key_len(&self) -> usize {
        self.cipher().key_len()
    }

    pub fn validation_key_len(&self) -> usize {
        self.validation().map_or(0, ValidationAlgorithm::key_len)
    }

    /// Total secret length: cipher key, followed by the HMAC key if any.
    pub fn key_material_len(&self) -> usize {
        self.cipher_key_len() + self.validation_key_len()
    }

    /// Map the abstract algorithm choice onto the parameters `family` needs.
    pub fn derive_backend_configuration(
        &self,
        family: BackendFamily,
    ) -> CryptoResult<BackendConfiguration> {
        match (*self, family) {
            (Self::Aead { cipher, .. }, BackendFamily::NativeAead) => {
                let algorithm = native_aead_algorithm(cipher).ok_or_else(|| {
                    CryptoError::UnsupportedAlgorithm(format!(
                        "{cipher} has no native AEAD implementation"
                    ))
                })?;
                Ok(BackendConfiguration::NativeAead {
                    algorithm,
                    key_len: cipher.key_len(),
                })
            }
            (
                Self::Classical {
                    cipher, validation, ..
                },
                BackendFamily::NativeClassical,
            ) => {
                let hmac = match validation {
                    ValidationAlgorithm::HmacSha256 => hmac::HMAC_SHA256,
                    ValidationAlgorithm::HmacSha512 => hmac::HMAC_SHA512,
                };
                Ok(BackendConfiguration::NativeCbc {
                    key_len: cipher.key_len(),
                    hmac,
                    validation,
                })
            }
            (
                Self::Classical {
                    cipher, validation, ..
                },
                BackendFamily::Managed,
            ) => Ok(BackendConfiguration::ManagedCbc {
                key_len: cipher.key_len(),
                validation,
            }),
            (spec, family) => Err(CryptoError::UnsupportedAlgorithm(format!(
                "{} has no mapping for the {family:?} backend family",
                spec.cipher()
            ))),
        }
    }
}

fn native_aead_algorithm(cipher: EncryptionAlgorithm) -> Option<&'static aead::Algorithm> {
    match cipher {
        EncryptionAlgorithm::Aes128Gcm => Some(&aead::AES_128_GCM),
        EncryptionAlgorithm::Aes256Gcm => Some(&aead::AES_256_GCM),
        _ => None,
    }
}

/// Backend families a spec can be mapped onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendFamily {
    NativeAead,
    NativeClassical,
    Managed,
}

/// Concrete parameters for one backend
#[derive(Debug, Clone, Copy)]
pub enum BackendConfiguration {
    NativeAead {
        algorithm: &'static aead::Algorithm,
        key_len: usize,
    },
    NativeCbc {
        key_len: usize,
        hmac: hmac::Algorithm,
        validation: ValidationAlgorithm,
    },
    ManagedCbc {
        key_len: usize,
        validation: ValidationAlgorithm,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyseal_core::config::KeysealConfig;

    #[test]
    fn test_aead_rejects_cbc_cipher() {
        assert!(AlgorithmSpec::aead(EncryptionAlgorithm::Aes256Cbc).is_err());
        assert!(AlgorithmSpec::aead(EncryptionAlgorithm::Aes256Gcm).is_ok());
    }

    #[test]
    fn test_classical_rejects_gcm_cipher() {
        let result = AlgorithmSpec::classical(
            EncryptionAlgorithm::Aes128Gcm,
            ValidationAlgorithm::HmacSha256,
        );
        assert!(matches!(result, Err(CryptoError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn test_key_material_len() {
        let spec = AlgorithmSpec::classical(
            EncryptionAlgorithm::Aes192Cbc,
            ValidationAlgorithm::HmacSha512,
        )
        .unwrap();
        assert_eq!(spec.key_material_len(), 24 + 64);

        let spec = AlgorithmSpec::aead(EncryptionAlgorithm::Aes128Gcm).unwrap();
        assert_eq!(spec.key_material_len(), 16);
        assert_eq!(spec.validation_key_len(), 0);
    }

    #[test]
    fn test_from_config_binds_valid_pairs() {
        let spec = AlgorithmSpec::from_config(&AlgorithmConfig::default()).unwrap();
        assert_eq!(
            spec,
            AlgorithmSpec::classical(
                EncryptionAlgorithm::Aes256Cbc,
                ValidationAlgorithm::HmacSha256
            )
            .unwrap()
        );

        let config = AlgorithmConfig {
            encryption_algorithm: EncryptionAlgorithm::Aes256Gcm,
            validation_algorithm: None,
            prefer_native: false,
        };
        let spec = AlgorithmSpec::from_config(&config).unwrap();
        assert!(spec.is_aead_algorithm());
        assert!(!spec.prefer_native());
    }

    #[test]
    fn test_from_config_rejects_mismatched_pairs() {
        let gcm_with_hmac = AlgorithmConfig {
            encryption_algorithm: EncryptionAlgorithm::Aes128Gcm,
            validation_algorithm: Some(ValidationAlgorithm::HmacSha256),
            prefer_native: true,
        };
        assert!(AlgorithmSpec::from_config(&gcm_with_hmac).is_err());
    }

    #[test]
    fn test_from_config_defaults_cbc_validation() {
        let cbc_without_hmac = AlgorithmConfig {
            encryption_algorithm: EncryptionAlgorithm::Aes128Cbc,
            validation_algorithm: None,
            prefer_native: true,
        };
        let spec = AlgorithmSpec::from_config(&cbc_without_hmac).unwrap();
        assert_eq!(spec.validation(), Some(ValidationAlgorithm::HmacSha256));
    }

    #[test]
    fn test_gcm_only_toml_binds_to_aead() {
        let config: KeysealConfig =
            toml::from_str("[algorithms]\nencryption_algorithm = \"AES-256-GCM\"\n").unwrap();
        let spec = AlgorithmSpec::from_config(&config.algorithms).unwrap();
        assert!(spec.is_aead_algorithm());
        assert_eq!(spec.cipher(), EncryptionAlgorithm::Aes256Gcm);
        assert_eq!(spec.key_material_len(), 32);
    }

    #[test]
    fn test_native_aead_mapping() {
        let spec = AlgorithmSpec::aead(EncryptionAlgorithm::Aes256Gcm).unwrap();
        match spec.derive_backend_configuration(BackendFamily::NativeAead) {
            Ok(BackendConfiguration::NativeAead { algorithm, key_len }) => {
                assert_eq!(key_len, 32);
                assert_eq!(algorithm.key_len(), 32);
            }
            other => panic!("unexpected mapping: {other:?}"),
        }
    }

    #[test]
    fn test_aes192_gcm_rejected_at_binding() {
        assert!(matches!(
            AlgorithmSpec::aead(EncryptionAlgorithm::Aes192Gcm),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));

        let config = AlgorithmConfig {
            encryption_algorithm: EncryptionAlgorithm::Aes192Gcm,
            validation_algorithm: None,
            prefer_native: true,
        };
        assert!(matches!(
            AlgorithmSpec::from_config(&config),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_aes192_gcm_has_no_native_mapping() {
        let spec = AlgorithmSpec::Aead {
            cipher: EncryptionAlgorithm::Aes192Gcm,
            prefer_native: true,
        };
        assert!(matches!(
            spec.derive_backend_configuration(BackendFamily::NativeAead),
            Err(CryptoError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_family_mismatch_is_unsupported() {
        let aead = AlgorithmSpec::aead(EncryptionAlgorithm::Aes128Gcm).unwrap();
        assert!(aead
            .derive_backend_configuration(BackendFamily::Managed)
            .is_err());

        let classical = AlgorithmSpec::classical(
            EncryptionAlgorithm::Aes128Cbc,
            ValidationAlgorithm::HmacSha256,
        )
        .unwrap();
        assert!(classical
            .derive_backend_configuration(BackendFamily::NativeAead)
            .is_err());
    }
}
