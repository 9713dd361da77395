use serde::{Deserialize, Serialize};
use std::fmt;

/// Symmetric cipher selectable in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncryptionAlgorithm {
    #[serde(rename = "AES-128-CBC")]
    Aes128Cbc,
    #[serde(rename = "AES-192-CBC")]
    Aes192Cbc,
    #[serde(rename = "AES-256-CBC")]
    Aes256Cbc,
    #[serde(rename = "AES-128-GCM")]
    Aes128Gcm,
    #[serde(rename = "AES-192-GCM")]
    Aes192Gcm,
    #[serde(rename = "AES-256-GCM")]
    Aes256Gcm,
}

impl EncryptionAlgorithm {
    pub const ALL: [EncryptionAlgorithm; 6] = [
        Self::Aes128Cbc,
        Self::Aes192Cbc,
        Self::Aes256Cbc,
        Self::Aes128Gcm,
        Self::Aes192Gcm,
        Self::Aes256Gcm,
    ];

    /// Key size of the underlying block cipher, in bits
    pub fn key_size_bits(self) -> usize {
        match self {
            Self::Aes128Cbc | Self::Aes128Gcm => 128,
            Self::Aes192Cbc | Self::Aes192Gcm => 192,
            Self::Aes256Cbc | Self::Aes256Gcm => 256,
        }
    }

    pub fn key_len(self) -> usize {
        self.key_size_bits() / 8
    }

    /// GCM modes authenticate on their own and never pair with an HMAC.
    pub fn is_gcm(self) -> bool {
        matches!(self, Self::Aes128Gcm | Self::Aes192Gcm | Self::Aes256Gcm)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aes128Cbc => "AES-128-CBC",
            Self::Aes192Cbc => "AES-192-CBC",
            Self::Aes256Cbc => "AES-256-CBC",
            Self::Aes128Gcm => "AES-128-GCM",
            Self::Aes192Gcm => "AES-192-GCM",
            Self::Aes256Gcm => "AES-256-GCM",
        }
    }
}

impl fmt::Display for EncryptionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integrity algorithm paired with a CBC cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationAlgorithm {
    #[serde(rename = "HMACSHA256")]
    HmacSha256,
    #[serde(rename = "HMACSHA512")]
    HmacSha512,
}

impl ValidationAlgorithm {
    pub const ALL: [ValidationAlgorithm; 2] = [Self::HmacSha256, Self::HmacSha512];

    /// Length of the HMAC key, equal to the digest output size
    pub fn key_len(self) -> usize {
        self.tag_len()
    }

    pub fn tag_len(self) -> usize {
        match self {
            Self::HmacSha256 => 32,
            Self::HmacSha512 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HmacSha256 => "HMACSHA256",
            Self::HmacSha512 => "HMACSHA512",
        }
    }
}

impl fmt::Display for ValidationAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_sizes() {
        assert_eq!(EncryptionAlgorithm::Aes128Cbc.key_len(), 16);
        assert_eq!(EncryptionAlgorithm::Aes192Gcm.key_len(), 24);
        assert_eq!(EncryptionAlgorithm::Aes256Cbc.key_size_bits(), 256);
        assert_eq!(ValidationAlgorithm::HmacSha512.key_len(), 64);
    }

    #[test]
    fn test_gcm_classification() {
        let gcm: Vec<_> = EncryptionAlgorithm::ALL
            .iter()
            .filter(|a| a.is_gcm())
            .collect();
        assert_eq!(gcm.len(), 3);
        assert!(!EncryptionAlgorithm::Aes256Cbc.is_gcm());
    }

    #[test]
    fn test_display_matches_serde_name() {
        for alg in EncryptionAlgorithm::ALL {
            let rendered = toml::Value::try_from(alg).unwrap();
            assert_eq!(rendered.as_str(), Some(alg.as_str()));
        }
        for alg in ValidationAlgorithm::ALL {
            let rendered = toml::Value::try_from(alg).unwrap();
            assert_eq!(rendered.as_str(), Some(alg.to_string().as_str()));
        }
    }
}
