//! Portable AES-CBC + HMAC built on RustCrypto primitives

use hmac::{Hmac, Mac};
use keyseal_core::ValidationAlgorithm;
use rand::{rngs::OsRng, RngCore};
use sha2::{Sha256, Sha512};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use super::cbc::CbcCipher;
use super::format::{assemble_cbc, mac_input, parse_cbc};
use crate::encryptor::Encryptor;
use crate::error::{CryptoError, CryptoResult};
use crate::IV_SIZE;

pub(crate) struct ManagedCbcEncryptor {
    cipher: CbcCipher,
    mac_key: Zeroizing<Vec<u8>>,
    validation: ValidationAlgorithm,
}

impl ManagedCbcEncryptor {
    /// `secret` is `encryption key || validation key`.
    pub(crate) fn new(
        key_len: usize,
        validation: ValidationAlgorithm,
        secret: &[u8],
    ) -> CryptoResult<Self> {
        let expected = key_len + validation.key_len();
        if secret.len() != expected {
            return Err(CryptoError::KeyLengthMismatch {
                expected,
                actual: secret.len(),
            });
        }
        let (enc_key, mac_key) = secret.split_at(key_len);
        Ok(Self {
            cipher: CbcCipher::new(enc_key)?,
            mac_key: Zeroizing::new(mac_key.to_vec()),
            validation,
        })
    }

    fn sign(&self, data: &[u8]) -> CryptoResult<Vec<u8>> {
        let tag = match self.validation {
            ValidationAlgorithm::HmacSha256 => {
                let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&self.mac_key)
                    .map_err(|_| CryptoError::Internal("HMAC key setup failed"))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
            ValidationAlgorithm::HmacSha512 => {
                let mut mac = <Hmac<Sha512> as Mac>::new_from_slice(&self.mac_key)
                    .map_err(|_| CryptoError::Internal("HMAC key setup failed"))?;
                mac.update(data);
                mac.finalize().into_bytes().to_vec()
            }
        };
        Ok(tag)
    }
}

impl Encryptor for ManagedCbcEncryptor {
    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut iv = [0u8; IV_SIZE];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|_| CryptoError::Internal("OS random source failed"))?;

        let ciphertext = self.cipher.encrypt(&iv, plaintext)?;
        let tag = self.sign(&mac_input(&iv, &ciphertext, aad))?;
        Ok(assemble_cbc(&iv, &ciphertext, &tag))
    }

    fn decrypt(&self, ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let payload = parse_cbc(ciphertext, self.validation.tag_len())?;
        let expected = self.sign(&mac_input(payload.iv, payload.ciphertext, aad))?;
        if !bool::from(expected.ct_eq(payload.tag)) {
            return Err(CryptoError::TamperDetected);
        }
        self.cipher.decrypt(payload.iv, payload.ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encryptor(validation: ValidationAlgorithm) -> ManagedCbcEncryptor {
        let secret = vec![0x5Au8; 32 + validation.key_len()];
        ManagedCbcEncryptor::new(32, validation, &secret).unwrap()
    }

    #[test]
    fn test_roundtrip_with_aad() {
        for validation in ValidationAlgorithm::ALL {
            let enc = encryptor(validation);
            let sealed = enc.encrypt(b"session cookie", b"purpose").unwrap();
            assert_eq!(enc.decrypt(&sealed, b"purpose").unwrap(), b"session cookie");
        }
    }

    #[test]
    fn test_tag_length_follows_validation() {
        let sealed = encryptor(ValidationAlgorithm::HmacSha512)
            .encrypt(b"", b"")
            .unwrap();
        assert_eq!(sealed.len(), 1 + IV_SIZE + 16 + 64);
    }

    #[test]
    fn test_wrong_aad_is_tamper() {
        let enc = encryptor(ValidationAlgorithm::HmacSha256);
        let sealed = enc.encrypt(b"data", b"context-a").unwrap();
        assert!(matches!(
            enc.decrypt(&sealed, b"context-b"),
            Err(CryptoError::TamperDetected)
        ));
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = ManagedCbcEncryptor::new(32, ValidationAlgorithm::HmacSha256, &[0u8; 32]);
        assert!(matches!(
            result,
            Err(CryptoError::KeyLengthMismatch { expected: 64, .. })
        ));
    }
}
