//! AES-CBC with HMAC validation through the native provider

use keyseal_core::ValidationAlgorithm;
use ring::hmac;
use ring::rand::{SecureRandom, SystemRandom};

use super::cbc::CbcCipher;
use super::format::{assemble_cbc, mac_input, parse_cbc};
use crate::encryptor::Encryptor;
use crate::error::{CryptoError, CryptoResult};
use crate::IV_SIZE;

pub(crate) struct NativeCbcEncryptor {
    cipher: CbcCipher,
    mac_key: hmac::Key,
    tag_len: usize,
    rng: SystemRandom,
}

impl NativeCbcEncryptor {
    /// `secret` is `encryption key || validation key`.
    pub(crate) fn new(
        key_len: usize,
        algorithm: hmac::Algorithm,
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
            mac_key: hmac::Key::new(algorithm, mac_key),
            tag_len: validation.tag_len(),
            rng: SystemRandom::new(),
        })
    }
}

impl Encryptor for NativeCbcEncryptor {
    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut iv = [0u8; IV_SIZE];
        self.rng
            .fill(&mut iv)
            .map_err(|_| CryptoError::Internal("system random source failed"))?;

        let ciphertext = self.cipher.encrypt(&iv, plaintext)?;
        let tag = hmac::sign(&self.mac_key, &mac_input(&iv, &ciphertext, aad));
        Ok(assemble_cbc(&iv, &ciphertext, tag.as_ref()))
    }

    fn decrypt(&self, ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let payload = parse_cbc(ciphertext, self.tag_len)?;
        hmac::verify(
            &self.mac_key,
            &mac_input(payload.iv, payload.ciphertext, aad),
            payload.tag,
        )
        .map_err(|_| CryptoError::TamperDetected)?;
        self.cipher.decrypt(payload.iv, payload.ciphertext)
    }
}
