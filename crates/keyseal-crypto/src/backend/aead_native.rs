//! AES-GCM through the native provider
//!
//! There is deliberately no portable counterpart: the factory refuses AEAD
//! specs on hosts without native support.

use ring::aead::{self, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};

use super::format::{gcm_aad, parse_gcm, GCM_VERSION};
use crate::encryptor::Encryptor;
use crate::error::{CryptoError, CryptoResult};
use crate::{NONCE_SIZE, TAG_SIZE};

pub(crate) struct NativeAeadEncryptor {
    key: LessSafeKey,
    rng: SystemRandom,
}

impl NativeAeadEncryptor {
    pub(crate) fn new(
        algorithm: &'static aead::Algorithm,
        key_len: usize,
        secret: &[u8],
    ) -> CryptoResult<Self> {
        if secret.len() != key_len {
            return Err(CryptoError::KeyLengthMismatch {
                expected: key_len,
                actual: secret.len(),
            });
        }
        let unbound = UnboundKey::new(algorithm, secret)
            .map_err(|_| CryptoError::UnsupportedAlgorithm(format!("{algorithm:?} rejected key")))?;
        Ok(Self {
            key: LessSafeKey::new(unbound),
            rng: SystemRandom::new(),
        })
    }
}

impl Encryptor for NativeAeadEncryptor {
    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        self.rng
            .fill(&mut nonce_bytes)
            .map_err(|_| CryptoError::Internal("system random source failed"))?;
        let nonce = Nonce::assume_unique_for_key(nonce_bytes);

        let mut out = Vec::with_capacity(1 + NONCE_SIZE + plaintext.len() + TAG_SIZE);
        out.push(GCM_VERSION);
        out.extend_from_slice(&nonce_bytes);
        out.extend_from_slice(plaintext);

        let bound = gcm_aad(aad);
        let tag = self
            .key
            .seal_in_place_separate_tag(nonce, Aad::from(bound.as_slice()), &mut out[1 + NONCE_SIZE..])
            .map_err(|_| CryptoError::Internal("AES-GCM seal failed"))?;
        out.extend_from_slice(tag.as_ref());
        Ok(out)
    }

    fn decrypt(&self, ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        let (nonce_bytes, sealed) = parse_gcm(ciphertext)?;
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| CryptoError::MalformedInput("invalid nonce length"))?;

        let bound = gcm_aad(aad);
        let mut in_out = sealed.to_vec();
        let plaintext_len = self
            .key
            .open_in_place(nonce, Aad::from(bound.as_slice()), &mut in_out)
            .map_err(|_| CryptoError::TamperDetected)?
            .len();
        in_out.truncate(plaintext_len);
        Ok(in_out)
    }
}
