//! AES-CBC with PKCS#7 padding, shared by both CBC+HMAC backends

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::{Aes128, Aes192, Aes256};
use zeroize::Zeroizing;

use crate::error::{CryptoError, CryptoResult};
use crate::IV_SIZE;

type Aes128CbcEnc = cbc::Encryptor<Aes128>;
type Aes192CbcEnc = cbc::Encryptor<Aes192>;
type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes128CbcDec = cbc::Decryptor<Aes128>;
type Aes192CbcDec = cbc::Decryptor<Aes192>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// AES key for CBC mode. Zeroized on drop.
pub(crate) struct CbcCipher {
    key: Zeroizing<Vec<u8>>,
}

impl CbcCipher {
    pub(crate) fn new(key: &[u8]) -> CryptoResult<Self> {
        match key.len() {
            16 | 24 | 32 => Ok(Self {
                key: Zeroizing::new(key.to_vec()),
            }),
            other => Err(CryptoError::UnsupportedAlgorithm(format!(
                "no AES variant takes a {other}-byte key"
            ))),
        }
    }

    pub(crate) fn encrypt(&self, iv: &[u8; IV_SIZE], plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let invalid = |_| CryptoError::Internal("AES-CBC key setup failed");
        let ciphertext = match self.key.len() {
            16 => Aes128CbcEnc::new_from_slices(&self.key, iv)
                .map_err(invalid)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            24 => Aes192CbcEnc::new_from_slices(&self.key, iv)
                .map_err(invalid)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
            _ => Aes256CbcEnc::new_from_slices(&self.key, iv)
                .map_err(invalid)?
                .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        };
        Ok(ciphertext)
    }

    /// Decrypt an already-authenticated ciphertext. A padding failure still
    /// reports as tampering.
    pub(crate) fn decrypt(&self, iv: &[u8], ciphertext: &[u8]) -> CryptoResult<Vec<u8>> {
        let invalid = |_| CryptoError::MalformedInput("invalid IV length");
        let plaintext = match self.key.len() {
            16 => Aes128CbcDec::new_from_slices(&self.key, iv)
                .map_err(invalid)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            24 => Aes192CbcDec::new_from_slices(&self.key, iv)
                .map_err(invalid)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
            _ => Aes256CbcDec::new_from_slices(&self.key, iv)
                .map_err(invalid)?
                .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        };
        plaintext.map_err(|_| CryptoError::TamperDetected)
    }
}
