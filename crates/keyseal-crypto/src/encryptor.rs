//! The encrypt/decrypt contract shared by every backend

use crate::backend::BackendKind;
use crate::error::CryptoResult;

/// Authenticated encryption over byte payloads.
///
/// Implementations are stateless between calls and safe to share across
/// threads. `encrypt` draws a fresh nonce/IV every time; `decrypt` either
/// returns the complete plaintext or an error, never a partial result.
pub trait Encryptor: Send + Sync {
    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>>;

    fn decrypt(&self, ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>>;
}

/// Encryptor returned by the factory. Hides which backend was selected.
pub struct AuthenticatedEncryptor {
    kind: BackendKind,
    inner: Box<dyn Encryptor>,
}

impl AuthenticatedEncryptor {
    pub(crate) fn new(kind: BackendKind, inner: Box<dyn Encryptor>) -> Self {
        Self { kind, inner }
    }

    /// Which backend serves this encryptor (diagnostics only)
    pub fn backend(&self) -> BackendKind {
        self.kind
    }
}

impl Encryptor for AuthenticatedEncryptor {
    fn encrypt(&self, plaintext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        self.inner.encrypt(plaintext, aad)
    }

    fn decrypt(&self, ciphertext: &[u8], aad: &[u8]) -> CryptoResult<Vec<u8>> {
        self.inner.decrypt(ciphertext, aad)
    }
}

impl std::fmt::Debug for AuthenticatedEncryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedEncryptor")
            .field("backend", &self.kind)
            .finish_non_exhaustive()
    }
}
