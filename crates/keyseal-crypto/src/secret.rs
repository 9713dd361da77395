//! Raw key material with scoped, zeroized exposure

use secrecy::{ExposeSecret, SecretSlice};
use zeroize::{Zeroize, Zeroizing};

use crate::error::{CryptoError, CryptoResult};
use crate::spec::AlgorithmSpec;

/// Raw symmetric key bytes owned by a key descriptor.
///
/// The backing store is zeroized on drop. Bytes leave the holder only through
/// [`SecretMaterial::with_bytes`], which lends a scratch copy for the duration
/// of one callback.
pub struct SecretMaterial {
    bytes: SecretSlice<u8>,
}

impl SecretMaterial {
    /// Wrap key bytes, checking the length against what `spec` expects.
    pub fn new(bytes: Vec<u8>, spec: &AlgorithmSpec) -> CryptoResult<Self> {
        let secret = Self::from_bytes(bytes);
        secret.check_len(spec)?;
        Ok(secret)
    }

    /// Wrap key bytes without validation. The factory still checks the length
    /// before building an encryptor.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: SecretSlice::from(bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.expose_secret().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lend the key bytes to `f`.
    ///
    /// The slice points at a scratch copy that is zeroed when this call
    /// returns, including when `f` panics.
    pub fn with_bytes<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        lend(Zeroizing::new(self.bytes.expose_secret().to_vec()), |scratch| {
            f(scratch.as_slice())
        })
    }

    pub(crate) fn check_len(&self, spec: &AlgorithmSpec) -> CryptoResult<()> {
        let expected = spec.key_material_len();
        if self.len() != expected {
            return Err(CryptoError::KeyLengthMismatch {
                expected,
                actual: self.len(),
            });
        }
        Ok(())
    }
}

/// Run `f` against `scratch`, which is wiped when it drops at the end of this
/// call, on return or unwind.
fn lend<T: Zeroize, R>(scratch: Zeroizing<T>, f: impl FnOnce(&T) -> R) -> R {
    f(&scratch)
}

impl std::fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretMaterial")
            .field("len", &self.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
