//! Boundary with the key ring
//!
//! The key ring owns key identity, expiry and rotation. The factory only ever
//! looks at the algorithm spec and the master secret carried by a descriptor.

use crate::error::CryptoResult;
use crate::secret::SecretMaterial;
use crate::spec::AlgorithmSpec;

/// Algorithm + secret pair attached to one key
#[derive(Debug)]
pub struct KeyDescriptor {
    algorithm_spec: Option<AlgorithmSpec>,
    master_secret: SecretMaterial,
}

impl KeyDescriptor {
    /// Build a descriptor, checking the secret length against `spec`.
    pub fn new(spec: AlgorithmSpec, master_secret: SecretMaterial) -> CryptoResult<Self> {
        master_secret.check_len(&spec)?;
        Ok(Self {
            algorithm_spec: Some(spec),
            master_secret,
        })
    }

    /// A descriptor for a key with no encryption configured.
    pub fn unconfigured(master_secret: SecretMaterial) -> Self {
        Self {
            algorithm_spec: None,
            master_secret,
        }
    }

    pub fn algorithm_spec(&self) -> Option<&AlgorithmSpec> {
        self.algorithm_spec.as_ref()
    }

    pub fn master_secret(&self) -> &SecretMaterial {
        &self.master_secret
    }
}

/// A key as resolved by the key ring
pub trait Key {
    fn descriptor(&self) -> &KeyDescriptor;
}

impl Key for KeyDescriptor {
    fn descriptor(&self) -> &KeyDescriptor {
        self
    }
}
