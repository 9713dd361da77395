//! Capability negotiation: turn a spec + secret into exactly one backend

use tracing::debug;

use crate::backend::{BackendKind, ManagedCbcEncryptor, NativeAeadEncryptor, NativeCbcEncryptor};
use crate::encryptor::{AuthenticatedEncryptor, Encryptor};
use crate::error::{CryptoError, CryptoResult};
use crate::key::Key;
use crate::platform::PlatformCapabilities;
use crate::secret::SecretMaterial;
use crate::spec::{AlgorithmSpec, BackendConfiguration, BackendFamily};

const AEAD_REQUIRES_NATIVE: &str =
    "AEAD requires native cryptography; unavailable on this platform";

/// Builds encryptors for keys handed over by the key ring.
///
/// Holds no mutable state; one instance can serve every key in the process.
#[derive(Debug, Clone, Copy)]
pub struct EncryptorFactory {
    capabilities: PlatformCapabilities,
}

impl EncryptorFactory {
    pub fn new(capabilities: PlatformCapabilities) -> Self {
        Self { capabilities }
    }

    /// Factory for the capabilities probed from this host
    pub fn detect() -> Self {
        Self::new(PlatformCapabilities::detect())
    }

    pub fn capabilities(&self) -> PlatformCapabilities {
        self.capabilities
    }

    /// Build the encryptor for a key resolved by the key ring.
    ///
    /// Returns `Ok(None)` when the key's descriptor has no algorithm configured.
    pub fn create_encryptor_instance(
        &self,
        key: &dyn Key,
    ) -> CryptoResult<Option<AuthenticatedEncryptor>> {
        let descriptor = key.descriptor();
        self.create_encryptor(descriptor.algorithm_spec(), descriptor.master_secret())
    }

    /// Select and construct the backend for `spec`.
    ///
    /// - no spec: `Ok(None)`
    /// - AEAD: native AES-GCM, or `PlatformUnsupported` without native AEAD
    /// - CBC+HMAC: native when available and preferred, managed otherwise
    pub fn create_encryptor(
        &self,
        spec: Option<&AlgorithmSpec>,
        secret: &SecretMaterial,
    ) -> CryptoResult<Option<AuthenticatedEncryptor>> {
        let Some(spec) = spec else {
            debug!("no algorithm configured; no encryptor created");
            return Ok(None);
        };
        secret.check_len(spec)?;

        let (kind, inner): (BackendKind, Box<dyn Encryptor>) = if spec.is_aead_algorithm() {
            if !self.capabilities.native_aead_available {
                return Err(CryptoError::PlatformUnsupported(AEAD_REQUIRES_NATIVE));
            }
            (BackendKind::NativeAead, self.build(spec, BackendFamily::NativeAead, secret)?)
        } else if self.capabilities.native_available && spec.prefer_native() {
            (
                BackendKind::NativeCbc,
                self.build(spec, BackendFamily::NativeClassical, secret)?,
            )
        } else {
            (BackendKind::ManagedCbc, self.build(spec, BackendFamily::Managed, secret)?)
        };

        debug!(
            backend = %kind,
            cipher = %spec.cipher(),
            validation = ?spec.validation(),
            "constructed authenticated encryptor"
        );
        Ok(Some(AuthenticatedEncryptor::new(kind, inner)))
    }

    fn build(
        &self,
        spec: &AlgorithmSpec,
        family: BackendFamily,
        secret: &SecretMaterial,
    ) -> CryptoResult<Box<dyn Encryptor>> {
        let config = spec.derive_backend_configuration(family)?;
        secret.with_bytes(|bytes| -> CryptoResult<Box<dyn Encryptor>> {
            let encryptor: Box<dyn Encryptor> = match config {
                BackendConfiguration::NativeAead { algorithm, key_len } => {
                    Box::new(NativeAeadEncryptor::new(algorithm, key_len, bytes)?)
                }
                BackendConfiguration::NativeCbc {
                    key_len,
                    hmac,
                    validation,
                } => Box::new(NativeCbcEncryptor::new(key_len, hmac, validation, bytes)?),
                BackendConfiguration::ManagedCbc {
                    key_len,
                    validation,
                } => Box::new(ManagedCbcEncryptor::new(key_len, validation, bytes)?),
            };
            Ok(encryptor)
        })
    }
}
