//! keyseal-crypto: authenticated encryption with algorithm agility
//!
//! An [`AlgorithmSpec`] plus a [`SecretMaterial`] goes into the
//! [`EncryptorFactory`], which picks exactly one backend and hands back an
//! [`AuthenticatedEncryptor`]:
//!
//! ```text
//! AlgorithmSpec ──┬── Aead ───────┬── native AEAD available ──> ring AES-GCM
//!                 │               └── otherwise ──────────────> PlatformUnsupported
//!                 └── Classical ──┬── native available ───────> AES-CBC + ring HMAC
//!                                 └── otherwise ──────────────> AES-CBC + RustCrypto HMAC
//! ```
//!
//! Payload formats:
//! ```text
//! CBC+HMAC: [0x01][16 IV][ciphertext, PKCS#7][HMAC tag]
//!   tag = HMAC(0x01 || IV || ciphertext || AAD || be64(|AAD|) || be64(|ciphertext|))
//! GCM:      [0x02][12 nonce][ciphertext][16 tag]   AAD' = 0x02 || AAD
//! ```
//!
//! Native and managed CBC+HMAC produce the same bytes for the same key, so a
//! payload written by one decrypts with the other.

mod backend;
pub mod encryptor;
pub mod error;
pub mod factory;
pub mod key;
pub mod platform;
pub mod secret;
pub mod spec;

pub use backend::BackendKind;
pub use encryptor::{AuthenticatedEncryptor, Encryptor};
pub use error::{CryptoError, CryptoResult};
pub use factory::EncryptorFactory;
pub use key::{Key, KeyDescriptor};
pub use keyseal_core::{EncryptionAlgorithm, ValidationAlgorithm};
pub use platform::PlatformCapabilities;
pub use secret::SecretMaterial;
pub use spec::{AlgorithmSpec, BackendConfiguration, BackendFamily};

/// Size of the CBC initialization vector (one AES block)
pub const IV_SIZE: usize = 16;

/// Size of an AES-GCM nonce (96-bit)
pub const NONCE_SIZE: usize = 12;

/// Size of an AES-GCM authentication tag
pub const TAG_SIZE: usize = 16;
