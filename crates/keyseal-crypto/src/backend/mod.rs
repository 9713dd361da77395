//! Backend variants behind the [`Encryptor`](crate::Encryptor) contract

mod aead_native;
mod cbc;
mod cbc_managed;
mod cbc_native;
mod format;

pub(crate) use aead_native::NativeAeadEncryptor;
pub(crate) use cbc_managed::ManagedCbcEncryptor;
pub(crate) use cbc_native::NativeCbcEncryptor;

use std::fmt;

/// Which backend an [`AuthenticatedEncryptor`](crate::AuthenticatedEncryptor) wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// AES-GCM through the native provider
    NativeAead,
    /// AES-CBC with native HMAC validation
    NativeCbc,
    /// AES-CBC with portable HMAC validation
    ManagedCbc,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NativeAead => "native-aead",
            Self::NativeCbc => "native-cbc-hmac",
            Self::ManagedCbc => "managed-cbc-hmac",
        })
    }
}
