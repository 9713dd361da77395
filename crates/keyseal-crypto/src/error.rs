use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// No backend can satisfy the requested algorithm or key size.
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// The algorithm needs a capability this host lacks.
    #[error("platform unsupported: {0}")]
    PlatformUnsupported(&'static str),

    #[error("invalid key material length: expected {expected} bytes, got {actual}")]
    KeyLengthMismatch { expected: usize, actual: usize },

    /// Authentication failed. Deliberately carries no detail about the cause.
    #[error("the payload was invalid or was not protected by this key")]
    TamperDetected,

    #[error("malformed payload: {0}")]
    MalformedInput(&'static str),

    #[error("internal cryptographic failure: {0}")]
    Internal(&'static str),
}

impl CryptoError {
    /// True for every failure a decrypt caller should treat as "not a valid
    /// payload for this key".
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, Self::TamperDetected | Self::MalformedInput(_))
    }
}
