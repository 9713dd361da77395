pub mod config;
pub mod error;
pub mod types;

pub use error::{KeysealError, KeysealResult};
pub use types::{EncryptionAlgorithm, ValidationAlgorithm};
