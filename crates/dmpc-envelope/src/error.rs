//! Error types for the envelope formats.

use dmpc_core::{CoreError, ErrorKind};
use thiserror::Error;

/// Errors that can occur while sealing or opening an envelope.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Cipher or key failure (tag mismatch, bad key or nonce length).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// No challenge matched, or a signature did not verify.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Malformed envelope text: bad JSON, base64, version, or flags.
    #[error("parse error: {0}")]
    Parse(String),

    /// Envelope could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EnvelopeError {
    /// The classification of this error. Serialization failures count as
    /// encoding problems.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnvelopeError::Crypto(_) => ErrorKind::Crypto,
            EnvelopeError::Authentication(_) => ErrorKind::Authentication,
            EnvelopeError::Parse(_) | EnvelopeError::Serialization(_) => ErrorKind::Parse,
        }
    }
}

impl From<CoreError> for EnvelopeError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Crypto(msg) => EnvelopeError::Crypto(msg),
            CoreError::Authentication(msg) => EnvelopeError::Authentication(msg),
            CoreError::Parse(msg) => EnvelopeError::Parse(msg),
        }
    }
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
