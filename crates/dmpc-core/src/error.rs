//! Error types for DMPC Core.

use thiserror::Error;

/// Classification of a core failure.
///
/// Callers branch on this rather than on message text: a `Crypto` failure
/// means the data is corrupt or the key is wrong, an `Authentication`
/// failure means a trust check did not pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Crypto,
    Authentication,
    Parse,
}

/// Errors raised by the cipher and key adapters.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A cipher or key operation failed for structural reasons: bad key
    /// length, malformed ciphertext, authentication tag mismatch.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// A semantic verification step did not pass.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Malformed textual encoding (base64, PEM, DER, key type).
    #[error("parse error: {0}")]
    Parse(String),
}

impl CoreError {
    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::Crypto(_) => ErrorKind::Crypto,
            CoreError::Authentication(_) => ErrorKind::Authentication,
            CoreError::Parse(_) => ErrorKind::Parse,
        }
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
