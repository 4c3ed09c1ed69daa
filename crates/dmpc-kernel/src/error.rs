//! Error types for the Kernel.

use dmpc_core::{ErrorKind, KeyId, RequestType};
use dmpc_envelope::EnvelopeError;
use dmpc_status::{FailReason, StatusError};
use dmpc_users::UsersError;
use thiserror::Error;

/// Errors that can occur while processing an operation.
#[derive(Debug, Error)]
pub enum KernelError {
    /// Envelope could not be opened.
    #[error("envelope error: {0}")]
    Envelope(#[from] EnvelopeError),

    /// Users request could not be decoded or applied.
    #[error("users error: {0}")]
    Users(#[from] UsersError),

    /// Status could not be recorded.
    #[error("status error: {0}")]
    Status(#[from] StatusError),

    /// No permanent key is registered under this id.
    #[error("unknown key id: {0}")]
    UnknownKeyId(KeyId),

    /// The operation carries a request type this kernel does not handle.
    #[error("unsupported request type: {0}")]
    UnsupportedRequestType(RequestType),

    /// Signers verified but lack the permission the request needs.
    #[error("not authorized: {0}")]
    NotAuthorized(String),
}

impl KernelError {
    /// Failure reason recorded against the ticket.
    ///
    /// Anything that means the operation could not be trusted is
    /// `Rejected`; everything else is `Failed`.
    pub fn failure_reason(&self) -> FailReason {
        match self {
            KernelError::Envelope(e) if e.kind() == ErrorKind::Authentication => {
                FailReason::Rejected
            }
            KernelError::UnknownKeyId(_) | KernelError::NotAuthorized(_) => FailReason::Rejected,
            _ => FailReason::Failed,
        }
    }
}

/// Result type for Kernel operations.
pub type Result<T> = std::result::Result<T, KernelError>;
