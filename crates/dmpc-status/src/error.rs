//! Error types for status tracking.

use thiserror::Error;

use crate::codes::StatusCode;
use crate::ticket::Ticket;

/// Errors that can occur while recording a status update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    /// Status code outside the known enumeration.
    #[error("status code out of range: {0}")]
    StatusOutOfRange(u8),

    /// Failure reason outside the known enumeration.
    #[error("failure reason out of range: {0}")]
    ReasonOutOfRange(u8),

    /// Ticket was never issued.
    #[error("unknown ticket: {0}")]
    UnknownTicket(Ticket),

    /// Transition not allowed by the ticket lifecycle.
    #[error("invalid status transition: {from:?} -> {to:?}")]
    InvalidTransition { from: StatusCode, to: StatusCode },
}

/// Result type for status operations.
pub type Result<T> = std::result::Result<T, StatusError>;
