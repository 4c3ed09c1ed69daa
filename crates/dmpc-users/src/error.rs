//! Error types for the users module.
//!
//! The merge engine itself never fails: stale timestamps and unknown field
//! paths are reported through the merge report. These errors cover request
//! decoding and directory lookups only.

use dmpc_core::UserId;
use thiserror::Error;

/// Errors that can occur while decoding or routing a users request.
#[derive(Debug, Error)]
pub enum UsersError {
    /// Malformed request payload.
    #[error("invalid users request: {0}")]
    Parse(String),

    /// Update for a user that does not exist.
    #[error("unknown user: {0}")]
    UnknownUser(UserId),

    /// Create for a user id that is already taken.
    #[error("user already exists: {0}")]
    UserExists(UserId),
}

/// Result type for users operations.
pub type Result<T> = std::result::Result<T, UsersError>;
