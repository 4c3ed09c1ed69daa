//! Ticket identifiers.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Size of a ticket in random bytes.
pub const TICKET_SIZE: usize = 16;

/// Opaque handle on one submitted operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(String);

impl Ticket {
    /// A fresh random ticket, hex-encoded.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TICKET_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Ticket {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
