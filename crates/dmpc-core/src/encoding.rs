//! Transport-safe text encodings.
//!
//! Binary envelope fields travel as standard (padded) base64.

use base64::{engine::general_purpose, Engine as _};

use crate::error::{CoreError, Result};

/// Encode bytes as standard base64.
pub fn base64_encode(bytes: impl AsRef<[u8]>) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard base64 text.
pub fn base64_decode(text: &str) -> Result<Vec<u8>> {
    general_purpose::STANDARD
        .decode(text)
        .map_err(|e| CoreError::Parse(format!("invalid base64: {}", e)))
}
