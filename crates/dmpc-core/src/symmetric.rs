//! Symmetric cipher adapter.
//!
//! Wraps ChaCha20-Poly1305 authenticated encryption. Both envelope forms use
//! it: temporary envelopes with a single-use key, permanent envelopes with a
//! long-lived pre-shared key. Nonce uniqueness per key is the caller's job.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};

/// Symmetric key length in bytes.
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Symmetric nonce length in bytes.
pub const SYMMETRIC_NONCE_SIZE: usize = 12;

/// A 256-bit symmetric key for ChaCha20-Poly1305.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Generate a new random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SYMMETRIC_KEY_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SYMMETRIC_KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, failing if the length is not [`SYMMETRIC_KEY_SIZE`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SYMMETRIC_KEY_SIZE] = bytes.try_into().map_err(|_| {
            CoreError::Crypto(format!(
                "invalid symmetric key length: expected {}, got {}",
                SYMMETRIC_KEY_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }

    /// Encrypt `plaintext`, binding `associated_data` into the tag.
    pub fn encrypt(
        &self,
        associated_data: &[u8],
        nonce: &SymmetricNonce,
        plaintext: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CoreError::Crypto(e.to_string()))?;

        cipher
            .encrypt(
                Nonce::from_slice(&nonce.0),
                Payload {
                    msg: plaintext,
                    aad: associated_data,
                },
            )
            .map_err(|_| CoreError::Crypto("symmetric encryption failed".into()))
    }

    /// Decrypt `ciphertext`.
    ///
    /// Fails on any tag mismatch (tampered data, wrong key, wrong nonce or
    /// wrong associated data). No plaintext is returned on failure.
    pub fn decrypt(
        &self,
        associated_data: &[u8],
        nonce: &SymmetricNonce,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>> {
        let cipher = ChaCha20Poly1305::new_from_slice(&self.0)
            .map_err(|e| CoreError::Crypto(e.to_string()))?;

        cipher
            .decrypt(
                Nonce::from_slice(&nonce.0),
                Payload {
                    msg: ciphertext,
                    aad: associated_data,
                },
            )
            .map_err(|_| CoreError::Crypto("symmetric authentication failed".into()))
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricKey(..)")
    }
}

/// A 96-bit nonce for ChaCha20-Poly1305.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymmetricNonce([u8; SYMMETRIC_NONCE_SIZE]);

impl SymmetricNonce {
    /// Generate a new random nonce.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SYMMETRIC_NONCE_SIZE];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SYMMETRIC_NONCE_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, failing if the length is not [`SYMMETRIC_NONCE_SIZE`].
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; SYMMETRIC_NONCE_SIZE] = bytes.try_into().map_err(|_| {
            CoreError::Crypto(format!(
                "invalid nonce length: expected {}, got {}",
                SYMMETRIC_NONCE_SIZE,
                bytes.len()
            ))
        })?;
        Ok(Self(arr))
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SYMMETRIC_NONCE_SIZE] {
        &self.0
    }
}

/// Encrypt with raw key and nonce bytes.
///
/// Fails with [`CoreError::Crypto`] if either length is wrong.
pub fn encrypt(
    key: &[u8],
    associated_data: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let key = SymmetricKey::from_slice(key)?;
    let nonce = SymmetricNonce::from_slice(nonce)?;
    key.encrypt(associated_data, &nonce, plaintext)
}

/// Decrypt with raw key and nonce bytes.
pub fn decrypt(
    key: &[u8],
    associated_data: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let key = SymmetricKey::from_slice(key)?;
    let nonce = SymmetricNonce::from_slice(nonce)?;
    key.decrypt(associated_data, &nonce, ciphertext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    #[test]
    fn test_encrypt_decrypt() {
        let key = SymmetricKey::generate();
        let nonce = SymmetricNonce::generate();
        let plaintext = b"hello, world!";

        let ciphertext = key.encrypt(&[], &nonce, plaintext).unwrap();
        assert_ne!(ciphertext, plaintext);

        let decrypted = key.decrypt(&[], &nonce, &ciphertext).unwrap();
        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_decrypt_wrong_key_fails() {
        let key1 = SymmetricKey::generate();
        let key2 = SymmetricKey::generate();
        let nonce = SymmetricNonce::generate();

        let ciphertext = key1.encrypt(&[], &nonce, b"secret").unwrap();

        let err = key2.decrypt(&[], &nonce, &ciphertext).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_decrypt_wrong_nonce_fails() {
        let key = SymmetricKey::generate();
        let ciphertext = key
            .encrypt(&[], &SymmetricNonce::from_bytes([1; 12]), b"secret")
            .unwrap();

        assert!(key
            .decrypt(&[], &SymmetricNonce::from_bytes([2; 12]), &ciphertext)
            .is_err());
    }

    #[test]
    fn test_associated_data_is_authenticated() {
        let key = SymmetricKey::generate();
        let nonce = SymmetricNonce::generate();
        let ciphertext = key.encrypt(b"header-a", &nonce, b"body").unwrap();

        assert!(key.decrypt(b"header-b", &nonce, &ciphertext).is_err());
        assert_eq!(key.decrypt(b"header-a", &nonce, &ciphertext).unwrap(), b"body");
    }

    #[test]
    fn test_tampered_ciphertext_fails() {
        let key = SymmetricKey::generate();
        let nonce = SymmetricNonce::generate();
        let mut ciphertext = key.encrypt(&[], &nonce, b"payload").unwrap();
        ciphertext[0] ^= 0x01;

        assert_eq!(
            key.decrypt(&[], &nonce, &ciphertext).unwrap_err().kind(),
            ErrorKind::Crypto
        );
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        assert_eq!(
            encrypt(&[0u8; 16], &[], &[0u8; 12], b"x").unwrap_err().kind(),
            ErrorKind::Crypto
        );
        assert_eq!(
            decrypt(&[0u8; 32], &[], &[0u8; 8], b"x").unwrap_err().kind(),
            ErrorKind::Crypto
        );
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let key = SymmetricKey::from_bytes([0x42; 32]);
        assert_eq!(format!("{:?}", key), "SymmetricKey(..)");
    }

    proptest! {
        #[test]
        fn prop_raw_roundtrip(
            key in any::<[u8; 32]>(),
            nonce in any::<[u8; 12]>(),
            aad in prop::collection::vec(any::<u8>(), 0..32),
            plaintext in prop::collection::vec(any::<u8>(), 0..512),
        ) {
            let ciphertext = encrypt(&key, &aad, &nonce, &plaintext).unwrap();
            prop_assert_eq!(decrypt(&key, &aad, &nonce, &ciphertext).unwrap(), plaintext);
        }
    }
}
