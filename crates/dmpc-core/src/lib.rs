//! # DMPC Core
//!
//! Cryptographic primitives shared by the envelope formats: a symmetric
//! cipher adapter, an asymmetric key adapter, payload digests, and the text
//! encodings binary fields and public keys travel in.
//!
//! This crate contains no I/O. Every operation is synchronous and CPU-bound,
//! so unrelated calls are safe to run in parallel.
//!
//! ## Key Types
//!
//! - [`SymmetricKey`] / [`SymmetricNonce`] - ChaCha20-Poly1305 key and nonce
//! - [`PrivateKey`] / [`PublicKey`] - RSA key pair, OAEP and PKCS#1 v1.5
//! - [`PayloadDigest`] - SHA-256 digest that signatures are computed over
//! - [`KeyId`], [`UserId`], [`RequestType`] - identifier newtypes
//!
//! ## Errors
//!
//! [`CoreError`] has three kinds: `Crypto` (structural failure),
//! `Authentication` (trust check failed), `Parse` (bad text encoding).

pub mod asymmetric;
pub mod encoding;
pub mod error;
pub mod symmetric;
pub mod types;

pub use asymmetric::{
    PayloadDigest, PrivateKey, PublicKey, ASYMMETRIC_KEY_SIZE_BITS, PUBLIC_KEY_PEM_LABEL,
};
pub use encoding::{base64_decode, base64_encode};
pub use error::{CoreError, ErrorKind, Result};
pub use symmetric::{SymmetricKey, SymmetricNonce, SYMMETRIC_KEY_SIZE, SYMMETRIC_NONCE_SIZE};
pub use types::{KeyId, RequestType, UserId};
