//! # DMPC Envelopes
//!
//! Wire formats that package an operation for transport.
//!
//! ## Overview
//!
//! Two envelope forms nest inside each other:
//!
//! - **Temporary**: hybrid-encrypted for one or more recipients with a
//!   single-use symmetric key. The key is wrapped to every recipient and
//!   recipients find their entry by decrypting a challenge.
//! - **Permanent**: encrypted under a long-lived pre-shared key named by
//!   `keyId`, plus an issuer and a certifier signature over the plaintext
//!   digest.
//!
//! A permanent envelope is typically serialized and carried as the payload
//! of a temporary one.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dmpc_core::{KeyId, PrivateKey, RequestType, SymmetricKey, SymmetricNonce, UserId};
//! use dmpc_envelope::{
//!     PermanentEncryptedOperation, PermanentSealRequest, SignerKey, TemporarySealer,
//! };
//!
//! # fn main() -> dmpc_envelope::Result<()> {
//! let (issuer, certifier, recipient) =
//!     (PrivateKey::generate()?, PrivateKey::generate()?, PrivateKey::generate()?);
//! let key = SymmetricKey::generate();
//!
//! let permanent = PermanentEncryptedOperation::seal(PermanentSealRequest {
//!     key_id: KeyId::new("KEY_ID"),
//!     key: &key,
//!     nonce: SymmetricNonce::generate(),
//!     request_type: RequestType::USERS,
//!     payload: b"REQUEST_PAYLOAD",
//!     issuer: (&issuer).into(),
//!     certifier: (&certifier).into(),
//! })?;
//!
//! let sealed = TemporarySealer::new(permanent.encode()?, "challenge")
//!     .recipient(recipient.public_key())
//!     .seal()?;
//!
//! let inner = sealed.operation.open(&recipient, "challenge")?;
//! let opened = PermanentEncryptedOperation::decode(&inner)?.open(
//!     &key,
//!     &SignerKey::new(UserId::new("issuer"), issuer.public_key()),
//!     &SignerKey::new(UserId::new("certifier"), certifier.public_key()),
//! )?;
//! assert_eq!(opened.payload, b"REQUEST_PAYLOAD");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod permanent;
pub mod temporary;
pub mod wire;

pub use error::{EnvelopeError, Result};
pub use permanent::{
    OpenedOperation, PermanentAuthenticationFields, PermanentEncryptedOperation,
    PermanentEncryptionFields, PermanentMetaFields, PermanentSealRequest, SignerKey,
    VerifiedSigners,
};
pub use temporary::{
    SealedTemporary, TemporaryEncryptedOperation, TemporaryEncryptionFields, TemporarySealer,
    TEMPORARY_VERSION,
};
pub use wire::{SignatureSource, WireField};
