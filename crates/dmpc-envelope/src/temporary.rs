//! Temporary encrypted operations.
//!
//! A temporary envelope carries a payload to one or more recipients without
//! any pre-shared secret. The sealer picks a single-use symmetric key and
//! nonce, encrypts the payload and a challenge string under them, and then
//! wraps the symmetric key to every recipient's public key. Each wrapped key
//! becomes a key in the `challenges` map; its value is the encrypted
//! challenge.
//!
//! A recipient does not know which entry is theirs. Opening tries every
//! entry: the first one whose wrapped key decrypts with the recipient's
//! private key *and* whose challenge decrypts to the expected plaintext
//! wins. Map order is unspecified, so nothing may rely on which entry is
//! tried first.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use dmpc_core::{
    PrivateKey, PublicKey, SymmetricKey, SymmetricNonce, ASYMMETRIC_KEY_SIZE_BITS,
};

use crate::error::{EnvelopeError, Result};
use crate::wire::{decode_field, from_json, to_json, WireField};

/// The only temporary envelope version this crate reads and writes.
pub const TEMPORARY_VERSION: f64 = 0.1;

/// Encryption metadata of a temporary envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEncryptionFields {
    pub encrypted: bool,

    /// base64(wrapped symmetric key) -> base64(encrypted challenge).
    pub challenges: HashMap<String, String>,

    /// base64 nonce shared by the payload and every challenge.
    pub nonce: String,
}

/// A temporary encrypted operation, in its wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEncryptedOperation {
    pub version: f64,
    pub encryption: TemporaryEncryptionFields,

    /// base64 payload ciphertext.
    pub payload: String,
}

/// Output of [`TemporarySealer::seal`].
#[derive(Debug)]
pub struct SealedTemporary {
    pub operation: TemporaryEncryptedOperation,

    /// Set when no recipient was supplied: the key pair generated so the
    /// caller can act as the recipient.
    pub generated_key: Option<PrivateKey>,
}

/// Builder for temporary envelopes.
pub struct TemporarySealer {
    payload: Vec<u8>,
    challenge: String,
    recipients: Vec<PublicKey>,
    extra_entries: Vec<(String, String)>,
    generated_key_bits: usize,
}

impl TemporarySealer {
    /// Start sealing `payload` with the plaintext `challenge`.
    pub fn new(payload: impl Into<Vec<u8>>, challenge: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            challenge: challenge.into(),
            recipients: Vec::new(),
            extra_entries: Vec::new(),
            generated_key_bits: ASYMMETRIC_KEY_SIZE_BITS,
        }
    }

    /// Address the envelope to `recipient`.
    pub fn recipient(mut self, recipient: PublicKey) -> Self {
        self.recipients.push(recipient);
        self
    }

    /// Address the envelope to every key in `recipients`.
    pub fn recipients(mut self, recipients: impl IntoIterator<Item = PublicKey>) -> Self {
        self.recipients.extend(recipients);
        self
    }

    /// Insert a raw challenge entry verbatim, next to the real ones.
    pub fn extra_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_entries.push((key.into(), value.into()));
        self
    }

    /// Modulus size used if a recipient key pair has to be generated.
    pub fn generated_key_bits(mut self, bits: usize) -> Self {
        self.generated_key_bits = bits;
        self
    }

    /// Encrypt and produce the envelope.
    pub fn seal(self) -> Result<SealedTemporary> {
        let key = SymmetricKey::generate();
        let nonce = SymmetricNonce::generate();

        let payload_ciphertext = key.encrypt(&[], &nonce, &self.payload)?;
        let challenge_ciphertext = key.encrypt(&[], &nonce, self.challenge.as_bytes())?;
        let challenge_text = WireField::Raw(challenge_ciphertext).into_text();

        let mut recipients = self.recipients;
        let generated_key = if recipients.is_empty() {
            let private = PrivateKey::generate_with_bits(self.generated_key_bits)?;
            recipients.push(private.public_key());
            Some(private)
        } else {
            None
        };

        let mut challenges = HashMap::with_capacity(recipients.len() + self.extra_entries.len());
        for recipient in &recipients {
            let wrapped = recipient.encrypt(key.as_bytes())?;
            challenges.insert(WireField::Raw(wrapped).into_text(), challenge_text.clone());
        }
        challenges.extend(self.extra_entries);

        let operation = TemporaryEncryptedOperation::from_parts(
            true,
            challenges,
            WireField::Raw(nonce.as_bytes().to_vec()),
            WireField::Raw(payload_ciphertext),
        );

        Ok(SealedTemporary {
            operation,
            generated_key,
        })
    }
}

impl TemporaryEncryptedOperation {
    /// Assemble an envelope from already computed parts.
    pub fn from_parts(
        encrypted: bool,
        challenges: HashMap<String, String>,
        nonce: WireField,
        payload: WireField,
    ) -> Self {
        Self {
            version: TEMPORARY_VERSION,
            encryption: TemporaryEncryptionFields {
                encrypted,
                challenges,
                nonce: nonce.into_text(),
            },
            payload: payload.into_text(),
        }
    }

    /// Recover the payload with `private_key`, proving possession by
    /// decrypting a challenge equal to `expected_challenge`.
    pub fn open(&self, private_key: &PrivateKey, expected_challenge: &str) -> Result<Vec<u8>> {
        if self.version != TEMPORARY_VERSION {
            return Err(EnvelopeError::Parse(format!(
                "unsupported temporary envelope version: {}",
                self.version
            )));
        }
        if !self.encryption.encrypted {
            return Err(EnvelopeError::Parse("operation is not encrypted".into()));
        }

        let nonce = SymmetricNonce::from_slice(&decode_field("nonce", &self.encryption.nonce)?)?;
        let payload_ciphertext = decode_field("payload", &self.payload)?;

        let key = self
            .encryption
            .challenges
            .iter()
            .find_map(|(wrapped, challenge)| {
                try_entry(private_key, &nonce, wrapped, challenge, expected_challenge)
            })
            .ok_or_else(|| {
                tracing::debug!(
                    entries = self.encryption.challenges.len(),
                    "no temporary challenge matched"
                );
                EnvelopeError::Authentication("no challenge matched".into())
            })?;

        Ok(key.decrypt(&[], &nonce, &payload_ciphertext)?)
    }

    /// Serialize to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        to_json(self)
    }

    /// Deserialize from JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        from_json(bytes)
    }
}

/// Attempt one challenge entry. Any failure means "not ours".
fn try_entry(
    private_key: &PrivateKey,
    nonce: &SymmetricNonce,
    wrapped: &str,
    challenge: &str,
    expected_challenge: &str,
) -> Option<SymmetricKey> {
    let wrapped = decode_field("challenge key", wrapped).ok()?;
    let key = SymmetricKey::from_slice(&private_key.decrypt(&wrapped).ok()?).ok()?;

    let challenge = decode_field("challenge", challenge).ok()?;
    let plaintext = key.decrypt(&[], nonce, &challenge).ok()?;

    (plaintext == expected_challenge.as_bytes()).then_some(key)
}
