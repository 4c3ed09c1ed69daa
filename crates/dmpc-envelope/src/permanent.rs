//! Permanent encrypted operations.
//!
//! A permanent envelope is encrypted under a long-lived symmetric key that
//! both ends already share, identified on the wire only by `keyId`. It also
//! carries two detached signatures over the SHA-256 digest of the
//! *plaintext* payload: one by the issuer who originated the request and one
//! by a certifier who attests it. Both must verify for the envelope to open.

use serde::{Deserialize, Serialize};

use dmpc_core::{
    KeyId, PayloadDigest, PublicKey, RequestType, SymmetricKey, SymmetricNonce, UserId,
};

use crate::error::{EnvelopeError, Result};
use crate::wire::{decode_field, from_json, to_json, SignatureSource, WireField};

/// Encryption metadata of a permanent envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermanentEncryptionFields {
    pub encrypted: bool,
    pub key_id: KeyId,
    pub nonce: String,
}

/// A base64 detached signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentAuthenticationFields {
    pub signature: String,
}

/// Request metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermanentMetaFields {
    pub request_type: RequestType,
}

/// A permanent encrypted operation, in its wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentEncryptedOperation {
    pub encryption: PermanentEncryptionFields,
    pub issue: PermanentAuthenticationFields,
    pub certification: PermanentAuthenticationFields,
    pub meta: PermanentMetaFields,

    /// base64 payload ciphertext.
    pub payload: String,
}

/// Everything needed to seal a permanent envelope.
#[derive(Debug, Clone)]
pub struct PermanentSealRequest<'a> {
    pub key_id: KeyId,
    pub key: &'a SymmetricKey,
    pub nonce: SymmetricNonce,
    pub request_type: RequestType,
    pub payload: &'a [u8],
    pub issuer: SignatureSource<'a>,
    pub certifier: SignatureSource<'a>,
}

/// A known signing identity and its public key.
#[derive(Debug, Clone)]
pub struct SignerKey {
    pub id: UserId,
    pub key: PublicKey,
}

impl SignerKey {
    pub fn new(id: UserId, key: PublicKey) -> Self {
        Self { id, key }
    }
}

/// The identities whose signatures verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSigners {
    pub issuer_id: UserId,
    pub certifier_id: UserId,
}

/// A successfully opened permanent envelope.
#[derive(Debug, Clone)]
pub struct OpenedOperation {
    pub key_id: KeyId,
    pub request_type: RequestType,
    pub signers: VerifiedSigners,
    pub payload: Vec<u8>,
}

impl PermanentEncryptedOperation {
    /// Encrypt the payload and sign its plaintext digest twice.
    pub fn seal(request: PermanentSealRequest<'_>) -> Result<Self> {
        let ciphertext = request.key.encrypt(&[], &request.nonce, request.payload)?;

        let digest = PayloadDigest::of(request.payload);
        let issuer_signature = request.issuer.signature_text(&digest)?;
        let certifier_signature = request.certifier.signature_text(&digest)?;

        Ok(Self::from_parts(
            true,
            request.key_id,
            WireField::Raw(request.nonce.as_bytes().to_vec()),
            WireField::Encoded(issuer_signature),
            WireField::Encoded(certifier_signature),
            request.request_type,
            WireField::Raw(ciphertext),
        ))
    }

    /// Assemble an envelope from already computed parts.
    pub fn from_parts(
        encrypted: bool,
        key_id: KeyId,
        nonce: WireField,
        issuer_signature: WireField,
        certifier_signature: WireField,
        request_type: RequestType,
        payload: WireField,
    ) -> Self {
        Self {
            encryption: PermanentEncryptionFields {
                encrypted,
                key_id,
                nonce: nonce.into_text(),
            },
            issue: PermanentAuthenticationFields {
                signature: issuer_signature.into_text(),
            },
            certification: PermanentAuthenticationFields {
                signature: certifier_signature.into_text(),
            },
            meta: PermanentMetaFields { request_type },
            payload: payload.into_text(),
        }
    }

    /// The identifier of the symmetric key this envelope was sealed under.
    pub fn key_id(&self) -> &KeyId {
        &self.encryption.key_id
    }

    /// The request type tag.
    pub fn request_type(&self) -> RequestType {
        self.meta.request_type
    }

    /// Decrypt with `key` and verify both signatures against the given
    /// signers.
    pub fn open(
        &self,
        key: &SymmetricKey,
        issuer: &SignerKey,
        certifier: &SignerKey,
    ) -> Result<OpenedOperation> {
        let (payload, digest) = self.decrypt_payload(key)?;
        let (issuer_signature, certifier_signature) = self.decode_signatures()?;

        if !issuer.key.verify(&digest, &issuer_signature)? {
            tracing::warn!(key_id = %self.encryption.key_id, "issuer signature did not verify");
            return Err(EnvelopeError::Authentication(
                "issuer signature did not verify".into(),
            ));
        }
        if !certifier.key.verify(&digest, &certifier_signature)? {
            tracing::warn!(key_id = %self.encryption.key_id, "certifier signature did not verify");
            return Err(EnvelopeError::Authentication(
                "certifier signature did not verify".into(),
            ));
        }

        Ok(self.opened(
            payload,
            VerifiedSigners {
                issuer_id: issuer.id.clone(),
                certifier_id: certifier.id.clone(),
            },
        ))
    }

    /// Decrypt with `key` and discover which of `candidates` signed.
    ///
    /// The issuer is the first candidate whose key verifies the issue
    /// signature; the certifier is the first *other* candidate verifying the
    /// certification signature. A single identity never fills both roles.
    pub fn open_with_candidates(
        &self,
        key: &SymmetricKey,
        candidates: &[SignerKey],
    ) -> Result<OpenedOperation> {
        let (payload, digest) = self.decrypt_payload(key)?;
        let (issuer_signature, certifier_signature) = self.decode_signatures()?;

        let verifies = |candidate: &&SignerKey, signature: &[u8]| {
            matches!(candidate.key.verify(&digest, signature), Ok(true))
        };

        let issuer = candidates
            .iter()
            .find(|c| verifies(c, issuer_signature.as_slice()))
            .ok_or_else(|| {
                tracing::warn!(key_id = %self.encryption.key_id, "no known issuer signed");
                EnvelopeError::Authentication("issuer signature did not verify".into())
            })?;

        let certifier = candidates
            .iter()
            .filter(|c| c.id != issuer.id)
            .find(|c| verifies(c, certifier_signature.as_slice()))
            .ok_or_else(|| {
                tracing::warn!(key_id = %self.encryption.key_id, "no known certifier signed");
                EnvelopeError::Authentication("certifier signature did not verify".into())
            })?;

        Ok(self.opened(
            payload,
            VerifiedSigners {
                issuer_id: issuer.id.clone(),
                certifier_id: certifier.id.clone(),
            },
        ))
    }

    /// Serialize to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        to_json(self)
    }

    /// Deserialize from JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        from_json(bytes)
    }

    fn decrypt_payload(&self, key: &SymmetricKey) -> Result<(Vec<u8>, PayloadDigest)> {
        if !self.encryption.encrypted {
            return Err(EnvelopeError::Parse("operation is not encrypted".into()));
        }

        let nonce = SymmetricNonce::from_slice(&decode_field("nonce", &self.encryption.nonce)?)?;
        let ciphertext = decode_field("payload", &self.payload)?;
        let payload = key.decrypt(&[], &nonce, &ciphertext)?;
        let digest = PayloadDigest::of(&payload);

        Ok((payload, digest))
    }

    fn decode_signatures(&self) -> Result<(Vec<u8>, Vec<u8>)> {
        Ok((
            decode_field("issuer signature", &self.issue.signature)?,
            decode_field("certifier signature", &self.certification.signature)?,
        ))
    }

    fn opened(&self, payload: Vec<u8>, signers: VerifiedSigners) -> OpenedOperation {
        OpenedOperation {
            key_id: self.encryption.key_id.clone(),
            request_type: self.meta.request_type,
            signers,
            payload,
        }
    }
}
