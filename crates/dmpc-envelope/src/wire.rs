//! Wire helpers shared by both envelope forms.

use serde::{de::DeserializeOwned, Serialize};

use dmpc_core::{base64_decode, base64_encode, PrivateKey, PayloadDigest};

use crate::error::{EnvelopeError, Result};

/// A binary field as handed to a raw envelope constructor.
///
/// `Raw` bytes are base64-encoded on the way in. `Encoded` text is placed on
/// the wire verbatim, which is how tests smuggle malformed fields in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireField {
    Raw(Vec<u8>),
    Encoded(String),
}

impl WireField {
    pub(crate) fn into_text(self) -> String {
        match self {
            WireField::Raw(bytes) => base64_encode(bytes),
            WireField::Encoded(text) => text,
        }
    }
}

impl From<Vec<u8>> for WireField {
    fn from(bytes: Vec<u8>) -> Self {
        WireField::Raw(bytes)
    }
}

impl From<&[u8]> for WireField {
    fn from(bytes: &[u8]) -> Self {
        WireField::Raw(bytes.to_vec())
    }
}

/// Where a permanent envelope's signature comes from.
///
/// `Key` signs the payload digest for real. The fixed variants inject
/// pre-computed (usually wrong) signatures: `Fixed` bytes are base64-encoded,
/// `FixedEncoded` text goes on the wire as is.
#[derive(Debug, Clone)]
pub enum SignatureSource<'a> {
    Key(&'a PrivateKey),
    Fixed(Vec<u8>),
    FixedEncoded(String),
}

impl SignatureSource<'_> {
    pub(crate) fn signature_text(&self, digest: &PayloadDigest) -> Result<String> {
        match self {
            SignatureSource::Key(key) => Ok(base64_encode(key.sign(digest)?)),
            SignatureSource::Fixed(bytes) => Ok(base64_encode(bytes)),
            SignatureSource::FixedEncoded(text) => Ok(text.clone()),
        }
    }
}

impl<'a> From<&'a PrivateKey> for SignatureSource<'a> {
    fn from(key: &'a PrivateKey) -> Self {
        SignatureSource::Key(key)
    }
}

pub(crate) fn decode_field(name: &str, text: &str) -> Result<Vec<u8>> {
    base64_decode(text).map_err(|e| EnvelopeError::Parse(format!("{}: {}", name, e)))
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| EnvelopeError::Serialization(e.to_string()))
}

pub(crate) fn from_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| EnvelopeError::Parse(format!("invalid envelope: {}", e)))
}
