//! Asymmetric key adapter.
//!
//! RSA key pairs used for two things: wrapping single-use symmetric keys
//! (OAEP with SHA-256) and detached signatures over a pre-computed payload
//! digest (PKCS#1 v1.5 with SHA-256).
//!
//! Public keys are exchanged as PEM blocks labelled `RSA PUBLIC KEY` whose
//! body is the PKIX SubjectPublicKeyInfo DER. That exact text form is what
//! existing stored keys use, so encoding must not drift.

use pem::{EncodeConfig, LineEnding, Pem};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::{CoreError, Result};

/// Modulus size for generated key pairs.
pub const ASYMMETRIC_KEY_SIZE_BITS: usize = 2048;

/// PEM label used for serialized public keys.
pub const PUBLIC_KEY_PEM_LABEL: &str = "RSA PUBLIC KEY";

/// A SHA-256 digest of a plaintext payload.
///
/// Signatures are always produced over this digest, never over raw bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadDigest(pub [u8; 32]);

impl PayloadDigest {
    /// Compute the digest of `data`.
    pub fn of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PayloadDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha256({})", &self.to_hex()[..16])
    }
}

/// An RSA public key.
#[derive(Clone, PartialEq, Eq)]
pub struct PublicKey(RsaPublicKey);

impl PublicKey {
    /// Encrypt a short byte string to this key.
    ///
    /// The message must fit the OAEP bound for the modulus; a 32-byte
    /// symmetric key always does for the supported key sizes.
    pub fn encrypt(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.0
            .encrypt(&mut rand::thread_rng(), Oaep::new::<Sha256>(), message)
            .map_err(|e| CoreError::Crypto(format!("asymmetric encryption failed: {}", e)))
    }

    /// Verify a detached signature over `digest`.
    ///
    /// Returns `Ok(false)` when the signature simply does not verify. Only a
    /// structurally malformed signature (wrong length for this modulus) is an
    /// error.
    pub fn verify(&self, digest: &PayloadDigest, signature: &[u8]) -> Result<bool> {
        if signature.len() != self.0.size() {
            return Err(CoreError::Crypto(format!(
                "malformed signature: expected {} bytes, got {}",
                self.0.size(),
                signature.len()
            )));
        }

        Ok(self
            .0
            .verify(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes(), signature)
            .is_ok())
    }

    /// Serialize as a PEM block (`RSA PUBLIC KEY` label, PKIX DER body).
    pub fn to_pem(&self) -> Result<String> {
        let der = self
            .0
            .to_public_key_der()
            .map_err(|e| CoreError::Crypto(format!("public key encoding failed: {}", e)))?;

        let block = Pem::new(PUBLIC_KEY_PEM_LABEL, der.as_bytes().to_vec());
        Ok(pem::encode_config(
            &block,
            EncodeConfig::new().set_line_ending(LineEnding::LF),
        ))
    }

    /// Parse a PEM block holding a PKIX-encoded RSA public key.
    ///
    /// The block label is not checked. Fails with [`CoreError::Parse`] on a
    /// missing block, malformed DER, or a non-RSA key.
    pub fn from_pem(text: &str) -> Result<Self> {
        let block = pem::parse(text).map_err(|e| {
            CoreError::Parse(format!("failed to parse PEM block containing the public key: {}", e))
        })?;

        RsaPublicKey::from_public_key_der(block.contents())
            .map(Self)
            .map_err(|e| CoreError::Parse(format!("unsupported or malformed public key: {}", e)))
    }

    /// Modulus size in bytes (also the signature and ciphertext length).
    pub fn size(&self) -> usize {
        self.0.size()
    }

    /// Short hex fingerprint of the key, for logs and debug output.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.0.n().to_bytes_be());
        hasher.update(self.0.e().to_bytes_be());
        hex::encode(&hasher.finalize()[..8])
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.fingerprint())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let text = self.to_pem().map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_pem(&text).map_err(serde::de::Error::custom)
    }
}

/// An RSA private key. The matching public key is derived on demand.
#[derive(Clone)]
pub struct PrivateKey(RsaPrivateKey);

impl PrivateKey {
    /// Generate a key pair with [`ASYMMETRIC_KEY_SIZE_BITS`].
    pub fn generate() -> Result<Self> {
        Self::generate_with_bits(ASYMMETRIC_KEY_SIZE_BITS)
    }

    /// Generate a key pair with an explicit modulus size.
    pub fn generate_with_bits(bits: usize) -> Result<Self> {
        RsaPrivateKey::new(&mut rand::thread_rng(), bits)
            .map(Self)
            .map_err(|e| CoreError::Crypto(format!("key generation failed: {}", e)))
    }

    /// The matching public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.to_public_key())
    }

    /// Decrypt a ciphertext produced by [`PublicKey::encrypt`] for this key.
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        self.0
            .decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|e| CoreError::Crypto(format!("asymmetric decryption failed: {}", e)))
    }

    /// Produce a detached signature over `digest`.
    pub fn sign(&self, digest: &PayloadDigest) -> Result<Vec<u8>> {
        self.0
            .sign(Pkcs1v15Sign::new::<Sha256>(), digest.as_bytes())
            .map_err(|e| CoreError::Crypto(format!("signing failed: {}", e)))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({})", self.public_key().fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::OnceLock;

    // Key generation dominates test time; share a couple of keys.
    fn keys() -> &'static (PrivateKey, PrivateKey) {
        static KEYS: OnceLock<(PrivateKey, PrivateKey)> = OnceLock::new();
        KEYS.get_or_init(|| {
            (
                PrivateKey::generate_with_bits(1024).unwrap(),
                PrivateKey::generate_with_bits(1024).unwrap(),
            )
        })
    }

    #[test]
    fn test_encrypt_decrypt() {
        let (alice, _) = keys();
        let ciphertext = alice.public_key().encrypt(b"temporary key").unwrap();

        assert_eq!(ciphertext.len(), alice.public_key().size());
        assert_eq!(alice.decrypt(&ciphertext).unwrap(), b"temporary key");
    }

    #[test]
    fn test_decrypt_with_other_key_fails() {
        let (alice, bob) = keys();
        let ciphertext = alice.public_key().encrypt(b"temporary key").unwrap();

        let err = bob.decrypt(&ciphertext).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_decrypt_malformed_ciphertext_fails() {
        let (alice, _) = keys();
        assert_eq!(alice.decrypt(b"short").unwrap_err().kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_message_too_long_fails() {
        let (alice, _) = keys();
        let message = vec![0u8; 512];
        assert_eq!(
            alice.public_key().encrypt(&message).unwrap_err().kind(),
            ErrorKind::Crypto
        );
    }

    #[test]
    fn test_sign_verify() {
        let (alice, bob) = keys();
        let digest = PayloadDigest::of(b"REQUEST_PAYLOAD");
        let signature = alice.sign(&digest).unwrap();

        assert!(alice.public_key().verify(&digest, &signature).unwrap());

        // Other key and other digest are plain `false`, not errors
        assert!(!bob.public_key().verify(&digest, &signature).unwrap());
        let other = PayloadDigest::of(b"REQUEST_PAYLOAD!");
        assert!(!alice.public_key().verify(&other, &signature).unwrap());
    }

    #[test]
    fn test_verify_flipped_bit_is_false() {
        let (alice, _) = keys();
        let digest = PayloadDigest::of(b"payload");
        let mut signature = alice.sign(&digest).unwrap();
        signature[10] ^= 0x80;

        assert!(!alice.public_key().verify(&digest, &signature).unwrap());
    }

    #[test]
    fn test_verify_malformed_signature_is_error() {
        let (alice, _) = keys();
        let digest = PayloadDigest::of(b"payload");

        let err = alice.public_key().verify(&digest, &[1, 2, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Crypto);
    }

    #[test]
    fn test_pem_roundtrip() {
        let (alice, _) = keys();
        let text = alice.public_key().to_pem().unwrap();

        assert!(text.starts_with("-----BEGIN RSA PUBLIC KEY-----\n"));
        assert!(text.ends_with("-----END RSA PUBLIC KEY-----\n"));
        assert!(!text.contains('\r'));
        assert!(text.lines().all(|line| line.len() <= 64));

        let recovered = PublicKey::from_pem(&text).unwrap();
        assert_eq!(recovered, alice.public_key());
    }

    #[test]
    fn test_pem_label_not_checked() {
        let (alice, _) = keys();
        let text = alice
            .public_key()
            .to_pem()
            .unwrap()
            .replace("RSA PUBLIC KEY", "PUBLIC KEY");

        assert_eq!(PublicKey::from_pem(&text).unwrap(), alice.public_key());
    }

    #[test]
    fn test_from_pem_rejects_garbage() {
        let err = PublicKey::from_pem("not a pem block").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_from_pem_rejects_bad_der() {
        let block = Pem::new(PUBLIC_KEY_PEM_LABEL, vec![0x30, 0x03, 0x01, 0x02, 0x03]);
        let err = PublicKey::from_pem(&pem::encode(&block)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_from_pem_rejects_other_key_type() {
        // Ed25519 SubjectPublicKeyInfo.
        let mut der = vec![
            0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
        ];
        der.extend_from_slice(&[0x42; 32]);
        let block = Pem::new(PUBLIC_KEY_PEM_LABEL, der);
        let err = PublicKey::from_pem(&pem::encode(&block)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_serde_uses_pem_text() {
        let (alice, _) = keys();
        let json = serde_json::to_string(&alice.public_key()).unwrap();
        assert!(json.contains("BEGIN RSA PUBLIC KEY"));

        let recovered: PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(recovered, alice.public_key());
    }

    #[test]
    fn test_digest_is_sha256() {
        assert_eq!(
            PayloadDigest::of(b"abc").to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
