//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. RSA key generation dominates
//! test time, so identities are generated once per process and shared.

use std::sync::OnceLock;

use chrono::{TimeZone, Utc};

use dmpc_core::{KeyId, PrivateKey, PublicKey, RequestType, SymmetricKey, SymmetricNonce, UserId};
use dmpc_envelope::{
    PermanentEncryptedOperation, PermanentSealRequest, SignerKey, TemporaryEncryptedOperation,
    TemporarySealer,
};
use dmpc_kernel::{Kernel, KernelConfig, MemoryKeyStore, Result, Submission};
use dmpc_users::{Permissions, Timestamp, UserObject, UserRecord, UsersRequest};

/// Key id the fixtures register their permanent key under.
pub const KEY_ID: &str = "KEY_ID";
/// Payload used by envelope scenarios.
pub const REQUEST_PAYLOAD: &[u8] = b"REQUEST_PAYLOAD";
/// Challenge the fixture kernel expects.
pub const CHALLENGE: &str = "CORRECT_CHALLENGE";
/// Modulus size for fixture keys. Small to keep suites fast.
pub const TEST_KEY_BITS: usize = 1024;

pub const ISSUER_ID: &str = "ISSUER_ID";
pub const CERTIFIER_ID: &str = "CERTIFIER_ID";

/// Long-lived identities shared by every test in the process.
pub struct Identities {
    pub issuer: PrivateKey,
    pub certifier: PrivateKey,
    /// Node key temporary envelopes are addressed to.
    pub recipient: PrivateKey,
    /// Key nobody in the directory knows.
    pub outsider: PrivateKey,
}

impl Identities {
    pub fn issuer_signer(&self) -> SignerKey {
        SignerKey::new(UserId::new(ISSUER_ID), self.issuer.public_key())
    }

    pub fn certifier_signer(&self) -> SignerKey {
        SignerKey::new(UserId::new(CERTIFIER_ID), self.certifier.public_key())
    }
}

/// The shared identities, generated on first use.
///
/// # Panics
///
/// Panics if the RNG cannot produce a key, which only happens on a broken
/// platform.
pub fn identities() -> &'static Identities {
    static IDENTITIES: OnceLock<Identities> = OnceLock::new();
    IDENTITIES.get_or_init(|| {
        let generate = || {
            PrivateKey::generate_with_bits(TEST_KEY_BITS).expect("test key generation failed")
        };
        Identities {
            issuer: generate(),
            certifier: generate(),
            recipient: generate(),
            outsider: generate(),
        }
    })
}

/// Whole-second UTC timestamp.
pub fn timestamp(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

/// Every permission flag set.
pub fn full_permissions() -> Permissions {
    let mut p = Permissions::default();
    p.channel.add = true;
    p.user.add = true;
    p.user.remove = true;
    p.user.enc_key_update = true;
    p.user.sign_key_update = true;
    p.user.permissions_update = true;
    p
}

/// An active user with every permission, using `key` for both roles.
pub fn admin_record(id: &str, key: &PublicKey, at: Timestamp) -> UserRecord {
    UserRecord::new(UserId::new(id), key.clone(), key.clone(), full_permissions(), true, at)
}

/// A create request for an active user without permissions.
pub fn create_request(id: &str, key: &PublicKey, at: Timestamp) -> UsersRequest {
    let mut data = UserObject::new(UserId::new(id));
    data.enc_key = Some(key.clone());
    data.sign_key = Some(key.clone());
    data.active = true;
    UsersRequest::create(data, at)
}

/// Seal `payload` signed by the fixture issuer and certifier.
pub fn seal_permanent(
    key: &SymmetricKey,
    request_type: RequestType,
    payload: &[u8],
) -> dmpc_envelope::Result<PermanentEncryptedOperation> {
    let ids = identities();
    PermanentEncryptedOperation::seal(PermanentSealRequest {
        key_id: KeyId::new(KEY_ID),
        key,
        nonce: SymmetricNonce::generate(),
        request_type,
        payload,
        issuer: (&ids.issuer).into(),
        certifier: (&ids.certifier).into(),
    })
}

/// Wrap `payload` for the fixture recipient.
pub fn seal_temporary(payload: Vec<u8>) -> dmpc_envelope::Result<TemporaryEncryptedOperation> {
    Ok(TemporarySealer::new(payload, CHALLENGE)
        .recipient(identities().recipient.public_key())
        .seal()?
        .operation)
}

/// A kernel seeded with the fixture issuer and certifier as admins.
pub struct KernelFixture {
    pub kernel: Kernel<MemoryKeyStore>,
    pub key: SymmetricKey,
}

impl KernelFixture {
    pub fn new() -> Result<Self> {
        Self::with_config(KernelConfig {
            challenge: CHALLENGE.to_string(),
            ..KernelConfig::default()
        })
    }

    pub fn with_config(config: KernelConfig) -> Result<Self> {
        let key = SymmetricKey::generate();
        let keys = MemoryKeyStore::new();
        keys.insert(KeyId::new(KEY_ID), key.clone());

        let kernel = Kernel::new(keys, config);
        let ids = identities();
        kernel.bootstrap_user(admin_record(ISSUER_ID, &ids.issuer.public_key(), timestamp(0)))?;
        kernel.bootstrap_user(admin_record(
            CERTIFIER_ID,
            &ids.certifier.public_key(),
            timestamp(0),
        ))?;

        Ok(Self { kernel, key })
    }

    /// Encode `request` as a permanent envelope.
    pub fn permanent_bytes(&self, request: &UsersRequest) -> Result<Vec<u8>> {
        let payload = request.encode()?;
        Ok(seal_permanent(&self.key, RequestType::USERS, &payload)?.encode()?)
    }

    /// Encode `request` as a permanent envelope inside a temporary one.
    pub fn temporary_bytes(&self, request: &UsersRequest) -> Result<Vec<u8>> {
        let inner = self.permanent_bytes(request)?;
        Ok(seal_temporary(inner)?.encode()?)
    }

    /// Submit `request` the way a client would.
    pub fn submit(&self, request: &UsersRequest) -> Result<Submission> {
        let bytes = self.temporary_bytes(request)?;
        Ok(self.kernel.process_temporary(&bytes, &identities().recipient))
    }
}
