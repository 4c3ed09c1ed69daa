//! The Kernel: unified API for processing operations.
//!
//! The Kernel ties the envelope formats, the key store, the user directory
//! and status tracking together. An operation arrives as bytes, gets a
//! ticket, and is either merged into the directory or recorded as failed.

use dmpc_core::{KeyId, PrivateKey, RequestType, UserId};
use dmpc_envelope::{
    EnvelopeError, OpenedOperation, PermanentEncryptedOperation, SignerKey,
    TemporaryEncryptedOperation,
};
use dmpc_status::{FailReason, StatusCode, StatusRecord, StatusTracker, Ticket};
use dmpc_users::{UserDirectory, UserRecord, UsersOutcome, UsersRequest};

use crate::error::{KernelError, Result};
use crate::keystore::KeyStore;

/// Default upper bound on an operation's encoded size.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Configuration for the Kernel.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Challenge plaintext recipients expect in temporary envelopes.
    pub challenge: String,
    /// Only consider active users as signers.
    pub require_active_signers: bool,
    /// Larger operations are rejected before any decryption.
    pub max_payload_bytes: usize,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            challenge: "dmpc".to_string(),
            require_active_signers: true,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

/// A processed operation: its ticket and what happened.
#[derive(Debug)]
pub struct Submission {
    pub ticket: Ticket,
    pub outcome: Result<UsersOutcome>,
}

impl Submission {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn into_result(self) -> Result<UsersOutcome> {
        self.outcome
    }
}

/// The main Kernel struct.
///
/// Provides a unified API for:
/// - Opening temporary and permanent envelopes
/// - Authenticating and authorizing signers against the user directory
/// - Merging users requests
/// - Reporting ticket status
pub struct Kernel<K: KeyStore> {
    /// Permanent symmetric keys.
    keys: K,
    /// Configuration.
    config: KernelConfig,
    /// User records.
    users: UserDirectory,
    /// Ticket status.
    status: StatusTracker,
}

impl<K: KeyStore> Kernel<K> {
    /// Create a new kernel instance with an empty directory.
    pub fn new(keys: K, config: KernelConfig) -> Self {
        Self {
            keys,
            config,
            users: UserDirectory::new(),
            status: StatusTracker::new(),
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn keys(&self) -> &K {
        &self.keys
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    /// Status of a previously issued ticket.
    pub fn ticket_status(&self, ticket: &Ticket) -> Option<StatusRecord> {
        self.status.get(ticket)
    }

    /// Insert a user without any signature checks.
    ///
    /// Used to seed the directory with the first trusted users.
    pub fn bootstrap_user(&self, record: UserRecord) -> Result<()> {
        tracing::info!(user = %record.id, "bootstrapping user");
        Ok(self.users.create(record)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operation Processing
    // ─────────────────────────────────────────────────────────────────────────

    /// Process a temporary envelope addressed to `recipient`.
    ///
    /// The envelope's payload must be an encoded permanent envelope.
    pub fn process_temporary(&self, bytes: &[u8], recipient: &PrivateKey) -> Submission {
        self.submit(bytes, |bytes| {
            let temporary = TemporaryEncryptedOperation::decode(bytes)?;
            let inner = temporary.open(recipient, &self.config.challenge)?;
            self.check_size(&inner)?;
            self.run_permanent(&inner)
        })
    }

    /// Process an encoded permanent envelope.
    pub fn process_permanent(&self, bytes: &[u8]) -> Submission {
        self.submit(bytes, |bytes| self.run_permanent(bytes))
    }

    /// Ticket, run, record.
    fn submit<F>(&self, bytes: &[u8], run: F) -> Submission
    where
        F: FnOnce(&[u8]) -> Result<UsersOutcome>,
    {
        let ticket = self.status.request_ticket();
        let fingerprint = fingerprint(bytes);

        let outcome = self
            .status
            .update(&ticket, StatusCode::Running, FailReason::NoReason, None, None)
            .map_err(KernelError::from)
            .and_then(|()| self.check_size(bytes))
            .and_then(|()| run(bytes));

        let recorded = match &outcome {
            Ok(result) => {
                tracing::info!(%ticket, %fingerprint, "operation applied");
                let body = match serde_json::to_vec(result) {
                    Ok(body) => Some(body),
                    Err(e) => {
                        tracing::warn!(%ticket, error = %e, "could not encode operation result");
                        None
                    }
                };
                self.status
                    .update(&ticket, StatusCode::Success, FailReason::NoReason, body, None)
            }
            Err(e) => {
                let reason = e.failure_reason();
                tracing::warn!(%ticket, %fingerprint, ?reason, error = %e, "operation failed");
                self.status.update(
                    &ticket,
                    StatusCode::Failed,
                    reason,
                    None,
                    Some(vec![e.to_string()]),
                )
            }
        };
        if let Err(e) = recorded {
            tracing::warn!(%ticket, error = %e, "could not record final status");
        }

        Submission { ticket, outcome }
    }

    fn run_permanent(&self, bytes: &[u8]) -> Result<UsersOutcome> {
        let operation = PermanentEncryptedOperation::decode(bytes)?;
        let opened = self.open_permanent(&operation)?;

        if opened.request_type != RequestType::USERS {
            return Err(KernelError::UnsupportedRequestType(opened.request_type));
        }

        let request = UsersRequest::decode(&opened.payload)?;
        self.authorize(&opened.signers.issuer_id, &request)?;

        tracing::debug!(
            key_id = %opened.key_id,
            issuer = %opened.signers.issuer_id,
            certifier = %opened.signers.certifier_id,
            user = %request.user_id(),
            "applying users request"
        );
        Ok(self.users.process(&request)?)
    }

    fn open_permanent(&self, operation: &PermanentEncryptedOperation) -> Result<OpenedOperation> {
        let key_id: &KeyId = operation.key_id();
        let key = self
            .keys
            .symmetric_key(key_id)
            .ok_or_else(|| KernelError::UnknownKeyId(key_id.clone()))?;

        let candidates: Vec<SignerKey> = self
            .users
            .sign_keys(self.config.require_active_signers)
            .into_iter()
            .map(|(id, key)| SignerKey::new(id, key))
            .collect();

        Ok(operation.open_with_candidates(&key, &candidates)?)
    }

    fn authorize(&self, issuer: &UserId, request: &UsersRequest) -> Result<()> {
        let record = self
            .users
            .get(issuer)
            .ok_or_else(|| KernelError::NotAuthorized(format!("issuer {issuer} is not a user")))?;

        if !record.can_issue(request) {
            tracing::warn!(%issuer, kind = ?request.kind, "issuer lacks permission");
            return Err(KernelError::NotAuthorized(format!(
                "issuer {issuer} may not issue this request"
            )));
        }
        Ok(())
    }

    fn check_size(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.config.max_payload_bytes {
            return Err(EnvelopeError::Parse(format!(
                "operation of {} bytes exceeds limit of {}",
                bytes.len(),
                self.config.max_payload_bytes
            ))
            .into());
        }
        Ok(())
    }
}

/// Short fingerprint of an encoded operation, for correlating log lines.
fn fingerprint(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes);
    hash.to_hex().as_str()[..16].to_string()
}
