//! In-memory user directory.
//!
//! Holds one [`UserRecord`] per user. Each record sits behind its own mutex
//! so updates to different users never contend, and every update to the
//! same user runs to completion before the next one starts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use dmpc_core::{PublicKey, UserId};

use crate::error::{Result, UsersError};
use crate::merge::{apply_update_request, MergeReport};
use crate::record::UserRecord;
use crate::request::{RequestKind, UsersRequest};

/// Result of a processed users request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UsersOutcome {
    Created(UserId),
    Updated(MergeReport),
}

/// Concurrent map from user id to record.
#[derive(Debug, Default)]
pub struct UserDirectory {
    records: RwLock<HashMap<UserId, Arc<Mutex<UserRecord>>>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record.
    pub fn create(&self, record: UserRecord) -> Result<()> {
        let mut records = self.records.write();
        if records.contains_key(&record.id) {
            return Err(UsersError::UserExists(record.id));
        }
        tracing::info!(user = %record.id, "user created");
        records.insert(record.id.clone(), Arc::new(Mutex::new(record)));
        Ok(())
    }

    /// Merge an update request into the record it targets.
    pub fn apply(&self, request: &UsersRequest) -> Result<MergeReport> {
        let entry = self
            .entry(request.user_id())
            .ok_or_else(|| UsersError::UnknownUser(request.user_id().clone()))?;

        let mut record = entry.lock();
        let report = apply_update_request(&mut record, request);
        if !report.rejected.is_empty() {
            tracing::debug!(
                user = %request.user_id(),
                rejected = ?report.rejected,
                "some fields were not applied"
            );
        }
        Ok(report)
    }

    /// Route a request to [`create`](Self::create) or [`apply`](Self::apply).
    pub fn process(&self, request: &UsersRequest) -> Result<UsersOutcome> {
        match request.kind {
            RequestKind::Create => {
                self.create(request.to_record()?)?;
                Ok(UsersOutcome::Created(request.user_id().clone()))
            }
            RequestKind::Update => self.apply(request).map(UsersOutcome::Updated),
        }
    }

    /// Snapshot of a record.
    pub fn get(&self, id: &UserId) -> Option<UserRecord> {
        self.entry(id).map(|entry| entry.lock().clone())
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.records.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Current signing keys, optionally only those of active users.
    pub fn sign_keys(&self, active_only: bool) -> Vec<(UserId, PublicKey)> {
        let entries: Vec<_> = self.records.read().values().cloned().collect();
        entries
            .iter()
            .filter_map(|entry| {
                let record = entry.lock();
                if active_only && !record.is_active() {
                    return None;
                }
                Some((record.id.clone(), record.sign_key.value.clone()))
            })
            .collect()
    }

    fn entry(&self, id: &UserId) -> Option<Arc<Mutex<UserRecord>>> {
        self.records.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Permissions;
    use crate::request::UserObject;
    use chrono::{TimeZone, Utc};
    use dmpc_core::PrivateKey;
    use std::sync::OnceLock;

    fn at(secs: i64) -> crate::Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn key() -> &'static PublicKey {
        static KEY: OnceLock<PublicKey> = OnceLock::new();
        KEY.get_or_init(|| PrivateKey::generate_with_bits(1024).unwrap().public_key())
    }

    fn create_request(id: &str, active: bool) -> UsersRequest {
        let mut data = UserObject::new(UserId::new(id));
        data.enc_key = Some(key().clone());
        data.sign_key = Some(key().clone());
        data.active = active;
        UsersRequest::create(data, at(100))
    }

    #[test]
    fn test_create_then_get() {
        let dir = UserDirectory::new();
        let outcome = dir.process(&create_request("alice", true)).unwrap();
        assert_eq!(outcome, UsersOutcome::Created(UserId::new("alice")));

        let record = dir.get(&UserId::new("alice")).unwrap();
        assert!(record.is_active());
        assert_eq!(record.created_at, at(100));
        assert_eq!(record.permissions.flags(), Permissions::default());
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_duplicate_create_rejected() {
        let dir = UserDirectory::new();
        dir.process(&create_request("alice", true)).unwrap();
        let err = dir.process(&create_request("alice", false)).unwrap_err();
        assert!(matches!(err, UsersError::UserExists(id) if id == UserId::new("alice")));
    }

    #[test]
    fn test_update_unknown_user() {
        let dir = UserDirectory::new();
        let request =
            UsersRequest::update(UserObject::new(UserId::new("bob")), ["active"], at(200));
        assert!(matches!(dir.process(&request), Err(UsersError::UnknownUser(_))));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_update_applies_merge() {
        let dir = UserDirectory::new();
        dir.process(&create_request("alice", true)).unwrap();

        let request =
            UsersRequest::update(UserObject::new(UserId::new("alice")), ["active"], at(200));
        let outcome = dir.process(&request).unwrap();
        match outcome {
            UsersOutcome::Updated(report) => assert_eq!(report.accepted, vec!["active"]),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!dir.get(&UserId::new("alice")).unwrap().is_active());
    }

    #[test]
    fn test_sign_keys_filters_inactive() {
        let dir = UserDirectory::new();
        dir.process(&create_request("alice", true)).unwrap();
        dir.process(&create_request("bob", false)).unwrap();

        assert_eq!(dir.sign_keys(false).len(), 2);
        let active = dir.sign_keys(true);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, UserId::new("alice"));
    }

    #[test]
    fn test_concurrent_updates_to_one_user() {
        let dir = Arc::new(UserDirectory::new());
        dir.process(&create_request("alice", true)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let dir = Arc::clone(&dir);
                std::thread::spawn(move || {
                    let mut data = UserObject::new(UserId::new("alice"));
                    data.permissions.user.add = i % 2 == 0;
                    let request =
                        UsersRequest::update(data, ["permissions.user.add"], at(200 + i));
                    dir.apply(&request).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let record = dir.get(&UserId::new("alice")).unwrap();
        assert_eq!(record.permissions.user.add.updated_at, at(207));
        assert!(!record.permissions.user.add.value);
        assert_eq!(record.updated_at, at(207));
        assert!(record.rollups_consistent());
    }
}
