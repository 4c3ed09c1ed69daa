//! Merge engine.
//!
//! Applies candidate field values to a [`UserRecord`] with last-writer-wins
//! semantics. A leaf accepts a write only when the write's timestamp is
//! strictly later than the leaf's; ties are rejected. When a leaf accepts,
//! every enclosing container's roll-up moves forward to cover it.
//!
//! Merging is commutative and idempotent as long as no two writes to the
//! same leaf share a timestamp.

use serde::Serialize;

use dmpc_core::PublicKey;

use crate::fields::{resolve, FieldBinding, Leaf};
use crate::lww::Timestamp;
use crate::record::UserRecord;
use crate::request::UsersRequest;

/// A candidate value for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Flag(bool),
    Key(PublicKey),
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Flag(v)
    }
}

impl From<PublicKey> for FieldValue {
    fn from(v: PublicKey) -> Self {
        FieldValue::Key(v)
    }
}

/// Outcome of applying an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// Paths whose leaf accepted the write.
    pub accepted: Vec<&'static str>,
    /// Paths that were unknown, stale, tied, or missing a value.
    pub rejected: Vec<String>,
}

impl MergeReport {
    /// Whether any leaf changed.
    pub fn changed(&self) -> bool {
        !self.accepted.is_empty()
    }
}

/// Apply one candidate value to the leaf at `path`.
///
/// Returns whether the record changed. Unknown paths and values of the wrong
/// kind for the path are ignored.
pub fn apply_field_update(
    record: &mut UserRecord,
    path: &str,
    value: FieldValue,
    at: Timestamp,
) -> bool {
    let Some(binding) = resolve(path) else {
        tracing::debug!(path, "ignoring unknown field path");
        return false;
    };

    let accepted = match (binding.leaf, value) {
        (Leaf::Flag { register, .. }, FieldValue::Flag(v)) => register(record).update(v, at),
        (Leaf::Key { register, .. }, FieldValue::Key(k)) => register(record).update(k, at),
        _ => {
            tracing::debug!(path, "ignoring value of the wrong kind");
            return false;
        }
    };

    if accepted {
        roll_up(record, binding, at);
    }
    tracing::debug!(user = %record.id, path, accepted, "field update");
    accepted
}

/// Apply every path named by an update request.
///
/// Paths are applied independently at the request's timestamp; one rejected
/// path does not affect the others. Duplicate paths are applied once.
pub fn apply_update_request(record: &mut UserRecord, request: &UsersRequest) -> MergeReport {
    let mut report = MergeReport::default();

    for path in &request.fields_updated {
        if report.accepted.iter().any(|p| *p == path.as_str()) || report.rejected.contains(path) {
            continue;
        }

        let Some(binding) = resolve(path) else {
            report.rejected.push(path.clone());
            continue;
        };
        let candidate = match binding.leaf {
            Leaf::Flag { candidate, .. } => Some(FieldValue::Flag(candidate(&request.data))),
            Leaf::Key { candidate, .. } => candidate(&request.data).map(FieldValue::Key),
        };

        match candidate {
            Some(value) => {
                if apply_field_update(record, path, value, request.timestamp) {
                    report.accepted.push(binding.path);
                } else {
                    report.rejected.push(path.clone());
                }
            }
            None => report.rejected.push(path.clone()),
        }
    }

    report
}

fn roll_up(record: &mut UserRecord, binding: &FieldBinding, at: Timestamp) {
    for container in binding.ancestors {
        let rollup = container.rollup_mut(record);
        if at > *rollup {
            *rollup = at;
        }
    }
}
