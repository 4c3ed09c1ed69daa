//! Last-writer-wins register.
//!
//! The merge primitive for every leaf of a user record: a value paired with
//! the instant it was last accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Instant attached to accepted writes.
pub type Timestamp = DateTime<Utc>;

/// A value and the timestamp at which it was accepted.
///
/// `updated_at` only ever moves to the timestamp of an accepted write,
/// never to the timestamp of a rejected attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lww<T> {
    pub value: T,
    pub updated_at: Timestamp,
}

impl<T> Lww<T> {
    pub fn new(value: T, updated_at: Timestamp) -> Self {
        Self { value, updated_at }
    }

    /// Accept `value` iff `at` is strictly after the current timestamp.
    ///
    /// Ties keep the existing value, so replaying the same write is a no-op.
    pub fn update(&mut self, value: T, at: Timestamp) -> bool {
        if at > self.updated_at {
            self.value = value;
            self.updated_at = at;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_newer_write_accepted() {
        let mut reg = Lww::new(false, at(10));
        assert!(reg.update(true, at(11)));
        assert_eq!(reg, Lww::new(true, at(11)));
    }

    #[test]
    fn test_older_write_rejected() {
        let mut reg = Lww::new(false, at(10));
        assert!(!reg.update(true, at(9)));
        assert_eq!(reg, Lww::new(false, at(10)));
    }

    #[test]
    fn test_tie_keeps_existing_value() {
        let mut reg = Lww::new(false, at(10));
        assert!(!reg.update(true, at(10)));
        assert!(!reg.value);
    }

    #[test]
    fn test_serialized_shape() {
        let reg = Lww::new(true, at(0));
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json["value"], serde_json::json!(true));
        assert_eq!(json["updatedAt"], serde_json::json!("1970-01-01T00:00:00Z"));
    }
}
