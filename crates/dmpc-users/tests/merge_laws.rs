//! Convergence laws of the merge engine.
//!
//! Replicas that receive the same writes in any order, any number of times,
//! must end up with identical records as long as timestamps are distinct.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use dmpc_core::{PrivateKey, PublicKey, UserId};
use dmpc_users::{apply_field_update, FieldValue, Permissions, Timestamp, UserRecord};

const FLAG_PATHS: &[&str] = &[
    "active",
    "permissions.channel.add",
    "permissions.user.add",
    "permissions.user.remove",
    "permissions.user.encKeyUpdate",
    "permissions.user.signKeyUpdate",
    "permissions.user.permissionsUpdate",
];

#[derive(Debug, Clone)]
struct Write {
    path: &'static str,
    value: bool,
    at: i64,
}

fn at(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn key() -> &'static PublicKey {
    static KEY: OnceLock<PublicKey> = OnceLock::new();
    KEY.get_or_init(|| PrivateKey::generate_with_bits(1024).unwrap().public_key())
}

fn base_record() -> UserRecord {
    UserRecord::new(
        UserId::new("replica-user"),
        key().clone(),
        key().clone(),
        Permissions::default(),
        false,
        at(0),
    )
}

/// Writes with pairwise-distinct timestamps.
fn writes() -> impl Strategy<Value = Vec<Write>> {
    prop::collection::btree_map(1i64..1_000_000, (0..FLAG_PATHS.len(), any::<bool>()), 0..24)
        .prop_map(|map: BTreeMap<i64, (usize, bool)>| {
            map.into_iter()
                .map(|(at, (idx, value))| Write {
                    path: FLAG_PATHS[idx],
                    value,
                    at,
                })
                .collect()
        })
}

fn apply_all(record: &mut UserRecord, writes: &[Write]) {
    for w in writes {
        apply_field_update(record, w.path, FieldValue::Flag(w.value), at(w.at));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_order_independent(
        (original, shuffled) in writes()
            .prop_flat_map(|w| (Just(w.clone()), Just(w).prop_shuffle()))
    ) {
        let mut a = base_record();
        let mut b = base_record();
        apply_all(&mut a, &original);
        apply_all(&mut b, &shuffled);

        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_idempotent(writes in writes()) {
        let mut once = base_record();
        apply_all(&mut once, &writes);

        let mut twice = once.clone();
        apply_all(&mut twice, &writes);

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_rollups_always_consistent(
        writes in writes().prop_flat_map(|w| Just(w).prop_shuffle())
    ) {
        let mut record = base_record();
        for w in &writes {
            apply_field_update(&mut record, w.path, FieldValue::Flag(w.value), at(w.at));
            prop_assert!(record.rollups_consistent());
        }
    }

    #[test]
    fn test_timestamps_never_decrease(
        writes in writes().prop_flat_map(|w| Just(w).prop_shuffle())
    ) {
        let mut record = base_record();
        let mut previous = record.updated_at;
        for w in &writes {
            apply_field_update(&mut record, w.path, FieldValue::Flag(w.value), at(w.at));
            prop_assert!(record.updated_at >= previous);
            previous = record.updated_at;
        }
    }

    #[test]
    fn test_latest_write_wins(writes in writes()) {
        let mut record = base_record();
        apply_all(&mut record, &writes);

        let latest = writes.iter().filter(|w| w.path == "active").max_by_key(|w| w.at);
        match latest {
            Some(w) => {
                prop_assert_eq!(record.active.value, w.value);
                prop_assert_eq!(record.active.updated_at, at(w.at));
            }
            None => prop_assert_eq!(record.active.updated_at, at(0)),
        }
    }

    #[test]
    fn test_unknown_paths_never_change_record(
        path in "[a-zA-Z.]{0,40}",
        value in any::<bool>(),
        secs in 1i64..1_000_000,
    ) {
        prop_assume!(!FLAG_PATHS.contains(&path.as_str()));
        prop_assume!(path != "encKey" && path != "signKey");

        let mut record = base_record();
        let before = record.clone();
        prop_assert!(!apply_field_update(&mut record, &path, FieldValue::Flag(value), at(secs)));
        prop_assert_eq!(record, before);
    }
}
