//! Proptest generators for property-based testing.

use proptest::prelude::*;

use dmpc_core::{KeyId, UserId};
use dmpc_users::{field_paths, ChannelPermissions, Permissions, Timestamp, UserPermissions};

use crate::fixtures::timestamp as at;

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a printable challenge string.
pub fn challenge() -> impl Strategy<Value = String> {
    "[ -~]{1,32}".prop_map(String::from)
}

/// Generate a user id.
pub fn user_id() -> impl Strategy<Value = UserId> {
    "[a-z][a-z0-9_]{0,15}".prop_map(UserId::new)
}

/// Generate a key id.
pub fn key_id() -> impl Strategy<Value = KeyId> {
    "[A-Z][A-Z0-9_]{0,15}".prop_map(KeyId::new)
}

/// Generate a timestamp between 1970 and 2096, whole seconds.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    (0i64..=4_000_000_000).prop_map(at)
}

/// Generate an arbitrary combination of permission flags.
pub fn permissions() -> impl Strategy<Value = Permissions> {
    (any::<bool>(), any::<[bool; 5]>()).prop_map(|(channel_add, user)| Permissions {
        channel: ChannelPermissions { add: channel_add },
        user: UserPermissions {
            add: user[0],
            remove: user[1],
            enc_key_update: user[2],
            sign_key_update: user[3],
            permissions_update: user[4],
        },
    })
}

/// Generate one of the boolean field paths.
pub fn flag_path() -> impl Strategy<Value = &'static str> {
    let paths: Vec<&'static str> = field_paths().filter(|p| !p.ends_with("Key")).collect();
    prop::sample::select(paths)
}

/// A write to one boolean leaf.
#[derive(Debug, Clone)]
pub struct FlagWrite {
    pub path: &'static str,
    pub value: bool,
    pub at: Timestamp,
}

/// Generate up to `max` flag writes with pairwise-distinct timestamps,
/// in arbitrary order.
pub fn flag_writes(max: usize) -> impl Strategy<Value = Vec<FlagWrite>> {
    prop::collection::btree_map(1i64..1_000_000, (flag_path(), any::<bool>()), 0..=max)
        .prop_map(|writes| {
            writes
                .into_iter()
                .map(|(secs, (path, value))| FlagWrite {
                    path,
                    value,
                    at: at(secs),
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}
