//! Field paths of a user record.
//!
//! Each updatable leaf is bound to a dotted path, an accessor for its
//! register, an accessor for the candidate value in a [`UserObject`], and the
//! chain of containers whose roll-ups must follow it. The table is the single
//! place that knows the shape of a record; the merge engine only walks it.

use dmpc_core::PublicKey;

use crate::lww::{Lww, Timestamp};
use crate::record::UserRecord;
use crate::request::UserObject;

/// Inner node of a record that carries an `updated_at` roll-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Record,
    Permissions,
    ChannelPermissions,
    UserPermissions,
}

impl Container {
    pub(crate) fn rollup_mut(self, record: &mut UserRecord) -> &mut Timestamp {
        match self {
            Container::Record => &mut record.updated_at,
            Container::Permissions => &mut record.permissions.updated_at,
            Container::ChannelPermissions => &mut record.permissions.channel.updated_at,
            Container::UserPermissions => &mut record.permissions.user.updated_at,
        }
    }
}

/// Accessors for one leaf register.
#[derive(Clone, Copy)]
pub(crate) enum Leaf {
    Flag {
        register: fn(&mut UserRecord) -> &mut Lww<bool>,
        candidate: fn(&UserObject) -> bool,
    },
    Key {
        register: fn(&mut UserRecord) -> &mut Lww<PublicKey>,
        candidate: fn(&UserObject) -> Option<PublicKey>,
    },
}

/// A path and everything needed to update it.
#[derive(Clone, Copy)]
pub(crate) struct FieldBinding {
    pub path: &'static str,
    pub leaf: Leaf,
    /// Innermost first.
    pub ancestors: &'static [Container],
}

const TOP: &[Container] = &[Container::Record];
const CHANNEL: &[Container] = &[
    Container::ChannelPermissions,
    Container::Permissions,
    Container::Record,
];
const USER: &[Container] = &[
    Container::UserPermissions,
    Container::Permissions,
    Container::Record,
];

fn active(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.active
}
fn enc_key(r: &mut UserRecord) -> &mut Lww<PublicKey> {
    &mut r.enc_key
}
fn sign_key(r: &mut UserRecord) -> &mut Lww<PublicKey> {
    &mut r.sign_key
}
fn channel_add(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.permissions.channel.add
}
fn user_add(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.permissions.user.add
}
fn user_remove(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.permissions.user.remove
}
fn user_enc_key_update(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.permissions.user.enc_key_update
}
fn user_sign_key_update(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.permissions.user.sign_key_update
}
fn user_permissions_update(r: &mut UserRecord) -> &mut Lww<bool> {
    &mut r.permissions.user.permissions_update
}

fn cand_active(o: &UserObject) -> bool {
    o.active
}
fn cand_enc_key(o: &UserObject) -> Option<PublicKey> {
    o.enc_key.clone()
}
fn cand_sign_key(o: &UserObject) -> Option<PublicKey> {
    o.sign_key.clone()
}
fn cand_channel_add(o: &UserObject) -> bool {
    o.permissions.channel.add
}
fn cand_user_add(o: &UserObject) -> bool {
    o.permissions.user.add
}
fn cand_user_remove(o: &UserObject) -> bool {
    o.permissions.user.remove
}
fn cand_user_enc_key_update(o: &UserObject) -> bool {
    o.permissions.user.enc_key_update
}
fn cand_user_sign_key_update(o: &UserObject) -> bool {
    o.permissions.user.sign_key_update
}
fn cand_user_permissions_update(o: &UserObject) -> bool {
    o.permissions.user.permissions_update
}

const FIELDS: &[FieldBinding] = &[
    FieldBinding {
        path: "active",
        leaf: Leaf::Flag {
            register: active,
            candidate: cand_active,
        },
        ancestors: TOP,
    },
    FieldBinding {
        path: "encKey",
        leaf: Leaf::Key {
            register: enc_key,
            candidate: cand_enc_key,
        },
        ancestors: TOP,
    },
    FieldBinding {
        path: "signKey",
        leaf: Leaf::Key {
            register: sign_key,
            candidate: cand_sign_key,
        },
        ancestors: TOP,
    },
    FieldBinding {
        path: "permissions.channel.add",
        leaf: Leaf::Flag {
            register: channel_add,
            candidate: cand_channel_add,
        },
        ancestors: CHANNEL,
    },
    FieldBinding {
        path: "permissions.user.add",
        leaf: Leaf::Flag {
            register: user_add,
            candidate: cand_user_add,
        },
        ancestors: USER,
    },
    FieldBinding {
        path: "permissions.user.remove",
        leaf: Leaf::Flag {
            register: user_remove,
            candidate: cand_user_remove,
        },
        ancestors: USER,
    },
    FieldBinding {
        path: "permissions.user.encKeyUpdate",
        leaf: Leaf::Flag {
            register: user_enc_key_update,
            candidate: cand_user_enc_key_update,
        },
        ancestors: USER,
    },
    FieldBinding {
        path: "permissions.user.signKeyUpdate",
        leaf: Leaf::Flag {
            register: user_sign_key_update,
            candidate: cand_user_sign_key_update,
        },
        ancestors: USER,
    },
    FieldBinding {
        path: "permissions.user.permissionsUpdate",
        leaf: Leaf::Flag {
            register: user_permissions_update,
            candidate: cand_user_permissions_update,
        },
        ancestors: USER,
    },
];

/// Look up the binding for a dotted path.
pub(crate) fn resolve(path: &str) -> Option<&'static FieldBinding> {
    FIELDS.iter().find(|f| f.path == path)
}

/// Every updatable path, in table order.
pub fn field_paths() -> impl Iterator<Item = &'static str> {
    FIELDS.iter().map(|f| f.path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_paths() {
        for path in field_paths() {
            assert_eq!(resolve(path).map(|f| f.path), Some(path));
        }
        assert_eq!(field_paths().count(), 9);
    }

    #[test]
    fn test_resolve_unknown_paths() {
        assert!(resolve("").is_none());
        assert!(resolve("permissions").is_none());
        assert!(resolve("permissions.user").is_none());
        assert!(resolve("permissions.user.delete").is_none());
        assert!(resolve("id").is_none());
        assert!(resolve("Active").is_none());
    }

    #[test]
    fn test_ancestors_end_at_record() {
        for path in field_paths() {
            let binding = resolve(path).unwrap();
            assert_eq!(binding.ancestors.last(), Some(&Container::Record));
        }
    }
}
