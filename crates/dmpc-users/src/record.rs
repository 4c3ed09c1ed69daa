//! User records.
//!
//! A record is a small tree. Leaves are [`Lww`] registers; every inner
//! container carries an `updated_at` roll-up equal to the latest timestamp
//! among its descendants:
//!
//! ```text
//! UserRecord (updated_at)
//! ├── enc_key, sign_key, active
//! └── permissions (updated_at)
//!     ├── channel (updated_at)
//!     │   └── add
//!     └── user (updated_at)
//!         └── add, remove, enc_key_update, sign_key_update, permissions_update
//! ```
//!
//! Roll-ups are maintained by the merge engine in the same call that
//! updates a leaf. They are never set directly.

use serde::{Deserialize, Serialize};

use dmpc_core::{PublicKey, UserId};

use crate::lww::{Lww, Timestamp};

/// Channel permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPermissionsRecord {
    pub add: Lww<bool>,
    pub updated_at: Timestamp,
}

/// User-management permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionsRecord {
    pub add: Lww<bool>,
    pub remove: Lww<bool>,
    pub enc_key_update: Lww<bool>,
    pub sign_key_update: Lww<bool>,
    pub permissions_update: Lww<bool>,
    pub updated_at: Timestamp,
}

/// All permission groups of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsRecord {
    pub channel: ChannelPermissionsRecord,
    pub user: UserPermissionsRecord,
    pub updated_at: Timestamp,
}

/// Plain permission flags, used to seed a new record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChannelPermissions {
    pub add: bool,
}

/// Plain user-management flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPermissions {
    pub add: bool,
    pub remove: bool,
    pub enc_key_update: bool,
    pub sign_key_update: bool,
    pub permissions_update: bool,
}

/// Plain permission groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Permissions {
    pub channel: ChannelPermissions,
    pub user: UserPermissions,
}

impl PermissionsRecord {
    fn new(flags: Permissions, at: Timestamp) -> Self {
        let user = flags.user;
        Self {
            channel: ChannelPermissionsRecord {
                add: Lww::new(flags.channel.add, at),
                updated_at: at,
            },
            user: UserPermissionsRecord {
                add: Lww::new(user.add, at),
                remove: Lww::new(user.remove, at),
                enc_key_update: Lww::new(user.enc_key_update, at),
                sign_key_update: Lww::new(user.sign_key_update, at),
                permissions_update: Lww::new(user.permissions_update, at),
                updated_at: at,
            },
            updated_at: at,
        }
    }

    /// Current flag values, without timestamps.
    pub fn flags(&self) -> Permissions {
        Permissions {
            channel: ChannelPermissions {
                add: self.channel.add.value,
            },
            user: UserPermissions {
                add: self.user.add.value,
                remove: self.user.remove.value,
                enc_key_update: self.user.enc_key_update.value,
                sign_key_update: self.user.sign_key_update.value,
                permissions_update: self.user.permissions_update.value,
            },
        }
    }
}

/// The record of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub enc_key: Lww<PublicKey>,
    pub sign_key: Lww<PublicKey>,
    pub permissions: PermissionsRecord,
    pub active: Lww<bool>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserRecord {
    /// Create a record. Every field starts out stamped with `created_at`.
    pub fn new(
        id: UserId,
        enc_key: PublicKey,
        sign_key: PublicKey,
        permissions: Permissions,
        active: bool,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            enc_key: Lww::new(enc_key, created_at),
            sign_key: Lww::new(sign_key, created_at),
            permissions: PermissionsRecord::new(permissions, created_at),
            active: Lww::new(active, created_at),
            created_at,
            updated_at: created_at,
        }
    }

    /// Whether the user is currently active.
    pub fn is_active(&self) -> bool {
        self.active.value
    }

    /// Check that every container's roll-up equals the latest timestamp
    /// among its children.
    pub fn rollups_consistent(&self) -> bool {
        let channel = &self.permissions.channel;
        let user = &self.permissions.user;

        let channel_max = channel.add.updated_at;
        let user_max = [
            user.add.updated_at,
            user.remove.updated_at,
            user.enc_key_update.updated_at,
            user.sign_key_update.updated_at,
            user.permissions_update.updated_at,
        ]
        .into_iter()
        .max()
        .unwrap_or(user.updated_at);
        let permissions_max = channel.updated_at.max(user.updated_at);
        let record_max = [
            self.enc_key.updated_at,
            self.sign_key.updated_at,
            self.permissions.updated_at,
            self.active.updated_at,
        ]
        .into_iter()
        .max()
        .unwrap_or(self.updated_at);

        channel.updated_at == channel_max
            && user.updated_at == user_max
            && self.permissions.updated_at == permissions_max
            && self.updated_at == record_max
    }
}
