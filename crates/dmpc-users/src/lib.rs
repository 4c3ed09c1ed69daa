//! # DMPC Users
//!
//! User records and the field-level merge engine that keeps them convergent.
//!
//! ## Overview
//!
//! Every leaf of a [`UserRecord`] is a last-writer-wins register ([`Lww`]).
//! Updates name the leaves they touch by dotted path (`"active"`,
//! `"permissions.user.add"`, ...) and carry a single timestamp. A leaf
//! accepts a write only when that timestamp is strictly later than its own,
//! and every container above an accepted leaf has its `updated_at` roll-up
//! moved forward.
//!
//! ## Key Types
//!
//! - [`UserRecord`] - the per-user tree of registers
//! - [`UsersRequest`] - create/update request as decoded from a payload
//! - [`UserDirectory`] - concurrent in-memory store of records
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dmpc_users::{apply_field_update, FieldValue, UserRecord};
//! # fn demo(record: &mut UserRecord, at: dmpc_users::Timestamp) {
//! let changed = apply_field_update(record, "permissions.user.add", FieldValue::Flag(true), at);
//! assert!(record.rollups_consistent());
//! # let _ = changed;
//! # }
//! ```

pub mod authorization;
pub mod directory;
pub mod error;
pub mod fields;
pub mod lww;
pub mod merge;
pub mod record;
pub mod request;

pub use authorization::can_update_path;
pub use directory::{UserDirectory, UsersOutcome};
pub use error::{Result, UsersError};
pub use fields::{field_paths, Container};
pub use lww::{Lww, Timestamp};
pub use merge::{apply_field_update, apply_update_request, FieldValue, MergeReport};
pub use record::{
    ChannelPermissions, ChannelPermissionsRecord, Permissions, PermissionsRecord,
    UserPermissions, UserPermissionsRecord, UserRecord,
};
pub use request::{RequestKind, UserObject, UsersRequest};
