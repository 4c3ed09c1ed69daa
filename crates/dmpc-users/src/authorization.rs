//! Which permission flag a request needs from its issuer.

use crate::record::{Permissions, UserRecord};
use crate::request::{RequestKind, UsersRequest};

/// Whether `path` may be written by someone holding `granted`.
///
/// Unknown paths need nothing; the merge engine ignores them anyway.
pub fn can_update_path(granted: &Permissions, path: &str) -> bool {
    match path {
        "active" => granted.user.remove,
        "encKey" => granted.user.enc_key_update,
        "signKey" => granted.user.sign_key_update,
        p if p.starts_with("permissions.") => granted.user.permissions_update,
        _ => true,
    }
}

impl UserRecord {
    /// Whether this user's permission flags allow it to issue `request`.
    pub fn can_issue(&self, request: &UsersRequest) -> bool {
        let granted = self.permissions.flags();
        match request.kind {
            RequestKind::Create => granted.user.add,
            RequestKind::Update => request
                .fields_updated
                .iter()
                .all(|path| can_update_path(&granted, path)),
        }
    }
}
