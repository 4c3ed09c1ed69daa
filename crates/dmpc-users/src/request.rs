//! Users requests, as carried in a permanent envelope's payload.
//!
//! ```json
//! {
//!   "type": "update",
//!   "timestamp": "2024-01-01T00:00:00Z",
//!   "fieldsUpdated": ["active", "permissions.user.add"],
//!   "data": {
//!     "id": "alice",
//!     "active": false,
//!     "permissions": {"user": {"add": true}}
//!   }
//! }
//! ```
//!
//! Public keys in `data` are PEM text. Fields the engine does not know are
//! ignored when decoding.

use serde::{Deserialize, Serialize};

use dmpc_core::{PublicKey, UserId};

use crate::error::{Result, UsersError};
use crate::lww::Timestamp;
use crate::record::{Permissions, UserRecord};

/// What a users request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Create,
    Update,
}

/// Candidate values for a user's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserObject {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc_key: Option<PublicKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign_key: Option<PublicKey>,
    #[serde(default)]
    pub permissions: Permissions,
    #[serde(default)]
    pub active: bool,
}

impl UserObject {
    pub fn new(id: UserId) -> Self {
        Self {
            id,
            enc_key: None,
            sign_key: None,
            permissions: Permissions::default(),
            active: false,
        }
    }
}

/// A decoded users request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub fields_updated: Vec<String>,
    pub data: UserObject,
}

impl UsersRequest {
    /// A create request for `data`.
    pub fn create(data: UserObject, timestamp: Timestamp) -> Self {
        Self {
            kind: RequestKind::Create,
            timestamp,
            fields_updated: Vec::new(),
            data,
        }
    }

    /// An update request naming `fields` of `data`.
    pub fn update<I, S>(data: UserObject, fields: I, timestamp: Timestamp) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RequestKind::Update,
            timestamp,
            fields_updated: fields.into_iter().map(Into::into).collect(),
            data,
        }
    }

    /// Decode from JSON bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| UsersError::Parse(e.to_string()))
    }

    /// Encode to JSON bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| UsersError::Parse(e.to_string()))
    }

    /// The user this request targets.
    pub fn user_id(&self) -> &UserId {
        &self.data.id
    }

    /// Build the record a create request describes.
    ///
    /// Both keys are required; every field is stamped with the request
    /// timestamp.
    pub fn to_record(&self) -> Result<UserRecord> {
        let enc_key = self
            .data
            .enc_key
            .clone()
            .ok_or_else(|| UsersError::Parse("create request is missing encKey".into()))?;
        let sign_key = self
            .data
            .sign_key
            .clone()
            .ok_or_else(|| UsersError::Parse("create request is missing signKey".into()))?;

        Ok(UserRecord::new(
            self.data.id.clone(),
            enc_key,
            sign_key,
            self.data.permissions,
            self.data.active,
            self.timestamp,
        ))
    }
}
