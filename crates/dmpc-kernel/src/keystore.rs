//! Key store abstraction.
//!
//! Permanent envelopes name their symmetric key by id. The kernel resolves
//! that id through a [`KeyStore`]; how keys are provisioned is up to the
//! implementation.

use std::collections::HashMap;

use parking_lot::RwLock;

use dmpc_core::{KeyId, SymmetricKey};

/// Resolves key ids to pre-shared symmetric keys.
pub trait KeyStore: Send + Sync {
    /// The key registered under `id`, if any.
    fn symmetric_key(&self, id: &KeyId) -> Option<SymmetricKey>;
}

/// In-memory key store.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: RwLock<HashMap<KeyId, SymmetricKey>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `key` under `id`, returning the key it replaced.
    pub fn insert(&self, id: KeyId, key: SymmetricKey) -> Option<SymmetricKey> {
        self.keys.write().insert(id, key)
    }

    pub fn remove(&self, id: &KeyId) -> Option<SymmetricKey> {
        self.keys.write().remove(id)
    }

    pub fn len(&self) -> usize {
        self.keys.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().is_empty()
    }
}

impl KeyStore for MemoryKeyStore {
    fn symmetric_key(&self, id: &KeyId) -> Option<SymmetricKey> {
        self.keys.read().get(id).cloned()
    }
}

impl std::fmt::Debug for MemoryKeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys = self.keys.read();
        f.debug_struct("MemoryKeyStore")
            .field("ids", &keys.keys().collect::<Vec<_>>())
            .finish()
    }
}
