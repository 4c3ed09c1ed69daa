//! # DMPC Kernel
//!
//! The unified API for DMPC: receive encrypted operations, establish who
//! signed them, and merge the requests they carry into user records.
//!
//! ## Overview
//!
//! An operation travels as a permanent envelope, usually wrapped in a
//! temporary envelope addressed to this node. Processing it:
//!
//! 1. Issues a ticket and marks it running
//! 2. Opens the temporary envelope with the node's private key
//! 3. Resolves the permanent envelope's `keyId` through a [`KeyStore`]
//! 4. Discovers the issuer and certifier among known users' signing keys
//! 5. Checks the issuer's permissions and applies the users request
//! 6. Marks the ticket `Success` or `Failed` with a reason
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dmpc_kernel::{Kernel, KernelConfig, MemoryKeyStore};
//! use dmpc_kernel::core::{KeyId, PrivateKey, SymmetricKey};
//!
//! # fn example(node_key: PrivateKey, bytes: Vec<u8>) {
//! let keys = MemoryKeyStore::new();
//! keys.insert(KeyId::new("KEY_ID"), SymmetricKey::generate());
//!
//! let kernel = Kernel::new(keys, KernelConfig::default());
//! let submission = kernel.process_temporary(&bytes, &node_key);
//! println!("{}: {:?}", submission.ticket, kernel.ticket_status(&submission.ticket));
//! # }
//! ```
//!
//! ## Re-exports
//!
//! - `dmpc_kernel::core` - keys, ciphers and identifiers
//! - `dmpc_kernel::envelope` - temporary and permanent envelopes
//! - `dmpc_kernel::users` - user records and the merge engine
//! - `dmpc_kernel::status` - tickets and status codes

pub mod error;
pub mod kernel;
pub mod keystore;
pub mod shutdown;

pub use dmpc_core as core;
pub use dmpc_envelope as envelope;
pub use dmpc_status as status;
pub use dmpc_users as users;

pub use error::{KernelError, Result};
pub use kernel::{Kernel, KernelConfig, Submission, DEFAULT_MAX_PAYLOAD_BYTES};
pub use keystore::{KeyStore, MemoryKeyStore};
pub use shutdown::{
    termination_channel, wait_for_termination, TerminationCause, TerminationHandle,
    TerminationListener,
};
