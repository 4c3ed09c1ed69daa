//! # DMPC Testkit
//!
//! Testing utilities for DMPC.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: shared RSA identities, sealing helpers, and a kernel
//!   seeded with an issuer and a certifier
//! - **Generators**: Proptest strategies for payloads, identifiers,
//!   permissions and timestamped field writes
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use dmpc_testkit::generators::flag_writes;
//!
//! proptest! {
//!     #[test]
//!     fn writes_converge(writes in flag_writes(16)) {
//!         // apply in any order, compare replicas
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use dmpc_testkit::fixtures::{create_request, identities, timestamp, KernelFixture};
//!
//! let fixture = KernelFixture::new().unwrap();
//! let request = create_request("alice", &identities().outsider.public_key(), timestamp(10));
//! let submission = fixture.submit(&request).unwrap();
//! assert!(submission.is_success());
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{identities, Identities, KernelFixture};
pub use generators::FlagWrite;
