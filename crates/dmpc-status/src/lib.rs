//! # DMPC Status
//!
//! Tickets for submitted operations and the status each one reached.
//!
//! ## Overview
//!
//! Every operation gets a [`Ticket`] when it is accepted for processing.
//! Its status then moves through a fixed lifecycle:
//!
//! ```text
//! Queued ──► Running ──► Success
//!    │           │
//!    └───────────┴─────► Failed
//! ```
//!
//! `Success` and `Failed` are terminal. A failed ticket carries a
//! [`FailReason`]: `Rejected` when the operation could not be trusted,
//! `Failed` when it was trusted but could not be applied.
//!
//! Updates arrive as raw integers and are range-checked before anything is
//! recorded.

pub mod codes;
pub mod error;
pub mod ticket;
pub mod tracker;

pub use codes::{FailReason, StatusCode};
pub use error::{Result, StatusError};
pub use ticket::{Ticket, TICKET_SIZE};
pub use tracker::{StatusRecord, StatusTracker};
