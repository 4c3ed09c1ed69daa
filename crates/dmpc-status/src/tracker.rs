//! Ticket status tracking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::codes::{FailReason, StatusCode};
use crate::error::{Result, StatusError};
use crate::ticket::Ticket;

/// Last recorded status of a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRecord {
    pub ticket: Ticket,
    pub status: StatusCode,
    pub reason: FailReason,
    pub result: Option<Vec<u8>>,
    pub errors: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

/// Issues tickets and records their progress.
#[derive(Debug, Default)]
pub struct StatusTracker {
    records: RwLock<HashMap<Ticket, StatusRecord>>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket in the `Queued` state.
    pub fn request_ticket(&self) -> Ticket {
        let mut records = self.records.write();
        let ticket = loop {
            let candidate = Ticket::generate();
            if !records.contains_key(&candidate) {
                break candidate;
            }
        };
        records.insert(
            ticket.clone(),
            StatusRecord {
                ticket: ticket.clone(),
                status: StatusCode::Queued,
                reason: FailReason::NoReason,
                result: None,
                errors: Vec::new(),
                updated_at: Utc::now(),
            },
        );
        ticket
    }

    /// Record a status update from raw codes.
    ///
    /// Both codes are range-checked before the ticket is looked up, so an
    /// out-of-range update never touches stored state.
    pub fn update_status(
        &self,
        ticket: &Ticket,
        status: u8,
        reason: u8,
        result: Option<Vec<u8>>,
        errors: Option<Vec<String>>,
    ) -> Result<()> {
        let status = StatusCode::try_from(status)?;
        let reason = FailReason::try_from(reason)?;
        self.update(ticket, status, reason, result, errors)
    }

    /// Record a status update.
    pub fn update(
        &self,
        ticket: &Ticket,
        status: StatusCode,
        reason: FailReason,
        result: Option<Vec<u8>>,
        errors: Option<Vec<String>>,
    ) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .get_mut(ticket)
            .ok_or_else(|| StatusError::UnknownTicket(ticket.clone()))?;

        if !record.status.can_transition_to(status) {
            return Err(StatusError::InvalidTransition {
                from: record.status,
                to: status,
            });
        }

        tracing::debug!(%ticket, from = ?record.status, to = ?status, ?reason, "status update");
        record.status = status;
        record.reason = reason;
        if result.is_some() {
            record.result = result;
        }
        if let Some(errors) = errors {
            record.errors = errors;
        }
        record.updated_at = Utc::now();
        Ok(())
    }

    /// Current status of a ticket.
    pub fn get(&self, ticket: &Ticket) -> Option<StatusRecord> {
        self.records.read().get(ticket).cloned()
    }

    /// Forget a ticket, returning its last record.
    pub fn remove(&self, ticket: &Ticket) -> Option<StatusRecord> {
        self.records.write().remove(ticket)
    }

    /// Forget every terminal ticket last updated before `older_than`.
    ///
    /// Returns how many tickets were dropped. Tickets still in flight are
    /// always kept.
    pub fn prune_terminal(&self, older_than: DateTime<Utc>) -> usize {
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, r| !(r.status.is_terminal() && r.updated_at < older_than));
        let pruned = before - records.len();
        if pruned > 0 {
            tracing::debug!(pruned, remaining = records.len(), "pruned terminal tickets");
        }
        pruned
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
