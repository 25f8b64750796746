//! Storage abstractions for tickets and the activity log.
//!
//! The engine and resolver are generic over these traits so that tests can
//! run against the in-memory backend with injected faults, and a future
//! persistent backend can slot in without touching the workflow code.

mod memory;

pub use memory::{MemoryLog, MemoryStore};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::domain::{ActivityEvent, EventKind, Ticket};

/// Backend-agnostic ticket persistence.
///
/// `Clone` is required so the engine and resolver can share one backend;
/// implementations are expected to be cheap handles over shared state.
pub trait TicketStore: Clone {
    /// Fetch a ticket by ID. Absence is an error ("ticket not found").
    fn get(&self, id: &str) -> Result<Ticket>;

    /// True if a ticket with the ID exists.
    fn exists(&self, id: &str) -> Result<bool>;

    /// All tickets, in unspecified order.
    fn list(&self) -> Result<Vec<Ticket>>;

    /// Insert or replace a ticket keyed by its ID.
    fn save(&self, ticket: &Ticket) -> Result<()>;
}

/// Append-only audit trail of what happened to each ticket.
pub trait ActivityLog: Clone {
    /// Record an event.
    fn append(&self, event: &ActivityEvent) -> Result<()>;

    /// True if an event of `kind` exists for `ticket_id` strictly after
    /// `since`.
    fn has_event_since(
        &self,
        ticket_id: &str,
        kind: EventKind,
        since: DateTime<Utc>,
    ) -> Result<bool>;

    /// All events for a ticket, oldest first.
    fn events_for(&self, ticket_id: &str) -> Result<Vec<ActivityEvent>>;
}
