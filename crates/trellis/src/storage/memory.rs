//! In-memory storage backend.
//!
//! Backs the engine in tests and short-lived tooling. Handles share state
//! through `Rc<RefCell<_>>`, so cloning a store or log yields another view
//! of the same data.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};

use crate::domain::{ActivityEvent, EventKind, Ticket};
use crate::storage::{ActivityLog, TicketStore};

/// In-memory ticket store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tickets: Rc<RefCell<HashMap<String, Ticket>>>,
    fail_saves: Rc<RefCell<HashSet<String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future `save` of the given ticket ID fail.
    ///
    /// Exercises the best-effort paths: a cascade must survive one ticket
    /// failing to persist and still process the rest.
    pub fn fail_saves_for(&self, id: &str) {
        self.fail_saves.borrow_mut().insert(id.to_string());
    }
}

impl TicketStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Ticket> {
        self.tickets
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow!("ticket not found: {id}"))
    }

    fn exists(&self, id: &str) -> Result<bool> {
        Ok(self.tickets.borrow().contains_key(id))
    }

    fn list(&self) -> Result<Vec<Ticket>> {
        Ok(self.tickets.borrow().values().cloned().collect())
    }

    fn save(&self, ticket: &Ticket) -> Result<()> {
        if self.fail_saves.borrow().contains(&ticket.id) {
            bail!("simulated save failure for ticket '{}'", ticket.id);
        }
        self.tickets
            .borrow_mut()
            .insert(ticket.id.clone(), ticket.clone());
        Ok(())
    }
}

/// In-memory activity log.
#[derive(Clone, Default)]
pub struct MemoryLog {
    events: Rc<RefCell<Vec<ActivityEvent>>>,
}

impl MemoryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ActivityLog for MemoryLog {
    fn append(&self, event: &ActivityEvent) -> Result<()> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }

    fn has_event_since(
        &self,
        ticket_id: &str,
        kind: EventKind,
        since: DateTime<Utc>,
    ) -> Result<bool> {
        Ok(self
            .events
            .borrow()
            .iter()
            .any(|e| e.ticket_id == ticket_id && e.kind == kind && e.timestamp > since))
    }

    fn events_for(&self, ticket_id: &str) -> Result<Vec<ActivityEvent>> {
        Ok(self
            .events
            .borrow()
            .iter()
            .filter(|e| e.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}
