//! Borrowed snapshot index over a set of tickets.
//!
//! A [`TicketGraph`] is built from a slice of tickets and indexes them by ID
//! for the duration of one operation. It does not own the tickets and is
//! rebuilt from storage whenever the dependency resolver or an analysis pass
//! needs a consistent view. Dependency edges may dangle (reference IDs not
//! in the snapshot) and may form cycles; the graph tolerates both and leaves
//! interpretation to its callers.

use std::collections::HashMap;

use crate::domain::Ticket;

/// An ID-indexed view over a ticket snapshot.
pub struct TicketGraph<'a> {
    by_id: HashMap<&'a str, &'a Ticket>,
}

impl<'a> TicketGraph<'a> {
    /// Index every ticket in the snapshot.
    ///
    /// Duplicate IDs keep the last occurrence; storage guarantees uniqueness
    /// so this only matters for hand-built test fixtures.
    pub fn new(tickets: &'a [Ticket]) -> Self {
        let by_id = tickets.iter().map(|t| (t.id.as_str(), t)).collect();
        Self { by_id }
    }

    /// Index only the live (non-terminal) tickets in the snapshot.
    pub fn live(tickets: &'a [Ticket]) -> Self {
        let by_id = tickets
            .iter()
            .filter(|t| t.is_live())
            .map(|t| (t.id.as_str(), t))
            .collect();
        Self { by_id }
    }

    /// Look up a ticket by ID.
    pub fn get(&self, id: &str) -> Option<&'a Ticket> {
        self.by_id.get(id).copied()
    }

    /// True if the snapshot contains the ID.
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Tickets in the snapshot that list `id` as a dependency, sorted by ID.
    ///
    /// This is the reverse-edge scan: dependencies are stored on the
    /// depending ticket, so finding dependents walks the whole snapshot.
    pub fn dependents_of(&self, id: &str) -> Vec<&'a Ticket> {
        let mut dependents: Vec<&'a Ticket> = self
            .by_id
            .values()
            .filter(|t| t.dependencies.iter().any(|d| d == id))
            .copied()
            .collect();
        dependents.sort_by(|a, b| a.id.cmp(&b.id));
        dependents
    }

    /// Number of tickets in the snapshot.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// True if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// IDs in the snapshot, sorted.
    pub fn ids(&self) -> Vec<&'a str> {
        let mut ids: Vec<&'a str> = self.by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
