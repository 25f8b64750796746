//! Dependency resolution and the auto-unblock cascade.
//!
//! A dependency is resolved once the ticket it names has reached a terminal
//! status. A dependency naming a ticket that does not exist counts as
//! unresolved: the intent to wait is honored even when the target is missing.
//!
//! The cascade is single-hop and best-effort. When a ticket resolves, only
//! its direct dependents are examined; a dependent that fails to persist is
//! logged and skipped so the rest of the cascade still runs.

use anyhow::Result;
use tracing::{debug, warn};

use crate::domain::{ActivityEvent, Status, Ticket};
use crate::graph::TicketGraph;
use crate::storage::{ActivityLog, TicketStore};

/// Unresolved dependency IDs of `ticket`, in declaration order.
///
/// A dependency is resolved iff it names a ticket in the snapshot with a
/// terminal status. Missing IDs are unresolved.
pub fn check_dependencies(ticket: &Ticket, graph: &TicketGraph<'_>) -> Vec<String> {
    ticket
        .dependencies
        .iter()
        .filter(|dep| match graph.get(dep) {
            Some(target) => !target.status.is_terminal(),
            None => true,
        })
        .cloned()
        .collect()
}

/// Walks the reverse dependency edges and restores dependency-blocked
/// tickets whose last dependency has resolved.
pub struct DependencyResolver<S: TicketStore, L: ActivityLog> {
    store: S,
    log: L,
}

impl<S: TicketStore, L: ActivityLog> DependencyResolver<S, L> {
    pub fn new(store: S, log: L) -> Self {
        Self { store, log }
    }

    /// Every stored ticket whose dependency list contains `ticket_id`,
    /// sorted by ID.
    pub fn find_dependents(&self, ticket_id: &str) -> Result<Vec<Ticket>> {
        let mut dependents: Vec<Ticket> = self
            .store
            .list()?
            .into_iter()
            .filter(|t| t.dependencies.iter().any(|d| d == ticket_id))
            .collect();
        dependents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(dependents)
    }

    /// Restore direct dependents of `ticket_id` whose dependencies have all
    /// resolved.
    ///
    /// Only tickets that are Blocked with a recorded prior status qualify;
    /// manual holds (prior status absent) are never released here. Each
    /// restored ticket gets its prior status back, a fresh status timestamp,
    /// and an auto-unblocked audit entry.
    ///
    /// Best-effort: a dependent whose save or audit append fails is logged
    /// and skipped. Returns the tickets actually changed, sorted by ID.
    /// Running again once nothing qualifies returns an empty vec.
    pub fn auto_unblock(&self, ticket_id: &str) -> Result<Vec<Ticket>> {
        let snapshot = self.store.list()?;
        let graph = TicketGraph::new(&snapshot);

        let mut changed = Vec::new();
        for dependent in graph.dependents_of(ticket_id) {
            let Some(prior) = dependent.prior_status else {
                continue;
            };
            if dependent.status != Status::Blocked {
                continue;
            }
            if !check_dependencies(dependent, &graph).is_empty() {
                continue;
            }

            let mut restored = dependent.clone();
            restored.set_status(prior);
            restored.prior_status = None;

            if let Err(err) = self.store.save(&restored) {
                warn!(
                    ticket_id = %restored.id,
                    error = %err,
                    "skipping dependent: failed to persist auto-unblock"
                );
                continue;
            }
            if let Err(err) = self
                .log
                .append(&ActivityEvent::auto_unblocked(&restored.id, prior))
            {
                warn!(
                    ticket_id = %restored.id,
                    error = %err,
                    "auto-unblock persisted but audit entry failed"
                );
            }
            debug!(ticket_id = %restored.id, restored_to = %prior, "auto-unblocked");
            changed.push(restored);
        }
        Ok(changed)
    }
}
