//! Workflow engine: the mutation layer over storage.
//!
//! Every operation loads the affected ticket, validates against the
//! transition machine and its policies, persists, and records an audit
//! event. Transitions into a terminal status additionally trigger the
//! dependency resolver's auto-unblock cascade on direct dependents.

use anyhow::{anyhow, bail, Result};
use tracing::{debug, warn};

use crate::domain::{ActivityEvent, EventKind, Status, Ticket};
use crate::graph::TicketGraph;
use crate::resolver::{check_dependencies, DependencyResolver};
use crate::storage::{ActivityLog, TicketStore};
use crate::workflow::{
    requires_assignee, requires_note, validate_transition, TransitionError,
};

/// Coordinates ticket mutations against a store and an activity log.
pub struct WorkflowEngine<S: TicketStore, L: ActivityLog> {
    store: S,
    log: L,
    resolver: DependencyResolver<S, L>,
}

impl<S: TicketStore, L: ActivityLog> WorkflowEngine<S, L> {
    pub fn new(store: S, log: L) -> Self {
        let resolver = DependencyResolver::new(store.clone(), log.clone());
        Self { store, log, resolver }
    }

    /// Create a ticket. Born Open, or Blocked with a restore target of Open
    /// when any listed dependency is unresolved at creation time.
    pub fn create_ticket(
        &self,
        id: &str,
        title: &str,
        dependencies: &[String],
    ) -> Result<Ticket> {
        if self.store.exists(id)? {
            bail!("ticket already exists: {id}");
        }
        if dependencies.iter().any(|d| d == id) {
            bail!("ticket cannot depend on itself: {id}");
        }

        let mut ticket = Ticket::new(id, title);
        ticket.dependencies = dependencies.to_vec();

        let snapshot = self.store.list()?;
        let graph = TicketGraph::new(&snapshot);
        if !check_dependencies(&ticket, &graph).is_empty() {
            ticket.status = Status::Blocked;
            ticket.prior_status = Some(Status::Open);
        }

        self.store.save(&ticket)?;
        self.log.append(&ActivityEvent::created(&ticket))?;
        debug!(ticket_id = %ticket.id, status = %ticket.status, "created ticket");
        Ok(ticket)
    }

    /// Apply a validated transition.
    ///
    /// Both policies are checked: entering InProgress requires an assignee,
    /// and leaving InProgress for Review requires a note recorded since the
    /// ticket entered InProgress. Entering a terminal status runs the
    /// auto-unblock cascade afterwards; cascade trouble is logged, never
    /// returned, because the transition itself already persisted.
    pub fn apply_transition(&self, id: &str, to: Status) -> Result<Ticket> {
        let mut ticket = self.store.get(id)?;
        let from = ticket.status;
        validate_transition(from, to)?;

        if requires_assignee(to) && !ticket.has_assignee() {
            return Err(TransitionError::MissingPrecondition(format!(
                "ticket '{id}' needs an assignee before moving to {to}"
            ))
            .into());
        }
        if requires_note(from, to)
            && !self
                .log
                .has_event_since(id, EventKind::NoteAdded, ticket.status_changed_at)?
        {
            return Err(TransitionError::MissingPrecondition(format!(
                "ticket '{id}' needs a note recorded while {from} before moving to {to}"
            ))
            .into());
        }

        ticket.set_status(to);
        if to != Status::Blocked {
            ticket.prior_status = None;
        }
        self.store.save(&ticket)?;
        self.log
            .append(&ActivityEvent::status_changed(id, from, to))?;

        if to.is_terminal() {
            self.cascade(id);
        }
        Ok(ticket)
    }

    /// Park a ticket manually. A held ticket has no restore target, so only
    /// [`unhold`] with an explicit status (or the prior status recorded by an
    /// auto-block) releases it; the dependency cascade never will.
    ///
    /// [`unhold`]: WorkflowEngine::unhold
    pub fn hold(&self, id: &str) -> Result<Ticket> {
        let mut ticket = self.store.get(id)?;
        validate_transition(ticket.status, Status::Blocked)?;

        ticket.set_status(Status::Blocked);
        ticket.prior_status = None;
        self.store.save(&ticket)?;
        self.log.append(&ActivityEvent::held(id))?;
        Ok(ticket)
    }

    /// Release a blocked ticket.
    ///
    /// The target is the explicit `to` when given, otherwise the recorded
    /// prior status. A manual hold has no prior status, so releasing one
    /// without a target fails.
    pub fn unhold(&self, id: &str, to: Option<Status>) -> Result<Ticket> {
        let mut ticket = self.store.get(id)?;
        if ticket.status != Status::Blocked {
            return Err(TransitionError::MissingPrecondition(format!(
                "ticket '{id}' is not blocked"
            ))
            .into());
        }
        let target = to.or(ticket.prior_status).ok_or_else(|| {
            anyhow!(TransitionError::MissingPrecondition(format!(
                "ticket '{id}' is manually held; releasing it needs a target status"
            )))
        })?;

        ticket.set_status(target);
        ticket.prior_status = None;
        self.store.save(&ticket)?;
        self.log.append(&ActivityEvent::released(id, target))?;

        if target.is_terminal() {
            self.cascade(id);
        }
        Ok(ticket)
    }

    /// Set a status without consulting the transition table or policies.
    /// This is the administrative escape hatch, including the only way out
    /// of Done or Cancelled.
    pub fn override_status(&self, id: &str, to: Status) -> Result<Ticket> {
        let mut ticket = self.store.get(id)?;
        let from = ticket.status;

        ticket.set_status(to);
        if to != Status::Blocked {
            ticket.prior_status = None;
        }
        self.store.save(&ticket)?;

        let mut event = ActivityEvent::status_changed(id, from, to);
        event.detail = Some(format!("{from} -> {to} (override)"));
        self.log.append(&event)?;

        if to.is_terminal() {
            self.cascade(id);
        }
        Ok(ticket)
    }

    /// Append a dependency to the ticket's ordered list.
    ///
    /// Adding an unresolved dependency to a live, non-blocked ticket blocks
    /// it with the current status as the restore target. Duplicates are
    /// no-ops.
    pub fn add_dependency(&self, id: &str, dep_id: &str) -> Result<Ticket> {
        if id == dep_id {
            bail!("ticket cannot depend on itself: {id}");
        }
        let mut ticket = self.store.get(id)?;
        if ticket.dependencies.iter().any(|d| d == dep_id) {
            return Ok(ticket);
        }
        ticket.dependencies.push(dep_id.to_string());

        let snapshot = self.store.list()?;
        let graph = TicketGraph::new(&snapshot);
        let should_block = ticket.is_live()
            && ticket.status != Status::Blocked
            && !check_dependencies(&ticket, &graph).is_empty();
        if should_block {
            let prior = ticket.status;
            ticket.set_status(Status::Blocked);
            ticket.prior_status = Some(prior);
            self.store.save(&ticket)?;
            self.log.append(&ActivityEvent::status_changed(
                id,
                prior,
                Status::Blocked,
            ))?;
            debug!(ticket_id = %id, dep_id = %dep_id, "auto-blocked on new dependency");
        } else {
            ticket.updated_at = chrono::Utc::now();
            self.store.save(&ticket)?;
        }
        Ok(ticket)
    }

    /// Remove a dependency. A dependency-blocked ticket whose last
    /// unresolved dependency goes away is restored to its prior status.
    pub fn remove_dependency(&self, id: &str, dep_id: &str) -> Result<Ticket> {
        let mut ticket = self.store.get(id)?;
        let before = ticket.dependencies.len();
        ticket.dependencies.retain(|d| d != dep_id);
        if ticket.dependencies.len() == before {
            return Ok(ticket);
        }
        ticket.updated_at = chrono::Utc::now();

        let restore = if ticket.status == Status::Blocked {
            match ticket.prior_status {
                Some(prior) => {
                    let snapshot = self.store.list()?;
                    let graph = TicketGraph::new(&snapshot);
                    check_dependencies(&ticket, &graph)
                        .is_empty()
                        .then_some(prior)
                }
                None => None,
            }
        } else {
            None
        };

        if let Some(prior) = restore {
            ticket.set_status(prior);
            ticket.prior_status = None;
            self.store.save(&ticket)?;
            self.log
                .append(&ActivityEvent::auto_unblocked(id, prior))?;
        } else {
            self.store.save(&ticket)?;
        }
        Ok(ticket)
    }

    /// Record a free-text note. Notes satisfy the review-gate policy.
    pub fn add_note(&self, id: &str, text: &str) -> Result<()> {
        if !self.store.exists(id)? {
            bail!("ticket not found: {id}");
        }
        self.log.append(&ActivityEvent::note_added(id, text))
    }

    /// Set or clear the assignee.
    pub fn assign(&self, id: &str, assignee: Option<&str>) -> Result<Ticket> {
        let mut ticket = self.store.get(id)?;
        ticket.assignee = assignee.map(str::to_string);
        ticket.updated_at = chrono::Utc::now();
        self.store.save(&ticket)?;
        Ok(ticket)
    }

    /// Direct dependents of a ticket, sorted by ID.
    pub fn dependents(&self, id: &str) -> Result<Vec<Ticket>> {
        self.resolver.find_dependents(id)
    }

    fn cascade(&self, id: &str) {
        match self.resolver.auto_unblock(id) {
            Ok(changed) if !changed.is_empty() => {
                debug!(ticket_id = %id, released = changed.len(), "cascade released dependents");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(ticket_id = %id, error = %err, "auto-unblock cascade failed");
            }
        }
    }
}
