//! Core domain types for the ticket workflow engine.
//!
//! This module defines the fundamental data structures used throughout the
//! system: tickets, their lifecycle statuses, and the audit events recorded
//! against the activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Ticket lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Captured but not yet scheduled for work
    Backlog,
    /// Ready to be picked up
    Open,
    /// Currently being worked on
    InProgress,
    /// Work finished, awaiting review
    Review,
    /// Review rejected, needs another pass
    Rework,
    /// Parked, either waiting on dependencies or held by a human
    Blocked,
    /// Completed
    Done,
    /// No longer relevant
    Cancelled,
}

impl Status {
    /// All statuses in lifecycle order.
    pub const ALL: [Status; 8] = [
        Status::Backlog,
        Status::Open,
        Status::InProgress,
        Status::Review,
        Status::Rework,
        Status::Blocked,
        Status::Done,
        Status::Cancelled,
    ];

    /// True for the terminal statuses. A terminal ticket counts as resolved
    /// for anything that depends on it.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Done | Status::Cancelled)
    }

    /// Canonical lowercase name, matching what [`resolve_alias`] accepts.
    ///
    /// [`resolve_alias`]: crate::workflow::resolve_alias
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Backlog => "backlog",
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Review => "review",
            Status::Rework => "rework",
            Status::Blocked => "blocked",
            Status::Done => "done",
            Status::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ticket priority level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Low priority
    Low,
    /// Normal priority (default)
    #[default]
    Normal,
    /// High priority
    High,
    /// Critical priority
    Critical,
}

/// A ticket representing a unit of work
///
/// The `prior_status` field is only ever populated while `status` is
/// [`Status::Blocked`]: `Some(s)` marks a dependency auto-block that will
/// restore to `s` once every dependency resolves, while `None` on a blocked
/// ticket marks a manual hold that only a human can release. The auto-block
/// and hold code paths in [`WorkflowEngine`] are the sole writers of this
/// field.
///
/// [`WorkflowEngine`]: crate::engine::WorkflowEngine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier, caller-supplied and immutable
    pub id: String,
    /// Short summary of the ticket
    pub title: String,
    /// Current lifecycle status
    pub status: Status,
    /// Restore target while dependency-blocked; None otherwise
    pub prior_status: Option<Status>,
    /// Assigned agent or person
    pub assignee: Option<String>,
    /// Priority level
    pub priority: Priority,
    /// IDs of tickets that must resolve first, in declaration order.
    /// Entries may reference tickets that do not (or no longer) exist,
    /// and the edge set as a whole may contain cycles.
    pub dependencies: Vec<String>,
    /// When the ticket was created
    pub created_at: DateTime<Utc>,
    /// When the ticket was last modified
    pub updated_at: DateTime<Utc>,
    /// When the current status was entered
    pub status_changed_at: DateTime<Utc>,
}

impl Ticket {
    /// Create a new open ticket with default values.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            status: Status::Open,
            prior_status: None,
            assignee: None,
            priority: Priority::Normal,
            dependencies: Vec::new(),
            created_at: now,
            updated_at: now,
            status_changed_at: now,
        }
    }

    /// True unless the ticket has reached a terminal status.
    pub fn is_live(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Move to a new status, stamping `status_changed_at` and `updated_at`.
    ///
    /// Does not touch `prior_status`; the caller decides whether the move is
    /// a hold, an auto-block, or a restore.
    pub fn set_status(&mut self, to: Status) {
        let now = Utc::now();
        self.status = to;
        self.status_changed_at = now;
        self.updated_at = now;
    }

    /// True if the ticket carries a non-empty assignee.
    pub fn has_assignee(&self) -> bool {
        self.assignee.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// Kind of an activity-log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Ticket was created
    Created,
    /// Status changed by a validated transition or an override
    StatusChanged,
    /// Free-text note recorded against the ticket
    NoteAdded,
    /// The dependency cascade restored a blocked ticket
    AutoUnblocked,
    /// A human parked the ticket
    Held,
    /// A hold was released
    Released,
}

/// An entry in the append-only activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event ID (UUID)
    pub id: String,
    /// Ticket this entry belongs to
    pub ticket_id: String,
    /// What happened
    pub kind: EventKind,
    /// When it happened
    pub timestamp: DateTime<Utc>,
    /// Free-form detail: note text, "from -> to", etc.
    pub detail: Option<String>,
}

impl ActivityEvent {
    fn new(ticket_id: &str, kind: EventKind, detail: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ticket_id: ticket_id.to_string(),
            kind,
            timestamp: Utc::now(),
            detail,
        }
    }

    /// Entry for a freshly created ticket.
    pub fn created(ticket: &Ticket) -> Self {
        Self::new(
            &ticket.id,
            EventKind::Created,
            Some(format!("created as {}", ticket.status)),
        )
    }

    /// Entry for a status change.
    pub fn status_changed(ticket_id: &str, from: Status, to: Status) -> Self {
        Self::new(
            ticket_id,
            EventKind::StatusChanged,
            Some(format!("{from} -> {to}")),
        )
    }

    /// Entry for a free-text note.
    pub fn note_added(ticket_id: &str, text: impl Into<String>) -> Self {
        Self::new(ticket_id, EventKind::NoteAdded, Some(text.into()))
    }

    /// Entry for a cascade-driven unblock.
    pub fn auto_unblocked(ticket_id: &str, restored: Status) -> Self {
        Self::new(
            ticket_id,
            EventKind::AutoUnblocked,
            Some(format!("restored to {restored}")),
        )
    }

    /// Entry for a manual hold.
    pub fn held(ticket_id: &str) -> Self {
        Self::new(ticket_id, EventKind::Held, None)
    }

    /// Entry for a released hold.
    pub fn released(ticket_id: &str, to: Status) -> Self {
        Self::new(ticket_id, EventKind::Released, Some(format!("released to {to}")))
    }
}
