//! Status transition rules for tickets.
//!
//! The transition table is a pure lookup: it decides whether an edge between
//! two statuses exists, and nothing else. Side effects (persisting, audit
//! events, the unblock cascade) live in [`crate::engine`]. The assignee and
//! note requirements sit beside the table as predicates the engine checks
//! before applying a transition.

use thiserror::Error;

use crate::domain::Status;

/// Errors produced while validating a requested transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    /// The ticket is already in the requested status
    #[error("ticket is already {status}")]
    SameStatus {
        /// The status the ticket already has
        status: Status,
    },
    /// The transition table has no edge between the two statuses
    #[error("cannot move a ticket from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: Status,
        /// Requested status
        to: Status,
    },
    /// The requested status name matched neither a canonical name nor an alias
    #[error("unknown status '{input}' (expected one of: {accepted})")]
    UnknownStatus {
        /// What the caller supplied
        input: String,
        /// Comma-separated canonical names
        accepted: String,
    },
    /// A transition-dependent policy was not satisfied
    #[error("{0}")]
    MissingPrecondition(String),
}

/// Check whether the transition table has an edge from `from` to `to`.
///
/// `Blocked` may move to any other status: releasing a block snaps back to
/// the ticket's prior status, bypassing the table, so the table itself places
/// no restriction on the target. The terminal statuses have no outgoing
/// edges; only [`WorkflowEngine::override_status`] can leave them.
///
/// [`WorkflowEngine::override_status`]: crate::engine::WorkflowEngine::override_status
pub fn can_transition(from: Status, to: Status) -> bool {
    use Status::*;
    match (from, to) {
        (Blocked, t) => t != Blocked,
        (Backlog, Open | Blocked) => true,
        (Open, InProgress | Blocked) => true,
        (InProgress, Review | Blocked) => true,
        (Review, Done | Rework | Blocked) => true,
        (Rework, InProgress | Blocked) => true,
        _ => false,
    }
}

/// Validate a requested transition.
///
/// Fails with [`TransitionError::SameStatus`] when `from == to` and with
/// [`TransitionError::IllegalTransition`] when the table has no such edge.
///
/// # Examples
///
/// ```
/// use trellis::domain::Status;
/// use trellis::workflow::{validate_transition, TransitionError};
///
/// assert!(validate_transition(Status::Open, Status::InProgress).is_ok());
/// assert_eq!(
///     validate_transition(Status::Open, Status::Done),
///     Err(TransitionError::IllegalTransition {
///         from: Status::Open,
///         to: Status::Done,
///     })
/// );
/// ```
pub fn validate_transition(from: Status, to: Status) -> Result<(), TransitionError> {
    if from == to {
        return Err(TransitionError::SameStatus { status: from });
    }
    if !can_transition(from, to) {
        return Err(TransitionError::IllegalTransition { from, to });
    }
    Ok(())
}

/// Resolve a free-form status name or verb to a canonical status.
///
/// Matching is case-insensitive. Besides the canonical names, common verbs
/// are accepted: "start" begins work, "submit" sends to review, "reject"
/// sends back to rework, "complete" finishes, and so on.
pub fn resolve_alias(name: &str) -> Result<Status, TransitionError> {
    match name.to_lowercase().as_str() {
        "backlog" => Ok(Status::Backlog),
        "open" | "reopen" => Ok(Status::Open),
        "in-progress" | "in_progress" | "inprogress" | "start" | "begin" | "resume" => {
            Ok(Status::InProgress)
        }
        "review" | "submit" => Ok(Status::Review),
        "rework" | "reject" => Ok(Status::Rework),
        "blocked" | "block" | "hold" => Ok(Status::Blocked),
        "done" | "complete" | "finish" => Ok(Status::Done),
        "cancelled" | "canceled" | "cancel" => Ok(Status::Cancelled),
        _ => Err(TransitionError::UnknownStatus {
            input: name.to_string(),
            accepted: Status::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// True when entering `to` requires the ticket to carry a non-empty assignee.
pub fn requires_assignee(to: Status) -> bool {
    to == Status::InProgress
}

/// True when the transition requires a note recorded since the ticket last
/// entered its current status.
///
/// Only the in-progress → review edge carries this requirement; a review
/// reached from anywhere else (e.g. released from a block) does not.
pub fn requires_note(from: Status, to: Status) -> bool {
    from == Status::InProgress && to == Status::Review
}
