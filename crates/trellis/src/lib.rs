//! Dependency-aware ticket workflow engine.
//!
//! Tickets move through a fixed lifecycle, declare ordered dependencies on
//! other tickets, and automatically block and unblock as those dependencies
//! resolve. On top of the data model the crate provides a layered layout of
//! the live dependency graph and an enumeration of the longest dependency
//! chains. The library is embeddable: storage and the activity log are
//! traits with an in-memory implementation included.

pub mod critical_path;
pub mod domain;
pub mod engine;
pub mod graph;
pub mod layout;
pub mod resolver;
pub mod storage;
pub mod workflow;

// Re-export commonly used types
pub use critical_path::{critical_paths, DEFAULT_LIMIT};
pub use domain::{ActivityEvent, EventKind, Priority, Status, Ticket};
pub use engine::WorkflowEngine;
pub use graph::TicketGraph;
pub use layout::{layout_graph, GraphLayout, LayoutEdge};
pub use resolver::{check_dependencies, DependencyResolver};
pub use storage::{ActivityLog, MemoryLog, MemoryStore, TicketStore};
pub use workflow::{
    can_transition, resolve_alias, validate_transition, TransitionError,
};
