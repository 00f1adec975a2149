//! Dashboard collaborator contract (dash-api)
//!
//! The session layer talks to storage, menus, themes, settings, providers
//! and the MCP tool bridge only through [`DashboardApi`]. Each call returns
//! `Result<DispatchOutcome<T>, DispatchError>` so "not dispatched" and
//! "dispatched, result pending" stay distinct; the outcome resolves to a
//! [`Completion`] named after the boundary event it represents.

pub mod api;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod memory;
pub mod types;

// Re-exports
pub use api::{DashboardApi, Dispatch};
pub use dispatch::{channel, Completion, DispatchOutcome, Responder};
pub use error::{CollaboratorError, DispatchError};
pub use event::{Action, EventName, Feature, Operation, Outcome};
pub use memory::InMemoryDashboard;
pub use types::*;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
