//! Workspace session layer (dash-session)
//!
//! Open workspaces live in tabs owned by a [`SessionManager`]. Each tab has
//! its own edit state machine:
//!
//! ```text
//! Preview --begin_edit--> Editing --cancel--> Preview (snapshot restored)
//!                            |
//!                            +--save ok--> Preview (echoed workspace, version bumped)
//!                            +--save err-> Editing (edits kept)
//! ```
//!
//! Tree edits arrive as [`SessionCommand`]s and apply only to the active tab
//! while it is `Editing`. Persistence goes through [`dash_api::DashboardApi`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! let mut session = SessionManager::new(SessionConfig::default(), api);
//! session.refresh_workspaces().await?;
//! session.open_from_catalog(&id)?;
//! session.handle(SessionCommand::BeginEdit)?;
//! session.handle(SessionCommand::DropNode { node, target })?;
//! session.save_active().await?;
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod manager;
pub mod mode;
pub mod persist;
pub mod simulator;
pub mod tab;

// Re-exports
pub use command::{CommandOutcome, SessionCommand};
pub use config::{ConfigError, SessionConfig};
pub use error::SessionError;
pub use manager::SessionManager;
pub use mode::{EditMode, EditState};
pub use persist::{PendingSave, SaveOutcome};
pub use simulator::{run_simulator, SimulatorConfig, SimulatorReport};
pub use tab::{SaveTicket, Tab};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
