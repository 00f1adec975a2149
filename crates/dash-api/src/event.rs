//! Boundary event names
//!
//! Every completion carries an event named `FEATURE_ACTION_COMPLETE` or
//! `FEATURE_ACTION_ERROR`, e.g. `WORKSPACE_SAVE_COMPLETE`.

use std::fmt;

/// Operation group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Workspace storage
    Workspace,
    /// Menu folders
    Menu,
    /// Themes
    Theme,
    /// Application settings
    Settings,
    /// Data providers
    Provider,
    /// MCP tool bridge
    Mcp,
}

impl Feature {
    fn as_str(self) -> &'static str {
        match self {
            Feature::Workspace => "WORKSPACE",
            Feature::Menu => "MENU",
            Feature::Theme => "THEME",
            Feature::Settings => "SETTINGS",
            Feature::Provider => "PROVIDER",
            Feature::Mcp => "MCP",
        }
    }
}

/// Operation within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Action {
    List,
    Get,
    Save,
    Delete,
    GetDataDirectory,
    StartServer,
    StopServer,
    CallTool,
    ListTools,
    ListResources,
    ReadResource,
    ServerStatus,
    GetCatalog,
}

impl Action {
    fn as_str(self) -> &'static str {
        match self {
            Action::List => "LIST",
            Action::Get => "GET",
            Action::Save => "SAVE",
            Action::Delete => "DELETE",
            Action::GetDataDirectory => "GET_DATA_DIRECTORY",
            Action::StartServer => "START_SERVER",
            Action::StopServer => "STOP_SERVER",
            Action::CallTool => "CALL_TOOL",
            Action::ListTools => "LIST_TOOLS",
            Action::ListResources => "LIST_RESOURCES",
            Action::ReadResource => "READ_RESOURCE",
            Action::ServerStatus => "SERVER_STATUS",
            Action::GetCatalog => "GET_CATALOG",
        }
    }
}

/// A feature/action pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// Group
    pub feature: Feature,
    /// Action
    pub action: Action,
}

impl Operation {
    /// Create operation
    #[inline]
    #[must_use]
    pub const fn new(feature: Feature, action: Action) -> Self {
        Self { feature, action }
    }

    /// Event emitted on success
    #[must_use]
    pub fn complete(self) -> EventName {
        EventName {
            operation: self,
            outcome: Outcome::Complete,
        }
    }

    /// Event emitted on failure
    #[must_use]
    pub fn error(self) -> EventName {
        EventName {
            operation: self,
            outcome: Outcome::Error,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.feature.as_str(), self.action.as_str())
    }
}

/// Completion outcome suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// `_COMPLETE`
    Complete,
    /// `_ERROR`
    Error,
}

/// Full boundary event name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventName {
    /// Operation
    pub operation: Operation,
    /// Outcome
    pub outcome: Outcome,
}

impl EventName {
    /// Whether this is a `_COMPLETE` event
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome == Outcome::Complete
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.outcome {
            Outcome::Complete => "COMPLETE",
            Outcome::Error => "ERROR",
        };
        write!(f, "{}_{}", self.operation, suffix)
    }
}
