//! Session errors
//!
//! Layout and provider errors are programmer errors: the UI fed the session
//! bad input. Collaborator errors are always recoverable: the session state
//! is left as it was and the call may be retried.

use crate::config::ConfigError;
use dash_api::{CollaboratorError, DispatchError, EventName};
use dash_layout::{LayoutError, WorkspaceId};
use dash_provider::ProviderError;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Structural or grid edit rejected
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    /// Provider binding rejected
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Collaborator call could not be dispatched
    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    /// Collaborator call failed after dispatch
    #[error("{event}: {source}")]
    Collaborator {
        /// Boundary event, `*_ERROR`
        event: EventName,
        /// Failure reported by the collaborator
        source: CollaboratorError,
    },

    /// Configuration rejected
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Operation needs an active tab
    #[error("no active tab")]
    NoActiveTab,

    /// Tab id not open
    #[error("tab not found: {0}")]
    TabNotFound(WorkspaceId),

    /// Structural edit outside `Editing`
    #[error("active tab is not in editing mode")]
    NotEditing,

    /// A save for this tab is still outstanding
    #[error("save already in flight for {0}")]
    SaveInFlight(WorkspaceId),

    /// Opening another tab would exceed the configured limit
    #[error("cannot open more than {limit} tabs")]
    TabLimit {
        /// Configured maximum
        limit: usize,
    },

    /// Save completed but the echoed list lacks the saved workspace
    #[error("saved workspace {0} missing from echoed list")]
    MissingEcho(WorkspaceId),
}

impl SessionError {
    /// Whether the collaborator refused or failed the call
    ///
    /// Local state is intact and the user may retry.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Dispatch(_) | Self::Collaborator { .. })
    }

    /// Whether the caller violated an invariant of the tree or the session
    #[inline]
    #[must_use]
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::Layout(_)
                | Self::Provider(_)
                | Self::NoActiveTab
                | Self::TabNotFound(_)
                | Self::NotEditing
        )
    }
}
