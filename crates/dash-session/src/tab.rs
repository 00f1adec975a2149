//! Open tabs

use crate::mode::{EditMode, EditState};
use dash_layout::{Workspace, WorkspaceId};
use std::fmt;

/// Identifies one outstanding save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SaveTicket(pub u64);

impl fmt::Display for SaveTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save-{}", self.0)
    }
}

/// In-memory session wrapper around one workspace
///
/// The tab id is the workspace id.
#[derive(Debug, Clone)]
pub struct Tab {
    name: String,
    workspace: Workspace,
    edit: EditState,
    pending_save: Option<SaveTicket>,
}

impl Tab {
    pub(crate) fn new(workspace: Workspace, untitled: &str) -> Self {
        Self {
            name: workspace.display_name(untitled).to_string(),
            workspace,
            edit: EditState::preview(),
            pending_save: None,
        }
    }

    /// Tab id
    #[inline]
    #[must_use]
    pub fn id(&self) -> &WorkspaceId {
        &self.workspace.id
    }

    /// Tab name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cached workspace
    #[inline]
    #[must_use]
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> EditMode {
        self.edit.mode()
    }

    /// Edit state, including the snapshot
    #[must_use]
    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Outstanding save, if any
    #[must_use]
    pub fn pending_save(&self) -> Option<SaveTicket> {
        self.pending_save
    }

    pub(crate) fn set_workspace(&mut self, workspace: Workspace, untitled: &str) {
        self.name = workspace.display_name(untitled).to_string();
        self.workspace = workspace;
    }

    pub(crate) fn begin_edit(&mut self) -> bool {
        self.edit.begin_edit(&self.workspace)
    }

    /// Restore the snapshot; false if not editing
    ///
    /// An outstanding save belongs to the abandoned edit, so its ticket is
    /// dropped and its completion comes back stale.
    pub(crate) fn cancel_edit(&mut self, untitled: &str) -> bool {
        match self.edit.cancel() {
            Some(snapshot) => {
                self.set_workspace(snapshot, untitled);
                self.pending_save = None;
                true
            }
            None => false,
        }
    }

    pub(crate) fn finish_save(&mut self) -> bool {
        self.edit.finish_save()
    }

    pub(crate) fn set_pending_save(&mut self, ticket: Option<SaveTicket>) {
        self.pending_save = ticket;
    }
}
