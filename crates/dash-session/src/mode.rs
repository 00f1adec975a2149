//! Edit-mode state machine
//!
//! `Preview --begin_edit--> Editing` captures a snapshot of the workspace;
//! `Editing --cancel--> Preview` hands the snapshot back for restoring;
//! `Editing --save--> Preview` discards it. Every other transition is a
//! no-op. A snapshot exists exactly while the state is `Editing`.

use dash_layout::Workspace;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode of one tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    /// Read-only view
    #[default]
    Preview,
    /// Structure may be mutated
    Editing,
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Preview => f.write_str("preview"),
            EditMode::Editing => f.write_str("editing"),
        }
    }
}

/// Mode plus the snapshot taken on entering `Editing`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditState {
    snapshot: Option<Workspace>,
}

impl EditState {
    /// Preview state
    #[inline]
    #[must_use]
    pub fn preview() -> Self {
        Self::default()
    }

    /// Current mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> EditMode {
        if self.snapshot.is_some() {
            EditMode::Editing
        } else {
            EditMode::Preview
        }
    }

    /// Whether editing
    #[inline]
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Snapshot captured by the last `begin_edit`
    #[must_use]
    pub fn snapshot(&self) -> Option<&Workspace> {
        self.snapshot.as_ref()
    }

    /// Enter `Editing`, snapshotting `current`; false if already editing
    pub fn begin_edit(&mut self, current: &Workspace) -> bool {
        if self.is_editing() {
            return false;
        }
        self.snapshot = Some(current.clone());
        true
    }

    /// Leave `Editing`, returning the workspace to restore
    ///
    /// `None` when already in `Preview`.
    pub fn cancel(&mut self) -> Option<Workspace> {
        self.snapshot.take()
    }

    /// Leave `Editing` after a successful save; false if not editing
    pub fn finish_save(&mut self) -> bool {
        self.snapshot.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_layout::{Layout, LayoutNode, NodeId, WorkspaceId};

    fn workspace(name: &str) -> Workspace {
        let layout = Layout::with_root(LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout")).unwrap();
        Workspace::new(WorkspaceId::from("ws"), layout).with_name(name)
    }

    #[test]
    fn transitions() {
        let mut state = EditState::preview();
        assert_eq!(state.mode(), EditMode::Preview);
        assert!(state.cancel().is_none());
        assert!(!state.finish_save());

        assert!(state.begin_edit(&workspace("a")));
        assert!(!state.begin_edit(&workspace("b")));
        assert_eq!(state.snapshot().unwrap().name.as_deref(), Some("a"));

        let restored = state.cancel().unwrap();
        assert_eq!(restored.name.as_deref(), Some("a"));
        assert_eq!(state.mode(), EditMode::Preview);

        assert!(state.begin_edit(&workspace("c")));
        assert!(state.finish_save());
        assert!(state.snapshot().is_none());
    }
}
