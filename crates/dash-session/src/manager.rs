//! Workspace session (tab) manager
//!
//! Owns the open tabs, the active selection and each tab's edit state.
//! Only the active tab is editable, and leaving a tab that is `Editing`
//! (switch, open another, close) abandons the edit by restoring its
//! snapshot first.

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::mode::EditMode;
use crate::tab::{SaveTicket, Tab};
use dash_api::{AppId, DashboardApi};
use dash_layout::{Workspace, WorkspaceId};
use dash_provider::RegistrySnapshot;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Session over zero or more open workspaces
pub struct SessionManager {
    pub(crate) config: SessionConfig,
    pub(crate) app: AppId,
    pub(crate) api: Arc<dyn DashboardApi>,
    pub(crate) registry: Option<RegistrySnapshot>,
    pub(crate) tabs: IndexMap<WorkspaceId, Tab>,
    pub(crate) active: Option<WorkspaceId>,
    pub(crate) catalog: Vec<Workspace>,
    pub(crate) next_ticket: u64,
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("app", &self.app)
            .field("tabs", &self.tabs.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("catalog", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create an empty session
    #[must_use]
    pub fn new(config: SessionConfig, api: Arc<dyn DashboardApi>) -> Self {
        let app = AppId::new(config.app_id.clone());
        Self {
            config,
            app,
            api,
            registry: None,
            tabs: IndexMap::new(),
            active: None,
            catalog: Vec::new(),
            next_ticket: 0,
        }
    }

    /// Check provider binds against a widget registry snapshot
    #[must_use]
    pub fn with_registry(mut self, registry: RegistrySnapshot) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Application id used for collaborator calls
    #[must_use]
    pub fn app(&self) -> &AppId {
        &self.app
    }

    /// Open tabs in order
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> + '_ {
        self.tabs.values()
    }

    /// Number of open tabs
    #[must_use]
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// Lookup tab
    #[must_use]
    pub fn tab(&self, id: &WorkspaceId) -> Option<&Tab> {
        self.tabs.get(id)
    }

    /// Active tab id
    #[must_use]
    pub fn active_id(&self) -> Option<&WorkspaceId> {
        self.active.as_ref()
    }

    /// Active tab
    #[must_use]
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active.as_ref().and_then(|id| self.tabs.get(id))
    }

    /// Workspace of the active tab
    #[must_use]
    pub fn active_workspace(&self) -> Option<&Workspace> {
        self.active_tab().map(Tab::workspace)
    }

    /// Mode of the active tab, `None` without one
    #[must_use]
    pub fn active_mode(&self) -> Option<EditMode> {
        self.active_tab().map(Tab::mode)
    }

    /// Workspaces known from the last list/save/delete echo
    #[must_use]
    pub fn catalog(&self) -> &[Workspace] {
        &self.catalog
    }

    pub(crate) fn active_tab_mut(&mut self) -> Result<&mut Tab, SessionError> {
        let id = self.active.as_ref().ok_or(SessionError::NoActiveTab)?;
        self.tabs
            .get_mut(id)
            .ok_or_else(|| SessionError::TabNotFound(id.clone()))
    }

    pub(crate) fn issue_ticket(&mut self) -> SaveTicket {
        self.next_ticket += 1;
        SaveTicket(self.next_ticket)
    }

    /// Abandon any edit on the active tab before focus moves elsewhere
    fn leave_active(&mut self) {
        let untitled = self.config.untitled_name.clone();
        if let Ok(tab) = self.active_tab_mut() {
            if tab.cancel_edit(&untitled) {
                info!(tab = %tab.id(), "abandoned edit on leaving tab");
            }
        }
    }

    fn enter_initial_mode(&mut self) {
        if self.config.initial_mode == EditMode::Editing {
            if let Ok(tab) = self.active_tab_mut() {
                tab.begin_edit();
            }
        }
    }

    /// Open a workspace, or focus its tab if already open
    ///
    /// The tab enters the configured initial mode, `Preview` by default.
    ///
    /// # Errors
    /// `TabLimit` when a new tab would exceed `max_open_tabs`
    #[tracing::instrument(skip_all, fields(workspace = %workspace.id))]
    pub fn open_tab(&mut self, workspace: Workspace) -> Result<&Tab, SessionError> {
        let id = workspace.id.clone();
        let exists = self.tabs.contains_key(&id);
        if !exists {
            if let Some(limit) = self.config.max_open_tabs {
                if self.tabs.len() >= limit {
                    return Err(SessionError::TabLimit { limit });
                }
            }
        }

        self.leave_active();
        if !exists {
            let tab = Tab::new(workspace, &self.config.untitled_name);
            info!(tab = %id, name = tab.name(), "opened tab");
            self.tabs.insert(id.clone(), tab);
        } else {
            debug!(tab = %id, "focused existing tab");
        }
        self.active = Some(id.clone());
        self.enter_initial_mode();

        self.tabs.get(&id).ok_or(SessionError::TabNotFound(id))
    }

    /// Close a tab, discarding its unsaved edits
    ///
    /// If it was active, the last remaining tab becomes active.
    ///
    /// # Errors
    /// `TabNotFound`
    #[tracing::instrument(skip(self), fields(tab = %id))]
    pub fn close_tab(&mut self, id: &WorkspaceId) -> Result<Tab, SessionError> {
        let tab = self
            .tabs
            .shift_remove(id)
            .ok_or_else(|| SessionError::TabNotFound(id.clone()))?;
        if self.active.as_ref() == Some(id) {
            self.active = self.tabs.keys().last().cloned();
        }
        info!(
            tab = %id,
            discarded_edit = tab.mode() == EditMode::Editing,
            active = ?self.active,
            "closed tab"
        );
        Ok(tab)
    }

    /// Focus a tab in `Preview`
    ///
    /// # Errors
    /// `TabNotFound`
    #[tracing::instrument(skip(self), fields(tab = %id))]
    pub fn switch_tab(&mut self, id: &WorkspaceId) -> Result<(), SessionError> {
        if !self.tabs.contains_key(id) {
            return Err(SessionError::TabNotFound(id.clone()));
        }
        self.leave_active();
        self.active = Some(id.clone());
        info!(tab = %id, "switched tab");
        Ok(())
    }

    /// Replace the cached workspace (and name) of the tab with the same id
    ///
    /// # Errors
    /// `TabNotFound`
    #[tracing::instrument(skip_all, fields(workspace = %workspace.id))]
    pub fn update_tab_workspace(&mut self, workspace: Workspace) -> Result<(), SessionError> {
        let untitled = self.config.untitled_name.clone();
        let tab = self
            .tabs
            .get_mut(&workspace.id)
            .ok_or_else(|| SessionError::TabNotFound(workspace.id.clone()))?;
        tab.set_workspace(workspace, &untitled);
        debug!(tab = %tab.id(), "updated tab workspace");
        Ok(())
    }

    /// Enter `Editing` on the active tab; `Ok(false)` if already editing
    ///
    /// # Errors
    /// `NoActiveTab`
    #[tracing::instrument(skip(self))]
    pub fn begin_edit(&mut self) -> Result<bool, SessionError> {
        let tab = self.active_tab_mut()?;
        let entered = tab.begin_edit();
        if entered {
            info!(tab = %tab.id(), "entered editing mode");
        }
        Ok(entered)
    }

    /// Restore the active tab's snapshot; `Ok(false)` if in `Preview`
    ///
    /// # Errors
    /// `NoActiveTab`
    #[tracing::instrument(skip(self))]
    pub fn cancel_edit(&mut self) -> Result<bool, SessionError> {
        let untitled = self.config.untitled_name.clone();
        let tab = self.active_tab_mut()?;
        let restored = tab.cancel_edit(&untitled);
        if restored {
            info!(tab = %tab.id(), "cancelled edit, snapshot restored");
        }
        Ok(restored)
    }

    /// Apply an edit to the active tab's workspace
    ///
    /// The tab cache is replaced only when `edit` succeeds.
    ///
    /// # Errors
    /// `NoActiveTab`, `NotEditing`, or whatever `edit` returns
    pub fn edit_active<F>(&mut self, edit: F) -> Result<(), SessionError>
    where
        F: FnOnce(&Workspace) -> Result<Workspace, SessionError>,
    {
        let untitled = self.config.untitled_name.clone();
        let tab = self.active_tab_mut()?;
        if tab.mode() != EditMode::Editing {
            return Err(SessionError::NotEditing);
        }
        let next = edit(tab.workspace())?;
        tab.set_workspace(next, &untitled);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_api::InMemoryDashboard;
    use dash_layout::{Layout, LayoutNode, NodeId};
    use pretty_assertions::assert_eq;

    fn session(config: SessionConfig) -> SessionManager {
        let api = Arc::new(InMemoryDashboard::new(AppId::new(config.app_id.clone())));
        SessionManager::new(config, api)
    }

    fn workspace(id: &str, name: Option<&str>) -> Workspace {
        let layout = Layout::with_root(LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout")).unwrap();
        let ws = Workspace::new(WorkspaceId::from(id), layout);
        match name {
            Some(name) => ws.with_name(name),
            None => ws,
        }
    }

    #[test]
    fn open_names_untitled() {
        let mut s = session(SessionConfig::default());
        let tab = s.open_tab(workspace("a", None)).unwrap();
        assert_eq!(tab.name(), "Untitled");
        assert_eq!(tab.mode(), EditMode::Preview);
    }

    #[test]
    fn open_respects_initial_mode() {
        let mut s = session(SessionConfig::default().with_initial_mode(EditMode::Editing));
        s.open_tab(workspace("a", Some("A"))).unwrap();
        assert_eq!(s.active_mode(), Some(EditMode::Editing));
    }

    #[test]
    fn tab_limit() {
        let mut s = session(SessionConfig::default().with_max_open_tabs(1));
        s.open_tab(workspace("a", None)).unwrap();
        assert!(s.open_tab(workspace("a", None)).is_ok());
        assert!(matches!(
            s.open_tab(workspace("b", None)),
            Err(SessionError::TabLimit { limit: 1 })
        ));
    }

    #[test]
    fn close_active_picks_last_remaining() {
        let mut s = session(SessionConfig::default());
        for id in ["a", "b", "c"] {
            s.open_tab(workspace(id, None)).unwrap();
        }
        s.switch_tab(&WorkspaceId::from("a")).unwrap();
        s.close_tab(&WorkspaceId::from("a")).unwrap();
        assert_eq!(s.active_id(), Some(&WorkspaceId::from("c")));

        s.close_tab(&WorkspaceId::from("b")).unwrap();
        assert_eq!(s.active_id(), Some(&WorkspaceId::from("c")));
        assert!(matches!(
            s.close_tab(&WorkspaceId::from("b")),
            Err(SessionError::TabNotFound(_))
        ));
    }

    #[test]
    fn edits_need_editing_mode() {
        let mut s = session(SessionConfig::default());
        assert!(matches!(s.begin_edit(), Err(SessionError::NoActiveTab)));
        s.open_tab(workspace("a", None)).unwrap();
        let err = s.edit_active(|ws| Ok(ws.clone().with_name("x"))).unwrap_err();
        assert!(matches!(err, SessionError::NotEditing));

        assert!(s.begin_edit().unwrap());
        assert!(!s.begin_edit().unwrap());
        s.edit_active(|ws| Ok(ws.clone().with_name("x"))).unwrap();
        assert_eq!(s.active_tab().unwrap().name(), "x");
    }

    #[test]
    fn switching_away_abandons_edit() {
        let mut s = session(SessionConfig::default());
        s.open_tab(workspace("a", Some("A"))).unwrap();
        s.open_tab(workspace("b", Some("B"))).unwrap();
        s.switch_tab(&WorkspaceId::from("a")).unwrap();
        s.begin_edit().unwrap();
        s.edit_active(|ws| Ok(ws.clone().with_name("edited"))).unwrap();

        s.switch_tab(&WorkspaceId::from("b")).unwrap();
        let a = s.tab(&WorkspaceId::from("a")).unwrap();
        assert_eq!(a.mode(), EditMode::Preview);
        assert_eq!(a.name(), "A");
    }

    #[test]
    fn update_tab_workspace_refreshes_name() {
        let mut s = session(SessionConfig::default());
        s.open_tab(workspace("a", Some("A"))).unwrap();
        s.update_tab_workspace(workspace("a", Some("Renamed"))).unwrap();
        assert_eq!(s.active_tab().unwrap().name(), "Renamed");
        assert!(matches!(
            s.update_tab_workspace(workspace("zz", None)),
            Err(SessionError::TabNotFound(_))
        ));
    }
}
