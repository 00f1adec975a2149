//! Workspace definition
//!
//! [`Workspace`] is the validated, in-memory form; [`WorkspaceRecord`] is the
//! wire form exchanged with the storage collaborator. Converting a record
//! into a workspace rebuilds and normalizes every node.

use crate::error::LayoutError;
use crate::grid::{instantiate, GridTemplate};
use crate::node::{LayoutNode, WidgetUuid};
use crate::tree::Layout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Workspace identifier, also used as the tab id
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub String);

impl WorkspaceId {
    /// Generate a fresh random id
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorkspaceId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Menu folder a workspace is filed under
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuId(pub String);

impl From<&str> for MenuId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Widget uuid -> provider type -> provider name
pub type ProviderStore = BTreeMap<WidgetUuid, BTreeMap<String, String>>;

/// One dashboard definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Identifier
    pub id: WorkspaceId,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Assigned folder
    #[serde(default)]
    pub menu_id: Option<MenuId>,
    /// Theme override
    #[serde(default)]
    pub theme_key: Option<String>,
    /// Normalized tree
    pub layout: Layout,
    /// Bumped on every successful save
    #[serde(default)]
    pub version: i64,
    /// Workspace-scoped copy of the widget provider bindings
    #[serde(default)]
    pub selected_providers: ProviderStore,
}

impl Workspace {
    /// Workspace around an existing layout
    #[must_use]
    pub fn new(id: WorkspaceId, layout: Layout) -> Self {
        Self {
            id,
            name: None,
            menu_id: None,
            theme_key: None,
            layout,
            version: 0,
            selected_providers: BTreeMap::new(),
        }
    }

    /// New dashboard whose root is the grid built from `template`
    ///
    /// Gets a fresh id and a version stamped from the current time.
    ///
    /// # Errors
    /// Grid validation failures of the template
    pub fn from_template(
        name: impl Into<String>,
        template: &GridTemplate,
        menu_id: Option<MenuId>,
    ) -> Result<Self, LayoutError> {
        let root = instantiate(template)?;
        let layout = Layout::with_root(root)?;
        let mut workspace = Self::new(WorkspaceId::generate(), layout).with_name(name);
        workspace.menu_id = menu_id;
        workspace.version = chrono::Utc::now().timestamp_millis();
        tracing::info!(
            workspace = %workspace.id,
            template = %template.name,
            "created workspace from template"
        );
        Ok(workspace)
    }

    /// Set name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set menu folder
    #[must_use]
    pub fn with_menu(mut self, menu_id: MenuId) -> Self {
        self.menu_id = Some(menu_id);
        self
    }

    /// Set theme override
    #[must_use]
    pub fn with_theme(mut self, theme_key: impl Into<String>) -> Self {
        self.theme_key = Some(theme_key.into());
        self
    }

    /// Set version
    #[must_use]
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Name, or `fallback` when unnamed
    #[must_use]
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    /// Find the widget node carrying `uuid`
    #[must_use]
    pub fn widget(&self, uuid: &WidgetUuid) -> Option<&LayoutNode> {
        self.layout.iter().find(|node| node.widget_uuid() == Some(uuid))
    }
}

/// Wire form of a workspace, with an unvalidated node list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceRecord {
    /// Identifier
    pub id: WorkspaceId,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Assigned folder
    #[serde(default)]
    pub menu_id: Option<MenuId>,
    /// Theme override
    #[serde(default)]
    pub theme_key: Option<String>,
    /// Raw node sequence
    #[serde(default)]
    pub layout: Vec<LayoutNode>,
    /// Save stamp
    #[serde(default)]
    pub version: i64,
    /// Workspace-scoped provider bindings
    #[serde(default)]
    pub selected_providers: ProviderStore,
}

impl TryFrom<WorkspaceRecord> for Workspace {
    type Error = LayoutError;

    fn try_from(record: WorkspaceRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            layout: Layout::normalize(record.layout)?,
            id: record.id,
            name: record.name,
            menu_id: record.menu_id,
            theme_key: record.theme_key,
            version: record.version,
            selected_providers: record.selected_providers,
        })
    }
}

impl From<Workspace> for WorkspaceRecord {
    fn from(workspace: Workspace) -> Self {
        Self {
            id: workspace.id,
            name: workspace.name,
            menu_id: workspace.menu_id,
            theme_key: workspace.theme_key,
            layout: workspace.layout.into(),
            version: workspace.version,
            selected_providers: workspace.selected_providers,
        }
    }
}

impl From<&Workspace> for WorkspaceRecord {
    fn from(workspace: &Workspace) -> Self {
        workspace.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureError;
    use crate::grid::TemplateCell;
    use crate::node::NodeId;
    use serde_json::json;

    fn template() -> GridTemplate {
        GridTemplate {
            name: "single".to_string(),
            rows: 1,
            cols: 2,
            gap: 4,
            cells: vec![TemplateCell::new(1, 1), TemplateCell::new(1, 2)],
        }
    }

    #[test]
    fn from_template_builds_grid_root() {
        let ws = Workspace::from_template("Ops", &template(), Some(MenuId::from("m1"))).unwrap();
        assert_eq!(ws.name.as_deref(), Some("Ops"));
        assert_eq!(ws.menu_id, Some(MenuId::from("m1")));
        assert_eq!(ws.layout.len(), 1);
        assert_eq!(ws.layout.root().id, NodeId(1));
        assert_eq!(ws.layout.root().grid_spec().unwrap().gap, 4);
        assert!(ws.version > 0);
    }

    #[test]
    fn record_conversion_normalizes() {
        let record: WorkspaceRecord = serde_json::from_value(json!({
            "id": "ws-1",
            "name": null,
            "menuId": "m1",
            "themeKey": "dark",
            "version": 12,
            "layout": [
                {"id": 1, "parent": 0, "kind": "container", "workspace": "layout"},
                {"id": 2, "parent": 1, "kind": "widget", "uuid": "uuid-2", "component": "Clock"}
            ],
            "selectedProviders": {"uuid-2": {"time": "ntp"}}
        }))
        .unwrap();

        let ws = Workspace::try_from(record.clone()).unwrap();
        assert_eq!(ws.display_name("Untitled"), "Untitled");
        assert_eq!(ws.layout.root().has_children, 1);
        assert_eq!(ws.theme_key.as_deref(), Some("dark"));
        assert!(ws.widget(&WidgetUuid::from("uuid-2")).is_some());

        let back = WorkspaceRecord::from(&ws);
        assert_eq!(back.id, record.id);
        assert_eq!(back.selected_providers, record.selected_providers);
    }

    #[test]
    fn record_with_two_roots_fails() {
        let record = WorkspaceRecord {
            id: WorkspaceId::from("bad"),
            name: None,
            menu_id: None,
            theme_key: None,
            layout: vec![
                LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
                LayoutNode::container(NodeId(2), NodeId::ROOT_PARENT, "layout"),
            ],
            version: 0,
            selected_providers: BTreeMap::new(),
        };
        assert_eq!(
            Workspace::try_from(record).unwrap_err(),
            LayoutError::Structure(StructureError::MultipleRoots { count: 2 })
        );
    }
}
