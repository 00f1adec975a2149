//! Layout node types
//!
//! A workspace's tree is stored as a flat sequence of [`LayoutNode`] records,
//! each addressed by a [`NodeId`] and pointing at its owner through `parent`.

use crate::grid::GridSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a node, unique within one workspace
///
/// `0` is reserved: it is the `parent` of the root node and never names a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Parent value carried by the root node
    pub const ROOT_PARENT: NodeId = NodeId(0);

    /// Create node id
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this is the reserved root-parent value
    #[inline]
    #[must_use]
    pub const fn is_root_parent(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identifier of a widget instance
///
/// Unlike [`NodeId`], the uuid survives save/load round trips and keys the
/// workspace-scoped provider store.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetUuid(pub String);

impl WidgetUuid {
    /// Generate a fresh random uuid
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

impl From<&str> for WidgetUuid {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for WidgetUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Main axis of a container or grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Children laid out left to right
    #[default]
    Row,
    /// Children laid out top to bottom
    Col,
}

/// Node variant
///
/// `direction` only exists on the variants where it means something, so a
/// widget can never carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeKind {
    /// Row/column grid with a cell map
    Grid {
        /// Main axis
        #[serde(default)]
        direction: Direction,
        /// Cell map
        grid: GridSpec,
    },
    /// Flex-style container
    Container {
        /// Main axis
        #[serde(default)]
        direction: Direction,
        /// Workspace name this container accepts in drops
        workspace: String,
    },
    /// Widget instance
    Widget {
        /// Stable instance id
        uuid: WidgetUuid,
        /// Container workspace name this widget must live in
        #[serde(default, rename = "parentWorkspaceName")]
        parent_workspace: Option<String>,
    },
}

impl NodeKind {
    /// Short lowercase label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Grid { .. } => "grid",
            NodeKind::Container { .. } => "container",
            NodeKind::Widget { .. } => "widget",
        }
    }

    /// Direction, if the variant has one
    #[must_use]
    pub fn direction(&self) -> Option<Direction> {
        match self {
            NodeKind::Grid { direction, .. } | NodeKind::Container { direction, .. } => {
                Some(*direction)
            }
            NodeKind::Widget { .. } => None,
        }
    }
}

/// One element of a workspace's tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    /// Unique id within the workspace
    pub id: NodeId,
    /// Owner id, [`NodeId::ROOT_PARENT`] for the root
    pub parent: NodeId,
    /// Rank among siblings
    #[serde(default)]
    pub order: u32,
    /// Variant payload
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Implementation identifier resolved by the widget registry
    #[serde(default)]
    pub component: Option<String>,
    /// Layout hint
    #[serde(default)]
    pub scrollable: bool,
    /// Layout hint
    #[serde(default)]
    pub width: Option<String>,
    /// Layout hint
    #[serde(default)]
    pub height: Option<String>,
    /// Provider type -> chosen provider name
    #[serde(default)]
    pub selected_providers: BTreeMap<String, String>,
    /// Widget-declared configuration values
    #[serde(default)]
    pub user_prefs: BTreeMap<String, serde_json::Value>,
    /// Derived child count, recomputed whenever the tree index is rebuilt
    #[serde(default)]
    pub has_children: usize,
}

impl LayoutNode {
    fn with_kind(id: NodeId, parent: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            parent,
            order: 0,
            kind,
            component: None,
            scrollable: false,
            width: None,
            height: None,
            selected_providers: BTreeMap::new(),
            user_prefs: BTreeMap::new(),
            has_children: 0,
        }
    }

    /// New container node
    #[must_use]
    pub fn container(id: NodeId, parent: NodeId, workspace: impl Into<String>) -> Self {
        Self::with_kind(
            id,
            parent,
            NodeKind::Container {
                direction: Direction::Row,
                workspace: workspace.into(),
            },
        )
    }

    /// New grid node
    #[must_use]
    pub fn grid(id: NodeId, parent: NodeId, grid: GridSpec) -> Self {
        Self::with_kind(
            id,
            parent,
            NodeKind::Grid {
                direction: Direction::Row,
                grid,
            },
        )
    }

    /// New widget node
    #[must_use]
    pub fn widget(id: NodeId, parent: NodeId, component: impl Into<String>, uuid: WidgetUuid) -> Self {
        let mut node = Self::with_kind(
            id,
            parent,
            NodeKind::Widget {
                uuid,
                parent_workspace: None,
            },
        );
        node.component = Some(component.into());
        node
    }

    /// Set order
    #[must_use]
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Set the component identifier
    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Set the parent workspace name on a widget; no-op on other kinds
    #[must_use]
    pub fn with_parent_workspace(mut self, name: impl Into<String>) -> Self {
        if let NodeKind::Widget {
            parent_workspace, ..
        } = &mut self.kind
        {
            *parent_workspace = Some(name.into());
        }
        self
    }

    /// Set direction on a container or grid; no-op on widgets
    #[must_use]
    pub fn with_direction(mut self, new_direction: Direction) -> Self {
        self.set_direction(new_direction);
        self
    }

    /// Set direction in place, returns false for widgets
    pub fn set_direction(&mut self, new_direction: Direction) -> bool {
        match &mut self.kind {
            NodeKind::Grid { direction, .. } | NodeKind::Container { direction, .. } => {
                *direction = new_direction;
                true
            }
            NodeKind::Widget { .. } => false,
        }
    }

    /// Whether this is the root node
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_root_parent()
    }

    /// Whether the node can own children
    #[inline]
    #[must_use]
    pub fn can_have_children(&self) -> bool {
        !matches!(self.kind, NodeKind::Widget { .. })
    }

    /// Widget uuid, if this is a widget
    #[must_use]
    pub fn widget_uuid(&self) -> Option<&WidgetUuid> {
        match &self.kind {
            NodeKind::Widget { uuid, .. } => Some(uuid),
            _ => None,
        }
    }

    /// Grid payload, if this is a grid
    #[must_use]
    pub fn grid_spec(&self) -> Option<&GridSpec> {
        match &self.kind {
            NodeKind::Grid { grid, .. } => Some(grid),
            _ => None,
        }
    }

    /// Mutable grid payload, if this is a grid
    pub fn grid_spec_mut(&mut self) -> Option<&mut GridSpec> {
        match &mut self.kind {
            NodeKind::Grid { grid, .. } => Some(grid),
            _ => None,
        }
    }
}
