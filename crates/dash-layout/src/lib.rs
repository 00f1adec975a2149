//! Dashboard layout model (dash-layout)
//!
//! The structural core of a dashboard workspace:
//! 1. **Tree**: a flat, id-addressed node arena with a child index ([`Layout`])
//! 2. **Grid algebra**: template instantiation and cell merge/split ([`grid`])
//! 3. **Drag-and-drop**: drag tags, legal targets and atomic re-parenting ([`drag`])
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use dash_layout::prelude::*;
//!
//! let template = GridTemplate::from_json(text)?;
//! let workspace = Workspace::from_template("Ops", &template, None)?;
//!
//! let (layout, panel) = workspace
//!     .layout
//!     .insert_child(workspace.layout.root().id, LayoutNode::container(NodeId(0), NodeId(0), "layout"))?;
//! let layout = drag::move_node(&layout, panel, layout.root().id)?;
//! ```

pub mod drag;
pub mod error;
pub mod grid;
pub mod node;
pub mod tree;
pub mod workspace;

// Re-exports
pub use error::*;
pub use node::*;
pub use tree::{normalize, Layout};
pub use workspace::{MenuId, ProviderStore, Workspace, WorkspaceId, WorkspaceRecord};

/// Commonly used types
pub mod prelude {
    pub use crate::drag::{self, drag_tag, drop_node, legal_targets, move_node, DragTag};
    pub use crate::error::{GridError, IllegalReason, LayoutError, StructureError};
    pub use crate::grid::{
        self, CellKey, GridCell, GridSpec, GridTemplate, Span, TemplateCell,
    };
    pub use crate::node::{Direction, LayoutNode, NodeId, NodeKind, WidgetUuid};
    pub use crate::tree::Layout;
    pub use crate::workspace::{MenuId, Workspace, WorkspaceId, WorkspaceRecord};
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
