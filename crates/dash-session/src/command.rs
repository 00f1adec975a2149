//! Synchronous UI events
//!
//! Each [`SessionCommand`] runs to completion against the session before the
//! next one is handled. Tree edits target the active tab and need `Editing`.

use crate::error::SessionError;
use crate::manager::SessionManager;
use dash_layout::grid::{self, CellKey, Span};
use dash_layout::{
    drag, Direction, GridError, Layout, LayoutError, LayoutNode, NodeId, WidgetUuid, Workspace, WorkspaceId,
};
use dash_provider::{bind, bind_declared, reconcile, unbind, RegistrySnapshot};
use tracing::debug;

/// One UI event
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Open or focus a workspace
    OpenTab(Workspace),
    /// Close a tab
    CloseTab(WorkspaceId),
    /// Focus a tab
    SwitchTab(WorkspaceId),
    /// Enter `Editing`
    BeginEdit,
    /// Leave `Editing`, restoring the snapshot
    CancelEdit,
    /// Re-parent without the drag tag check
    MoveNode {
        /// Node to move
        node: NodeId,
        /// New parent
        parent: NodeId,
    },
    /// Drop a dragged node on a target
    DropNode {
        /// Dragged node
        node: NodeId,
        /// Drop target
        target: NodeId,
    },
    /// Append a new child; its id is assigned by the tree
    AddNode {
        /// Parent container or grid
        parent: NodeId,
        /// Node payload
        node: LayoutNode,
    },
    /// Remove a node and its descendants
    ///
    /// The provider store is rebuilt from node bindings afterwards, so
    /// store-only selections are dropped too.
    RemoveNode(NodeId),
    /// Swap a node's fields, rebuilding the provider store like `RemoveNode`
    ReplaceNode {
        /// Node to replace
        id: NodeId,
        /// Replacement with the same id
        node: LayoutNode,
    },
    /// Assign or clear a grid cell's component
    SetCellComponent {
        /// Grid node
        grid: NodeId,
        /// Cell
        cell: CellKey,
        /// Component, `None` to clear
        component: Option<String>,
    },
    /// Span a grid cell over its neighbours
    MergeCells {
        /// Grid node
        grid: NodeId,
        /// Anchor cell
        cell: CellKey,
        /// New span
        span: Span,
    },
    /// Remove a grid cell's span
    SplitCell {
        /// Grid node
        grid: NodeId,
        /// Anchor cell
        cell: CellKey,
    },
    /// Select a provider for a widget
    BindProvider {
        /// Widget
        widget: WidgetUuid,
        /// Provider type
        provider_type: String,
        /// Provider name
        provider_name: String,
    },
    /// Clear a widget's provider selection
    UnbindProvider {
        /// Widget
        widget: WidgetUuid,
        /// Provider type
        provider_type: String,
    },
    /// Move a node to a sibling position
    ChangeOrder {
        /// Node
        node: NodeId,
        /// Target index among siblings
        position: usize,
    },
    /// Set a container's flow direction
    ChangeDirection {
        /// Container
        node: NodeId,
        /// Direction
        direction: Direction,
    },
    /// Toggle root scrolling
    SetRootScrollable(bool),
}

impl SessionCommand {
    /// Whether the command edits the active tab's tree
    #[must_use]
    pub fn is_edit(&self) -> bool {
        !matches!(
            self,
            Self::OpenTab(_) | Self::CloseTab(_) | Self::SwitchTab(_) | Self::BeginEdit | Self::CancelEdit
        )
    }
}

/// Result of a handled command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// State changed
    Applied,
    /// Node added under the given id
    Added(NodeId),
    /// Contractual no-op, e.g. `BeginEdit` while editing
    Unchanged,
}

fn with_layout(workspace: &Workspace, layout: Layout) -> Workspace {
    let mut next = workspace.clone();
    next.layout = layout;
    next
}

fn edit_grid<F>(workspace: &Workspace, id: NodeId, edit: F) -> Result<Workspace, SessionError>
where
    F: FnOnce(&LayoutNode) -> Result<LayoutNode, GridError>,
{
    let node = edit(workspace.layout.find_by_id(id)?).map_err(LayoutError::from)?;
    Ok(with_layout(workspace, workspace.layout.replace(id, node)?))
}

impl SessionManager {
    /// Handle one UI event
    ///
    /// A failing edit leaves the tab unchanged.
    ///
    /// # Errors
    /// Whatever the underlying operation rejects
    pub fn handle(&mut self, command: SessionCommand) -> Result<CommandOutcome, SessionError> {
        debug!(?command, "handling command");
        let changed = |applied: bool| {
            if applied {
                CommandOutcome::Applied
            } else {
                CommandOutcome::Unchanged
            }
        };

        match command {
            SessionCommand::OpenTab(workspace) => {
                self.open_tab(workspace)?;
                Ok(CommandOutcome::Applied)
            }
            SessionCommand::CloseTab(id) => {
                self.close_tab(&id)?;
                Ok(CommandOutcome::Applied)
            }
            SessionCommand::SwitchTab(id) => {
                self.switch_tab(&id)?;
                Ok(CommandOutcome::Applied)
            }
            SessionCommand::BeginEdit => self.begin_edit().map(changed),
            SessionCommand::CancelEdit => self.cancel_edit().map(changed),
            SessionCommand::AddNode { parent, node } => {
                let mut added = NodeId::ROOT_PARENT;
                self.edit_active(|ws| {
                    let (layout, id) = ws.layout.insert_child(parent, node)?;
                    added = id;
                    Ok(with_layout(ws, layout))
                })?;
                Ok(CommandOutcome::Added(added))
            }
            command => {
                let registry = self.registry.clone();
                self.edit_active(|ws| apply_edit(ws, command, registry.as_ref()))?;
                Ok(CommandOutcome::Applied)
            }
        }
    }
}

fn apply_edit(
    ws: &Workspace,
    command: SessionCommand,
    registry: Option<&RegistrySnapshot>,
) -> Result<Workspace, SessionError> {
    let next = match command {
        SessionCommand::MoveNode { node, parent } => with_layout(ws, drag::move_node(&ws.layout, node, parent)?),
        SessionCommand::DropNode { node, target } => with_layout(ws, drag::drop_node(&ws.layout, node, target)?),
        SessionCommand::RemoveNode(id) => reconcile(&with_layout(ws, ws.layout.remove_subtree(id)?)),
        SessionCommand::ReplaceNode { id, node } => reconcile(&with_layout(ws, ws.layout.replace(id, node)?)),
        SessionCommand::SetCellComponent {
            grid: id,
            cell,
            component,
        } => edit_grid(ws, id, |node| grid::set_cell_component(node, cell, component))?,
        SessionCommand::MergeCells { grid: id, cell, span } => {
            edit_grid(ws, id, |node| grid::merge_span(node, cell, span))?
        }
        SessionCommand::SplitCell { grid: id, cell } => edit_grid(ws, id, |node| grid::split_span(node, cell))?,
        SessionCommand::BindProvider {
            widget,
            provider_type,
            provider_name,
        } => match registry {
            Some(registry) => bind_declared(ws, registry, &widget, &provider_type, &provider_name)?,
            None => bind(ws, &widget, &provider_type, &provider_name)?,
        },
        SessionCommand::UnbindProvider { widget, provider_type } => unbind(ws, &widget, &provider_type)?,
        SessionCommand::ChangeOrder { node, position } => with_layout(ws, ws.layout.change_order(node, position)?),
        SessionCommand::ChangeDirection { node, direction } => {
            with_layout(ws, ws.layout.change_direction(node, direction)?)
        }
        SessionCommand::SetRootScrollable(scrollable) => with_layout(ws, ws.layout.set_root_scrollable(scrollable)?),
        SessionCommand::OpenTab(_)
        | SessionCommand::CloseTab(_)
        | SessionCommand::SwitchTab(_)
        | SessionCommand::BeginEdit
        | SessionCommand::CancelEdit
        | SessionCommand::AddNode { .. } => return Ok(ws.clone()),
    };
    Ok(next)
}
