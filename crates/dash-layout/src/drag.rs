//! Drag-and-drop reparenting
//!
//! The drop surface compares a dragged node's [`DragTag`] against the tags a
//! target accepts. Containers are workspace-name agnostic and may land in any
//! container or grid; everything else must land in a container whose
//! `workspace` equals its tag.

use crate::error::{IllegalReason, LayoutError};
use crate::node::{LayoutNode, NodeId, NodeKind};
use crate::tree::Layout;
use std::collections::BTreeSet;
use std::fmt;
use tracing::debug;

/// Generic drag type of containers and grids
pub const LAYOUT_TAG: &str = "layout";

/// Drag type advertised by a node while it is dragged
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DragTag(String);

impl DragTag {
    /// Tag text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the generic `"layout"` tag
    #[inline]
    #[must_use]
    pub fn is_layout(&self) -> bool {
        self.0 == LAYOUT_TAG
    }
}

impl fmt::Display for DragTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tag of a dragged node
///
/// Containers and grids tag as `"layout"`. Widgets tag with their parent
/// workspace name, falling back to `"layout"` when they declare none.
#[must_use]
pub fn drag_tag(node: &LayoutNode) -> DragTag {
    match &node.kind {
        NodeKind::Widget {
            parent_workspace: Some(name),
            ..
        } => DragTag(name.clone()),
        _ => DragTag(LAYOUT_TAG.to_string()),
    }
}

/// Whether `target` accepts `dragged` by kind and workspace name
///
/// Ignores tree position; see [`legal_targets`] for cycle filtering.
#[must_use]
pub fn accepts(target: &LayoutNode, dragged: &LayoutNode) -> bool {
    if !target.can_have_children() {
        return false;
    }
    if matches!(dragged.kind, NodeKind::Container { .. }) {
        return true;
    }
    match &target.kind {
        NodeKind::Container { workspace, .. } => *workspace == drag_tag(dragged).0,
        _ => false,
    }
}

/// Every node `dragged` may be dropped into
///
/// Excludes the node itself and its descendants. The root never moves, so
/// its target set is empty.
///
/// # Errors
/// `NotFound` if `dragged` is absent
pub fn legal_targets(layout: &Layout, dragged: NodeId) -> Result<BTreeSet<NodeId>, LayoutError> {
    let node = layout.find_by_id(dragged)?;
    if node.is_root() {
        return Ok(BTreeSet::new());
    }
    Ok(layout
        .iter()
        .filter(|target| target.id != dragged)
        .filter(|target| accepts(target, node))
        .filter(|target| !layout.is_descendant(dragged, target.id))
        .map(|target| target.id)
        .collect())
}

fn check_move(layout: &Layout, node: NodeId, target: NodeId) -> Result<(), LayoutError> {
    let moved = layout.find_by_id(node)?;
    if moved.is_root() {
        return Err(LayoutError::illegal(node, target, IllegalReason::RootNode));
    }
    let Some(destination) = layout.get(target) else {
        return Err(LayoutError::illegal(node, target, IllegalReason::MissingTarget));
    };
    if target == node || layout.is_descendant(node, target) {
        return Err(LayoutError::illegal(node, target, IllegalReason::Cycle));
    }
    if !destination.can_have_children() {
        return Err(LayoutError::illegal(node, target, IllegalReason::NotAContainer));
    }
    Ok(())
}

/// Detach `node` and append it as the last child of `new_parent`
///
/// The old sibling group is renumbered contiguously. Either the whole move
/// applies or `layout` is returned untouched through the error path.
///
/// # Errors
/// `NotFound` for a missing `node`; `IllegalTarget` when the target is
/// missing, is `node` or below it, cannot own children, or `node` is the root
pub fn move_node(layout: &Layout, node: NodeId, new_parent: NodeId) -> Result<Layout, LayoutError> {
    check_move(layout, node, new_parent)?;
    let next = layout.reattach(node, new_parent)?;
    debug!(node = %node, parent = %new_parent, "moved node");
    Ok(next)
}

/// [`move_node`] gated on drag-tag acceptance
///
/// # Errors
/// As for `move_node`, plus `IllegalTarget` with `WorkspaceMismatch` when
/// the target does not accept the node's tag
pub fn drop_node(layout: &Layout, node: NodeId, target: NodeId) -> Result<Layout, LayoutError> {
    check_move(layout, node, target)?;
    let dragged = layout.find_by_id(node)?;
    let destination = layout.find_by_id(target)?;
    if !accepts(destination, dragged) {
        debug!(node = %node, target = %target, tag = %drag_tag(dragged), "drop rejected");
        return Err(LayoutError::illegal(node, target, IllegalReason::WorkspaceMismatch));
    }
    let next = layout.reattach(node, target)?;
    debug!(node = %node, parent = %target, "dropped node");
    Ok(next)
}
