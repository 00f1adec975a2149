//! Error types for the layout model
//!
//! Structural and grid errors are programmer errors against the tree's own
//! invariants: callers are expected to surface them, not swallow them.

use crate::grid::{CellKey, Span};
use crate::node::{NodeId, WidgetUuid};

/// Main layout error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    /// Tree invariant violated
    #[error("structure error: {0}")]
    Structure(#[from] StructureError),

    /// Id lookup miss
    #[error("node not found: {0}")]
    NotFound(NodeId),

    /// Move or drop rejected
    #[error("illegal target {target} for node {node}: {reason}")]
    IllegalTarget {
        /// Node being moved
        node: NodeId,
        /// Rejected destination
        target: NodeId,
        /// Why the destination was rejected
        reason: IllegalReason,
    },

    /// Grid algebra failure
    #[error("grid error: {0}")]
    Grid(#[from] GridError),
}

impl LayoutError {
    /// Create illegal target error
    #[inline]
    #[must_use]
    pub fn illegal(node: NodeId, target: NodeId, reason: IllegalReason) -> Self {
        Self::IllegalTarget {
            node,
            target,
            reason,
        }
    }
}

/// Invariant violations detected by `normalize` and structural edits
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// No node has parent 0
    #[error("layout has no root")]
    MissingRoot,

    /// More than one node has parent 0
    #[error("layout has {count} roots")]
    MultipleRoots {
        /// Number of nodes claiming the root position
        count: usize,
    },

    /// Two nodes share an id
    #[error("duplicate node id {0}")]
    DuplicateId(NodeId),

    /// Two widgets share a uuid
    #[error("node {node} reuses widget uuid {uuid}")]
    DuplicateUuid {
        /// Later of the two nodes
        node: NodeId,
        /// Shared uuid
        uuid: WidgetUuid,
    },

    /// Id 0 is reserved for the root parent
    #[error("node id 0 is reserved")]
    ReservedId,

    /// A parent pointer names no node
    #[error("node {node} points at missing parent {parent}")]
    DanglingParent {
        /// Child node
        node: NodeId,
        /// Missing parent
        parent: NodeId,
    },

    /// Parent pointers form a loop not reachable from the root
    #[error("node {0} is not reachable from the root")]
    Unreachable(NodeId),

    /// A widget was given children
    #[error("widget {0} cannot own children")]
    WidgetParent(NodeId),

    /// Replacement node carries a different id
    #[error("replacement for {expected} carries id {found}")]
    IdMismatch {
        /// Id being replaced
        expected: NodeId,
        /// Id carried by the new node
        found: NodeId,
    },

    /// Root removal or re-parenting of the root
    #[error("root node {0} cannot be removed or re-parented")]
    RootImmutable(NodeId),

    /// Direction set on a widget
    #[error("widget {0} has no direction")]
    DirectionOnWidget(NodeId),

    /// Grid payload failed validation
    #[error("grid node {node} is invalid: {source}")]
    InvalidGrid {
        /// Grid node
        node: NodeId,
        /// Underlying grid error
        source: GridError,
    },
}

/// Reason a move/drop target was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    /// Target is the node itself or one of its descendants
    Cycle,
    /// Target id absent from the layout
    MissingTarget,
    /// Target cannot own children
    NotAContainer,
    /// Drag tag does not match the target's workspace name
    WorkspaceMismatch,
    /// The root cannot move
    RootNode,
}

impl std::fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            IllegalReason::Cycle => "target is the node or one of its descendants",
            IllegalReason::MissingTarget => "target does not exist",
            IllegalReason::NotAContainer => "target cannot own children",
            IllegalReason::WorkspaceMismatch => "workspace name mismatch",
            IllegalReason::RootNode => "root node cannot move",
        };
        f.write_str(text)
    }
}

/// Grid template algebra errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// Cell key not present in the cell map
    #[error("unknown cell {0}")]
    UnknownCell(CellKey),

    /// Span leaves the grid, or a cell key lies outside it
    #[error("cell {key} with span {span} exceeds {rows}x{cols} grid")]
    SpanOutOfBounds {
        /// Anchor cell
        key: CellKey,
        /// Requested span
        span: Span,
        /// Grid rows
        rows: u16,
        /// Grid columns
        cols: u16,
    },

    /// Span covers a cell owned by another span
    #[error("span of cell {key} overlaps the region of cell {other}")]
    SpanOverlap {
        /// Anchor being edited
        key: CellKey,
        /// Anchor whose region would be overlapped
        other: CellKey,
    },

    /// Rows, columns or span components below 1
    #[error("invalid grid dimensions {rows}x{cols}")]
    InvalidDimensions {
        /// Rows
        rows: u16,
        /// Columns
        cols: u16,
    },

    /// Cell key text not of the form `row.col`
    #[error("invalid cell key {0:?}")]
    InvalidCellKey(String),

    /// Grid operation applied to a non-grid node
    #[error("node {0} is not a grid")]
    NotAGrid(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_error_display() {
        let err = LayoutError::NotFound(NodeId(9));
        assert_eq!(err.to_string(), "node not found: #9");

        let err = LayoutError::illegal(NodeId(2), NodeId(3), IllegalReason::Cycle);
        assert!(err.to_string().contains("descendants"));
    }

    #[test]
    fn structure_error_converts() {
        let err: LayoutError = StructureError::MissingRoot.into();
        assert!(matches!(err, LayoutError::Structure(StructureError::MissingRoot)));
    }

    #[test]
    fn grid_error_display() {
        let err = GridError::SpanOutOfBounds {
            key: CellKey::new(1, 2),
            span: Span::new(1, 2),
            rows: 2,
            cols: 2,
        };
        assert_eq!(err.to_string(), "cell 1.2 with span 1x2 exceeds 2x2 grid");
    }
}
