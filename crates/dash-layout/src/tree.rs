//! Flattened layout tree
//!
//! [`Layout`] owns the node arena of one workspace plus a derived
//! `parent -> ordered children` index. Every operation is functional: it
//! returns a new `Layout` and leaves `self` untouched, so a failed edit can
//! never leave a half-applied tree behind.
//!
//! Each new `Layout` is produced by [`Layout::normalize`], which enforces:
//! - exactly one root (parent 0)
//! - unique, non-zero ids
//! - unique widget uuids
//! - every parent exists, can own children, and reaches the root
//! - every grid payload is valid
//!
//! Sibling `order` ties resolve by arena position, after which every sibling
//! group is renumbered `0..n` and `has_children` is recomputed.

use crate::error::{LayoutError, StructureError};
use crate::grid::validate_grid;
use crate::node::{Direction, LayoutNode, NodeId};
use im::Vector;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Derived lookup tables, rebuilt on every structural change
#[derive(Debug, Default)]
struct TreeIndex {
    root: usize,
    positions: HashMap<NodeId, usize>,
    children: HashMap<NodeId, Vec<NodeId>>,
}

/// A normalized workspace tree
///
/// Serializes as the plain node sequence; deserializing normalizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "Vec<LayoutNode>", try_from = "Vec<LayoutNode>")]
pub struct Layout {
    nodes: Vector<LayoutNode>,
    index: Arc<TreeIndex>,
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
    }
}

impl Layout {
    /// Layout made of a single root node
    ///
    /// # Errors
    /// `StructureError` if `root` does not have parent 0 or carries id 0
    pub fn with_root(root: LayoutNode) -> Result<Self, LayoutError> {
        Self::normalize(vec![root])
    }

    /// Validate a node sequence and build its index
    ///
    /// # Errors
    /// `StructureError` for any violated tree invariant
    pub fn normalize<I>(nodes: I) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = LayoutNode>,
    {
        let mut nodes: Vector<LayoutNode> = nodes.into_iter().collect();

        let mut positions = HashMap::with_capacity(nodes.len());
        let mut uuids = HashSet::new();
        for (pos, node) in nodes.iter().enumerate() {
            if node.id.is_root_parent() {
                return Err(StructureError::ReservedId.into());
            }
            if positions.insert(node.id, pos).is_some() {
                return Err(StructureError::DuplicateId(node.id).into());
            }
            if let Some(uuid) = node.widget_uuid() {
                if !uuids.insert(uuid) {
                    return Err(StructureError::DuplicateUuid {
                        node: node.id,
                        uuid: uuid.clone(),
                    }
                    .into());
                }
            }
        }

        let roots: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_root())
            .map(|(pos, _)| pos)
            .collect();
        let root = match roots.as_slice() {
            [] => return Err(StructureError::MissingRoot.into()),
            [single] => *single,
            _ => {
                return Err(StructureError::MultipleRoots { count: roots.len() }.into());
            }
        };

        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for node in nodes.iter().filter(|node| !node.is_root()) {
            let parent_pos = positions
                .get(&node.parent)
                .copied()
                .ok_or(StructureError::DanglingParent {
                    node: node.id,
                    parent: node.parent,
                })?;
            if !nodes[parent_pos].can_have_children() {
                return Err(StructureError::WidgetParent(node.parent).into());
            }
            children.entry(node.parent).or_default().push(node.id);
        }

        for siblings in children.values_mut() {
            siblings.sort_by_key(|id| {
                let pos = positions[id];
                (nodes[pos].order, pos)
            });
        }

        let root_id = nodes[root].id;
        let mut reached = HashSet::with_capacity(nodes.len());
        let mut queue = VecDeque::from([root_id]);
        while let Some(id) = queue.pop_front() {
            if reached.insert(id) {
                if let Some(kids) = children.get(&id) {
                    queue.extend(kids.iter().copied());
                }
            }
        }
        if let Some(orphan) = nodes.iter().find(|node| !reached.contains(&node.id)) {
            return Err(StructureError::Unreachable(orphan.id).into());
        }

        for node in nodes.iter() {
            if let Some(grid) = node.grid_spec() {
                validate_grid(grid).map_err(|source| StructureError::InvalidGrid {
                    node: node.id,
                    source,
                })?;
            }
        }

        for (pos, node) in nodes.iter_mut().enumerate() {
            node.has_children = children.get(&node.id).map_or(0, Vec::len);
            if pos == root {
                node.order = 0;
            }
        }
        for siblings in children.values() {
            for (rank, id) in siblings.iter().enumerate() {
                let pos = positions[id];
                nodes[pos].order = u32::try_from(rank).unwrap_or(u32::MAX);
            }
        }

        Ok(Self {
            nodes,
            index: Arc::new(TreeIndex {
                root,
                positions,
                children,
            }),
        })
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a normalized layout has a root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in arena order
    pub fn iter(&self) -> impl Iterator<Item = &LayoutNode> + '_ {
        self.nodes.iter()
    }

    /// Copy out the node sequence
    #[must_use]
    pub fn to_vec(&self) -> Vec<LayoutNode> {
        self.nodes.iter().cloned().collect()
    }

    /// Whether `id` names a node
    #[inline]
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.positions.contains_key(&id)
    }

    /// Lookup node by id
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&LayoutNode> {
        self.index.positions.get(&id).map(|pos| &self.nodes[*pos])
    }

    /// Lookup node by id
    ///
    /// # Errors
    /// `NotFound` if `id` is absent
    pub fn find_by_id(&self, id: NodeId) -> Result<&LayoutNode, LayoutError> {
        self.get(id).ok_or(LayoutError::NotFound(id))
    }

    /// The node with parent 0
    #[must_use]
    pub fn root(&self) -> &LayoutNode {
        &self.nodes[self.index.root]
    }

    /// Ids of the children of `id`, by ascending order
    ///
    /// Empty for unknown ids and leaf nodes.
    #[must_use]
    pub fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.index
            .children
            .get(&id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Children of `id`, by ascending order
    ///
    /// # Errors
    /// `NotFound` if `id` is absent
    pub fn children_of(&self, id: NodeId) -> Result<Vec<&LayoutNode>, LayoutError> {
        self.find_by_id(id)?;
        Ok(self
            .child_ids(id)
            .iter()
            .filter_map(|child| self.get(*child))
            .collect())
    }

    /// Number of children of `id`
    ///
    /// # Errors
    /// `NotFound` if `id` is absent
    pub fn count_children(&self, id: NodeId) -> Result<usize, LayoutError> {
        self.find_by_id(id)?;
        Ok(self.child_ids(id).len())
    }

    /// All descendants of `id` in depth-first order, excluding `id`
    ///
    /// # Errors
    /// `NotFound` if `id` is absent
    pub fn descendants_of(&self, id: NodeId) -> Result<Vec<NodeId>, LayoutError> {
        self.find_by_id(id)?;
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.child_ids(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.child_ids(next).iter().rev().copied());
        }
        Ok(out)
    }

    /// Whether `node` sits strictly below `ancestor`
    #[must_use]
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.get(node);
        while let Some(n) = current {
            if n.is_root() {
                return false;
            }
            if n.parent == ancestor {
                return true;
            }
            current = self.get(n.parent);
        }
        false
    }

    /// Pre-order walk from the root, paired with depth
    #[must_use]
    pub fn depth_first(&self) -> Vec<(usize, &LayoutNode)> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = vec![(0usize, self.root().id)];
        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.get(id) {
                out.push((depth, node));
                stack.extend(self.child_ids(id).iter().rev().map(|c| (depth + 1, *c)));
            }
        }
        out
    }

    /// Smallest id not yet in use above every existing id
    #[must_use]
    pub fn next_id(&self) -> NodeId {
        let max = self.nodes.iter().map(|n| n.id.get()).max().unwrap_or(0);
        NodeId(max.saturating_add(1))
    }

    /// Replace the node at `id`
    ///
    /// `has_children` and `order` are re-derived by normalization.
    ///
    /// # Errors
    /// `NotFound`, `IdMismatch` if `node.id != id`, or any `StructureError`
    /// the replacement introduces
    pub fn replace(&self, id: NodeId, node: LayoutNode) -> Result<Self, LayoutError> {
        let pos = *self
            .index
            .positions
            .get(&id)
            .ok_or(LayoutError::NotFound(id))?;
        if node.id != id {
            return Err(StructureError::IdMismatch {
                expected: id,
                found: node.id,
            }
            .into());
        }
        let mut nodes = self.nodes.clone();
        nodes.set(pos, node);
        let next = Self::normalize(nodes)?;
        debug!(node = %id, "replaced node");
        Ok(next)
    }

    /// Edit one node through a closure, then [`replace`](Self::replace) it
    ///
    /// # Errors
    /// As for `replace`
    pub fn update<F>(&self, id: NodeId, edit: F) -> Result<Self, LayoutError>
    where
        F: FnOnce(&mut LayoutNode),
    {
        let mut node = self.find_by_id(id)?.clone();
        edit(&mut node);
        self.replace(id, node)
    }

    /// Append `node` as the last child of `parent`
    ///
    /// The node receives a fresh id, returned alongside the new layout.
    ///
    /// # Errors
    /// `NotFound` for a missing parent, `WidgetParent` if it cannot own children,
    /// `DuplicateUuid` if the widget's uuid is already placed
    pub fn insert_child(&self, parent: NodeId, mut node: LayoutNode) -> Result<(Self, NodeId), LayoutError> {
        let owner = self.find_by_id(parent)?;
        if !owner.can_have_children() {
            return Err(StructureError::WidgetParent(parent).into());
        }
        let id = self.next_id();
        node.id = id;
        node.parent = parent;
        node.order = u32::try_from(self.child_ids(parent).len()).unwrap_or(u32::MAX);

        let mut nodes = self.nodes.clone();
        nodes.push_back(node);
        let next = Self::normalize(nodes)?;
        debug!(node = %id, parent = %parent, "inserted node");
        Ok((next, id))
    }

    /// Remove `id` and every node below it
    ///
    /// # Errors
    /// `NotFound`, or `RootImmutable` for the root
    pub fn remove_subtree(&self, id: NodeId) -> Result<Self, LayoutError> {
        let node = self.find_by_id(id)?;
        if node.is_root() {
            return Err(StructureError::RootImmutable(id).into());
        }
        let mut doomed: HashSet<NodeId> = self.descendants_of(id)?.into_iter().collect();
        doomed.insert(id);

        let remaining: Vec<LayoutNode> = self
            .nodes
            .iter()
            .filter(|n| !doomed.contains(&n.id))
            .cloned()
            .collect();
        let next = Self::normalize(remaining)?;
        debug!(node = %id, removed = doomed.len(), "removed subtree");
        Ok(next)
    }

    /// Re-parent `id` as the last child of `new_parent`
    ///
    /// No legality checks beyond normalization; see [`crate::drag`].
    pub(crate) fn reattach(&self, id: NodeId, new_parent: NodeId) -> Result<Self, LayoutError> {
        let pos = *self
            .index
            .positions
            .get(&id)
            .ok_or(LayoutError::NotFound(id))?;
        let last = u32::try_from(self.child_ids(new_parent).len()).unwrap_or(u32::MAX);

        let mut nodes = self.nodes.clone();
        let mut node = nodes[pos].clone();
        node.parent = new_parent;
        node.order = last;
        nodes.set(pos, node);
        Self::normalize(nodes)
    }

    /// Move `id` to `position` among its siblings, clamped to the last slot
    ///
    /// Siblings are renumbered `0..n`. Applying the same call twice yields the
    /// same layout.
    ///
    /// # Errors
    /// `NotFound` if `id` is absent
    pub fn change_order(&self, id: NodeId, position: usize) -> Result<Self, LayoutError> {
        let node = self.find_by_id(id)?;
        if node.is_root() {
            return Ok(self.clone());
        }
        let mut siblings: Vec<NodeId> = self
            .child_ids(node.parent)
            .iter()
            .copied()
            .filter(|s| *s != id)
            .collect();
        let slot = position.min(siblings.len());
        siblings.insert(slot, id);

        let mut nodes = self.nodes.clone();
        for (rank, sibling) in siblings.iter().enumerate() {
            let pos = self.index.positions[sibling];
            let mut entry = nodes[pos].clone();
            entry.order = u32::try_from(rank).unwrap_or(u32::MAX);
            nodes.set(pos, entry);
        }
        let next = Self::normalize(nodes)?;
        debug!(node = %id, order = slot, "changed order");
        Ok(next)
    }

    /// Set the direction of a container or grid
    ///
    /// # Errors
    /// `NotFound`, or `DirectionOnWidget` for widgets
    pub fn change_direction(&self, id: NodeId, direction: Direction) -> Result<Self, LayoutError> {
        let mut node = self.find_by_id(id)?.clone();
        if !node.set_direction(direction) {
            return Err(StructureError::DirectionOnWidget(id).into());
        }
        self.replace(id, node)
    }

    /// Set the workspace-level `scrollable` hint on the root
    ///
    /// # Errors
    /// Only if the root fails to re-normalize, which a valid layout cannot
    pub fn set_root_scrollable(&self, scrollable: bool) -> Result<Self, LayoutError> {
        self.update(self.root().id, |root| root.scrollable = scrollable)
    }
}

impl TryFrom<Vec<LayoutNode>> for Layout {
    type Error = LayoutError;

    fn try_from(nodes: Vec<LayoutNode>) -> Result<Self, Self::Error> {
        Self::normalize(nodes)
    }
}

impl From<Layout> for Vec<LayoutNode> {
    fn from(layout: Layout) -> Self {
        layout.nodes.into_iter().collect()
    }
}

/// Free-function form of [`Layout::normalize`]
///
/// # Errors
/// Any `StructureError`
pub fn normalize(nodes: Vec<LayoutNode>) -> Result<Layout, LayoutError> {
    Layout::normalize(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{CellKey, GridSpec};
    use crate::node::WidgetUuid;
    use pretty_assertions::assert_eq;

    fn sample() -> Layout {
        Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::container(NodeId(2), NodeId(1), "layout").with_order(0),
            LayoutNode::container(NodeId(3), NodeId(1), "widgets").with_order(1),
            LayoutNode::widget(NodeId(4), NodeId(2), "Clock", WidgetUuid::from("u4")),
            LayoutNode::widget(NodeId(5), NodeId(2), "Notes", WidgetUuid::from("u5")).with_order(1),
        ])
        .unwrap()
    }

    #[test]
    fn normalize_rejects_missing_and_multiple_roots() {
        let err = Layout::normalize(vec![LayoutNode::container(NodeId(1), NodeId(2), "layout")])
            .unwrap_err();
        assert_eq!(err, LayoutError::Structure(StructureError::MissingRoot));

        let err = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::container(NodeId(2), NodeId::ROOT_PARENT, "layout"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Structure(StructureError::MultipleRoots { count: 2 })
        );
    }

    #[test]
    fn normalize_rejects_duplicate_and_dangling() {
        let err = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::container(NodeId(1), NodeId(1), "layout"),
        ])
        .unwrap_err();
        assert_eq!(err, LayoutError::Structure(StructureError::DuplicateId(NodeId(1))));

        let err = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::container(NodeId(2), NodeId(9), "layout"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Structure(StructureError::DanglingParent {
                node: NodeId(2),
                parent: NodeId(9),
            })
        );
    }

    #[test]
    fn normalize_rejects_detached_cycle() {
        let err = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::container(NodeId(2), NodeId(3), "layout"),
            LayoutNode::container(NodeId(3), NodeId(2), "layout"),
        ])
        .unwrap_err();
        assert_eq!(err, LayoutError::Structure(StructureError::Unreachable(NodeId(2))));
    }

    #[test]
    fn normalize_rejects_widget_parent() {
        let err = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::widget(NodeId(2), NodeId(1), "Clock", WidgetUuid::from("a")),
            LayoutNode::widget(NodeId(3), NodeId(2), "Clock", WidgetUuid::from("b")),
        ])
        .unwrap_err();
        assert_eq!(err, LayoutError::Structure(StructureError::WidgetParent(NodeId(2))));
    }

    #[test]
    fn widget_uuids_are_unique() {
        let err = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::widget(NodeId(2), NodeId(1), "Search", WidgetUuid::from("dup")),
            LayoutNode::widget(NodeId(3), NodeId(1), "Search", WidgetUuid::from("dup")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::Structure(StructureError::DuplicateUuid {
                node: NodeId(3),
                uuid: WidgetUuid::from("dup"),
            })
        );

        let layout = sample();
        let copy = LayoutNode::widget(NodeId(0), NodeId(0), "Clock", WidgetUuid::from("u4"));
        assert!(matches!(
            layout.insert_child(NodeId(3), copy),
            Err(LayoutError::Structure(StructureError::DuplicateUuid { .. }))
        ));
        let clash = LayoutNode::widget(NodeId(5), NodeId(2), "Notes", WidgetUuid::from("u4"));
        assert!(matches!(
            layout.replace(NodeId(5), clash),
            Err(LayoutError::Structure(StructureError::DuplicateUuid { .. }))
        ));
        // a widget may keep its own uuid when replaced
        let same = LayoutNode::widget(NodeId(4), NodeId(2), "Weather", WidgetUuid::from("u4"));
        assert!(layout.replace(NodeId(4), same).is_ok());
    }

    #[test]
    fn normalize_validates_grids() {
        let mut grid = GridSpec::filled(1, 1).unwrap();
        grid.cells.insert(CellKey::new(2, 1), Default::default());
        let err = Layout::normalize(vec![LayoutNode::grid(NodeId(1), NodeId::ROOT_PARENT, grid)])
            .unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Structure(StructureError::InvalidGrid { node: NodeId(1), .. })
        ));
    }

    #[test]
    fn order_ties_are_stable_by_insertion() {
        let layout = Layout::normalize(vec![
            LayoutNode::container(NodeId(1), NodeId::ROOT_PARENT, "layout"),
            LayoutNode::container(NodeId(7), NodeId(1), "layout").with_order(3),
            LayoutNode::container(NodeId(5), NodeId(1), "layout").with_order(3),
            LayoutNode::container(NodeId(6), NodeId(1), "layout").with_order(1),
        ])
        .unwrap();
        assert_eq!(layout.child_ids(NodeId(1)), &[NodeId(6), NodeId(7), NodeId(5)]);
        let orders: Vec<u32> = layout
            .children_of(NodeId(1))
            .unwrap()
            .iter()
            .map(|n| n.order)
            .collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn has_children_is_derived() {
        let layout = sample();
        assert_eq!(layout.find_by_id(NodeId(1)).unwrap().has_children, 2);
        assert_eq!(layout.find_by_id(NodeId(2)).unwrap().has_children, 2);
        assert_eq!(layout.find_by_id(NodeId(3)).unwrap().has_children, 0);
        assert_eq!(layout.count_children(NodeId(2)).unwrap(), 2);
    }

    #[test]
    fn find_missing_is_not_found() {
        assert_eq!(
            sample().find_by_id(NodeId(42)).unwrap_err(),
            LayoutError::NotFound(NodeId(42))
        );
        assert!(sample().children_of(NodeId(42)).is_err());
    }

    #[test]
    fn replace_then_find_round_trips() {
        let layout = sample();
        let edited = layout
            .find_by_id(NodeId(4))
            .unwrap()
            .clone()
            .with_component("WorldClock");
        let next = layout.replace(NodeId(4), edited.clone()).unwrap();
        assert_eq!(next.find_by_id(NodeId(4)).unwrap(), &edited);
        assert_eq!(layout.find_by_id(NodeId(4)).unwrap().component.as_deref(), Some("Clock"));
    }

    #[test]
    fn replace_rejects_id_change() {
        let layout = sample();
        let node = layout.find_by_id(NodeId(4)).unwrap().clone();
        let err = layout.replace(NodeId(5), node).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Structure(StructureError::IdMismatch { .. })
        ));
    }

    #[test]
    fn descendants_and_traversal() {
        let layout = sample();
        assert_eq!(
            layout.descendants_of(NodeId(1)).unwrap(),
            vec![NodeId(2), NodeId(4), NodeId(5), NodeId(3)]
        );
        assert!(layout.is_descendant(NodeId(1), NodeId(5)));
        assert!(!layout.is_descendant(NodeId(3), NodeId(5)));
        assert!(!layout.is_descendant(NodeId(5), NodeId(5)));

        let walk: Vec<(usize, NodeId)> = layout
            .depth_first()
            .into_iter()
            .map(|(depth, node)| (depth, node.id))
            .collect();
        assert_eq!(
            walk,
            vec![
                (0, NodeId(1)),
                (1, NodeId(2)),
                (2, NodeId(4)),
                (2, NodeId(5)),
                (1, NodeId(3)),
            ]
        );
    }

    #[test]
    fn insert_child_appends_last() {
        let layout = sample();
        let (next, id) = layout
            .insert_child(
                NodeId(2),
                LayoutNode::widget(NodeId(0), NodeId(0), "Weather", WidgetUuid::from("w")),
            )
            .unwrap();
        assert_eq!(id, NodeId(6));
        assert_eq!(next.child_ids(NodeId(2)), &[NodeId(4), NodeId(5), NodeId(6)]);
        assert_eq!(next.find_by_id(id).unwrap().order, 2);

        let err = layout
            .insert_child(NodeId(4), LayoutNode::container(NodeId(0), NodeId(0), "layout"))
            .unwrap_err();
        assert_eq!(err, LayoutError::Structure(StructureError::WidgetParent(NodeId(4))));
    }

    #[test]
    fn remove_subtree_renumbers_siblings() {
        let layout = sample();
        let next = layout.remove_subtree(NodeId(2)).unwrap();
        assert_eq!(next.len(), 2);
        assert_eq!(next.find_by_id(NodeId(3)).unwrap().order, 0);
        assert!(!next.contains(NodeId(4)));

        let err = layout.remove_subtree(NodeId(1)).unwrap_err();
        assert_eq!(err, LayoutError::Structure(StructureError::RootImmutable(NodeId(1))));
    }

    #[test]
    fn change_order_is_idempotent() {
        let layout = sample();
        let once = layout.change_order(NodeId(5), 0).unwrap();
        let twice = once.change_order(NodeId(5), 0).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.child_ids(NodeId(2)), &[NodeId(5), NodeId(4)]);

        let clamped = layout.change_order(NodeId(2), 99).unwrap();
        assert_eq!(clamped.child_ids(NodeId(1)), &[NodeId(3), NodeId(2)]);
    }

    #[test]
    fn change_direction_rejects_widget() {
        let layout = sample();
        let next = layout.change_direction(NodeId(2), Direction::Col).unwrap();
        assert_eq!(
            next.find_by_id(NodeId(2)).unwrap().kind.direction(),
            Some(Direction::Col)
        );
        assert_eq!(next, next.change_direction(NodeId(2), Direction::Col).unwrap());

        let err = layout.change_direction(NodeId(4), Direction::Col).unwrap_err();
        assert_eq!(
            err,
            LayoutError::Structure(StructureError::DirectionOnWidget(NodeId(4)))
        );
    }

    #[test]
    fn serde_runs_normalize() {
        let layout = sample();
        let text = serde_json::to_string(&layout).unwrap();
        let back: Layout = serde_json::from_str(&text).unwrap();
        assert_eq!(back, layout);

        let broken = r#"[{"id":1,"parent":0,"kind":"container","workspace":"layout"},
                         {"id":2,"parent":0,"kind":"container","workspace":"layout"}]"#;
        assert!(serde_json::from_str::<Layout>(broken).is_err());
    }

    #[test]
    fn root_scrollable() {
        let next = sample().set_root_scrollable(true).unwrap();
        assert!(next.root().scrollable);
    }
}
