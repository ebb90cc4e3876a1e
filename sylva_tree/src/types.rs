// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: owned node data, arena handles, drop positions, and flags.

use alloc::string::String;
use alloc::vec::Vec;

/// Owned tree data, used to build the forest and returned by snapshots.
///
/// `children` distinguishes "not loaded yet" (`None`) from "loaded, possibly
/// empty" (`Some`). A node with `has_children == true` and `children == None`
/// is a lazy stand-in whose children are fetched on demand.
///
/// Ids must be unique across the whole forest; behavior under duplicate ids is
/// unspecified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeNode<P = ()> {
    /// Unique identifier.
    pub id: String,
    /// Display label; search matches against it.
    pub label: String,
    /// Loaded children, or `None` if absent.
    pub children: Option<Vec<TreeNode<P>>>,
    /// Lazy marker: children exist but have not been fetched.
    pub has_children: bool,
    /// Opaque host payload.
    pub payload: P,
}

impl<P: Default> TreeNode<P> {
    /// Creates a leaf node with a default payload.
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self::with_payload(id, label, P::default())
    }
}

impl<P> TreeNode<P> {
    /// Creates a leaf node carrying `payload`.
    #[must_use]
    pub fn with_payload(id: impl Into<String>, label: impl Into<String>, payload: P) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: None,
            has_children: false,
            payload,
        }
    }

    /// Appends a child, turning this node into a loaded parent.
    #[must_use]
    pub fn child(mut self, node: Self) -> Self {
        self.children.get_or_insert_with(Vec::new).push(node);
        self
    }

    /// Replaces the children.
    #[must_use]
    pub fn with_children(mut self, nodes: Vec<Self>) -> Self {
        self.children = Some(nodes);
        self
    }

    /// Marks this node as a lazy stand-in whose children are fetched on demand.
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.children = None;
        self.has_children = true;
        self
    }

    /// Returns `true` for a lazy stand-in that still needs loading.
    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        self.has_children && self.children.is_none()
    }
}

/// Handle of a node slot in the forest arena (generational).
///
/// Keys are stable across moves. They go stale when the node is removed, for
/// example when [`Forest::set_data`](crate::Forest::set_data) replaces the
/// forest or a subtree is replaced by a lazy load.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeKey(pub(crate) u32, pub(crate) u32);

impl NodeKey {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Where a moved node lands relative to its target.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Position {
    /// Immediately before the target, among the target's siblings.
    Before,
    /// Immediately after the target, among the target's siblings.
    After,
    /// Appended as the target's last child.
    Inside,
}

bitflags::bitflags! {
    /// Per-row presentation flags handed to the renderer.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct RowFlags: u16 {
        /// Shown as expanded (explicitly, or forced open by an active search).
        const EXPANDED     = 1 << 0;
        /// Has children to show, loaded or lazily available.
        const HAS_CHILDREN = 1 << 1;
        /// A lazy load is in flight.
        const LOADING      = 1 << 2;
        /// Member of the selection.
        const SELECTED     = 1 << 3;
        /// Member of the checked set.
        const CHECKED      = 1 << 4;
        /// Holds the focus cursor.
        const FOCUSED      = 1 << 5;
        /// Current drag-over target.
        const DRAG_OVER    = 1 << 6;
        /// Label matches the active search term.
        const SEARCH_MATCH = 1 << 7;
    }
}

bitflags::bitflags! {
    /// What a command changed; returned by every mutating engine operation.
    ///
    /// The engine never repaints. Hosts inspect these to decide whether to
    /// re-read the visible window and which notifications to raise.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Changes: u16 {
        /// The expanded set changed.
        const EXPANSION = 1 << 0;
        /// The forest structure changed (data replaced, load spliced, node moved).
        const STRUCTURE = 1 << 1;
        /// The filter predicate or search term changed.
        const FILTER    = 1 << 2;
        /// The selection changed.
        const SELECTION = 1 << 3;
        /// The checked set changed.
        const CHECKED   = 1 << 4;
        /// The focus cursor moved.
        const FOCUS     = 1 << 5;
        /// Drag or drag-over state changed.
        const DRAG      = 1 << 6;
        /// The loading set changed.
        const LOADING   = 1 << 7;
        /// The scroll offset changed.
        const SCROLL    = 1 << 8;
    }
}

impl Changes {
    /// Returns `true` if the visible row sequence may differ after this change.
    #[must_use]
    pub const fn affects_rows(self) -> bool {
        self.intersects(Self::EXPANSION.union(Self::STRUCTURE).union(Self::FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn builders_shape_children() {
        let node: TreeNode = TreeNode::new("a", "A").child(TreeNode::new("b", "B"));
        assert_eq!(node.children.as_ref().map(Vec::len), Some(1));
        assert!(!node.is_unloaded());

        let lazy: TreeNode = TreeNode::new("c", "C").lazy();
        assert!(lazy.is_unloaded());

        let loaded: TreeNode = TreeNode::new("d", "D").lazy().with_children(vec![]);
        assert!(!loaded.is_unloaded());
    }

    #[test]
    fn changes_report_row_impact() {
        assert!(Changes::EXPANSION.affects_rows());
        assert!((Changes::SELECTION | Changes::FILTER).affects_rows());
        assert!(!(Changes::SELECTION | Changes::CHECKED | Changes::SCROLL).affects_rows());
        assert!(!Changes::empty().affects_rows());
    }
}
