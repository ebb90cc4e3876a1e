// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node store: an arena-backed ordered forest with parent links and an id index.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::types::{NodeKey, TreeNode};

/// The canonical tree: an ordered forest of nodes.
///
/// Nodes live in an arena of generational slots and refer to each other by
/// [`NodeKey`]. Each node keeps an explicit parent link and an ordered child
/// list, so structural edits never rebuild the tree. An internal id index
/// answers [`Forest::key_of`] without a full search; under duplicate ids it
/// resolves to the first node in depth-first order, like a depth-first search
/// would.
///
/// Building from owned [`TreeNode`] values makes a cyclic input impossible;
/// the only operation that could introduce a cycle, moving a node, checks for
/// it (see [`Forest::is_descendant`]).
///
/// ## Example
///
/// ```rust
/// use sylva_tree::{Forest, TreeNode};
///
/// let forest: Forest = Forest::from_nodes(vec![
///     TreeNode::new("a", "A").child(TreeNode::new("b", "B")),
/// ]);
///
/// let b = forest.get("b").unwrap();
/// assert_eq!(b.label(), "B");
/// assert_eq!(b.parent().map(|p| p.id()), Some("a"));
/// assert!(forest.is_descendant("a", "b"));
/// ```
pub struct Forest<P = ()> {
    /// slots
    slots: Vec<Option<Slot<P>>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    roots: Vec<NodeKey>,
    by_id: HashMap<String, NodeKey>,
}

impl<P> core::fmt::Debug for Forest<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Forest")
            .field("nodes_total", &self.slots.len())
            .field("nodes_alive", &self.len())
            .field("free_list", &self.free_list.len())
            .field("roots", &self.roots.len())
            .finish_non_exhaustive()
    }
}

impl<P> Default for Forest<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct Slot<P> {
    generation: u32,
    parent: Option<NodeKey>,
    children: Option<Vec<NodeKey>>,
    id: String,
    label: String,
    has_children: bool,
    payload: P,
}

/// Borrowed view of one live node.
pub struct NodeRef<'a, P = ()> {
    forest: &'a Forest<P>,
    key: NodeKey,
    slot: &'a Slot<P>,
}

impl<P> Clone for NodeRef<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for NodeRef<'_, P> {}

impl<P> core::fmt::Debug for NodeRef<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeRef")
            .field("key", &self.key)
            .field("id", &self.slot.id)
            .field("label", &self.slot.label)
            .finish_non_exhaustive()
    }
}

impl<'a, P> NodeRef<'a, P> {
    /// Arena handle of this node.
    #[must_use]
    pub fn key(&self) -> NodeKey {
        self.key
    }

    /// Unique id.
    #[must_use]
    pub fn id(&self) -> &'a str {
        &self.slot.id
    }

    /// Display label.
    #[must_use]
    pub fn label(&self) -> &'a str {
        &self.slot.label
    }

    /// Host payload.
    #[must_use]
    pub fn payload(&self) -> &'a P {
        &self.slot.payload
    }

    /// The lazy marker as given in the input data.
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.slot.has_children
    }

    /// Returns `true` once children are present (possibly empty).
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.slot.children.is_some()
    }

    /// Returns `true` for a lazy stand-in whose children still need fetching.
    #[must_use]
    pub fn is_unloaded(&self) -> bool {
        self.slot.has_children && self.slot.children.is_none()
    }

    /// Child keys in stored order, or `None` if children are absent.
    #[must_use]
    pub fn child_keys(&self) -> Option<&'a [NodeKey]> {
        self.slot.children.as_deref()
    }

    /// Children in stored order; empty when absent.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'a, P>> + 'a {
        let forest = self.forest;
        self.slot
            .children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(move |&k| forest.node(k))
    }

    /// Parent node, or `None` for roots.
    #[must_use]
    pub fn parent(&self) -> Option<NodeRef<'a, P>> {
        self.slot.parent.and_then(|p| self.forest.node(p))
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.slot.parent;
        while let Some(p) = current {
            depth += 1;
            current = self.forest.slot(p).and_then(|s| s.parent);
        }
        depth
    }
}

impl<P> Forest<P> {
    /// Create an empty forest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            roots: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Build a forest from owned root nodes.
    #[must_use]
    pub fn from_nodes(nodes: Vec<TreeNode<P>>) -> Self {
        let mut forest = Self::new();
        forest.set_data(nodes);
        forest
    }

    /// Replace the whole forest. All previously issued keys go stale.
    pub fn set_data(&mut self, nodes: Vec<TreeNode<P>>) {
        self.slots.clear();
        self.generations.clear();
        self.free_list.clear();
        self.roots.clear();
        self.by_id.clear();
        for node in nodes {
            let key = self.insert_subtree(None, node);
            self.roots.push(key);
        }
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Returns `true` if the forest has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Root keys in stored order.
    #[must_use]
    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    /// Returns true if `key` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, key: NodeKey) -> bool {
        self.slot(key).is_some()
    }

    /// Key of the node with `id`, if present.
    #[must_use]
    pub fn key_of(&self, id: &str) -> Option<NodeKey> {
        self.by_id.get(id).copied()
    }

    /// Look up a node by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<NodeRef<'_, P>> {
        self.key_of(id).and_then(|k| self.node(k))
    }

    /// View of a live node, or `None` for stale keys.
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<NodeRef<'_, P>> {
        self.slot(key).map(|slot| NodeRef {
            forest: self,
            key,
            slot,
        })
    }

    /// Mutable access to a node's payload.
    pub fn payload_mut(&mut self, key: NodeKey) -> Option<&mut P> {
        self.slot_mut(key).map(|s| &mut s.payload)
    }

    /// Returns `true` iff `candidate_id` equals `ancestor_id` or lies in its subtree.
    ///
    /// Walks parent links upward from the candidate. Returns `false` when
    /// either id is absent.
    #[must_use]
    pub fn is_descendant(&self, ancestor_id: &str, candidate_id: &str) -> bool {
        match (self.key_of(ancestor_id), self.key_of(candidate_id)) {
            (Some(ancestor), Some(candidate)) => self.is_descendant_key(ancestor, candidate),
            _ => false,
        }
    }

    pub(crate) fn is_descendant_key(&self, ancestor: NodeKey, candidate: NodeKey) -> bool {
        let mut current = Some(candidate);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.slot(k).and_then(|s| s.parent);
        }
        false
    }

    /// Keys of every loaded descendant of `key` in depth-first pre-order,
    /// excluding `key` itself.
    #[must_use]
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = Vec::new();
        if let Some(children) = self.slot(key).and_then(|s| s.children.as_ref()) {
            stack.extend(children.iter().rev());
        }
        while let Some(k) = stack.pop() {
            let Some(slot) = self.slot(k) else {
                continue;
            };
            out.push(k);
            if let Some(children) = &slot.children {
                stack.extend(children.iter().rev());
            }
        }
        out
    }

    /// Every live key in depth-first pre-order over the whole forest.
    #[must_use]
    pub fn keys_depth_first(&self) -> Vec<NodeKey> {
        let mut out = Vec::with_capacity(self.len());
        for &root in &self.roots {
            out.push(root);
            out.extend(self.descendants(root));
        }
        out
    }

    /// Replace the children of `key` with freshly loaded nodes.
    ///
    /// Any previous children (and their subtrees) are removed. An empty
    /// `children` still marks the node loaded. Returns the keys of the new
    /// direct children, or `None` if `key` is stale.
    pub fn replace_children(
        &mut self,
        key: NodeKey,
        children: Vec<TreeNode<P>>,
    ) -> Option<Vec<NodeKey>> {
        let old = self.slot_mut(key)?.children.replace(Vec::new());
        for child in old.into_iter().flatten() {
            self.free_subtree(child);
        }
        let mut inserted = Vec::with_capacity(children.len());
        for node in children {
            inserted.push(self.insert_subtree(Some(key), node));
        }
        Some(inserted)
    }

    /// Unlink `key` from its parent (or from the roots).
    ///
    /// The subtree stays alive and keeps its keys; re-attach it with
    /// [`Forest::attach`]. Returns the parent and the index it occupied, or
    /// `None` for stale keys.
    pub fn detach(&mut self, key: NodeKey) -> Option<(Option<NodeKey>, usize)> {
        let parent = self.slot(key)?.parent;
        let siblings = match parent {
            Some(p) => self.slot_mut(p)?.children.as_mut()?,
            None => &mut self.roots,
        };
        let index = siblings.iter().position(|&k| k == key)?;
        siblings.remove(index);
        if let Some(slot) = self.slot_mut(key) {
            slot.parent = None;
        }
        Some((parent, index))
    }

    /// Link a detached node under `parent` (or among the roots) at `index`.
    ///
    /// `index` is clamped to the sibling count. A parent without children gets
    /// an empty child list first. Returns `false` for stale keys.
    ///
    /// The caller must ensure `key` is currently detached and that `parent`
    /// is not inside the subtree of `key`.
    pub fn attach(&mut self, key: NodeKey, parent: Option<NodeKey>, index: usize) -> bool {
        if !self.is_alive(key) {
            return false;
        }
        let siblings = match parent {
            Some(p) => match self.slot_mut(p) {
                Some(slot) => slot.children.get_or_insert_with(Vec::new),
                None => return false,
            },
            None => &mut self.roots,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, key);
        if let Some(slot) = self.slot_mut(key) {
            slot.parent = parent;
        }
        true
    }

    /// Parent and index of `key` among its siblings.
    #[must_use]
    pub fn position_of(&self, key: NodeKey) -> Option<(Option<NodeKey>, usize)> {
        let parent = self.slot(key)?.parent;
        let siblings = match parent {
            Some(p) => self.slot(p)?.children.as_ref()?,
            None => &self.roots,
        };
        let index = siblings.iter().position(|&k| k == key)?;
        Some((parent, index))
    }

    /// Rebuild owned [`TreeNode`] values for the current forest.
    ///
    /// Built in post-order with an explicit stack, so depth is bounded only
    /// by memory.
    #[must_use]
    pub fn to_nodes(&self) -> Vec<TreeNode<P>>
    where
        P: Clone,
    {
        // The bottom frame (`key: None`) collects the roots.
        let mut stack = Vec::new();
        stack.push(SnapshotFrame {
            key: None,
            next: 0,
            built: Vec::new(),
        });
        while let Some(top) = stack.last_mut() {
            let children = match top.key {
                None => &self.roots[..],
                Some(k) => self
                    .slot(k)
                    .and_then(|s| s.children.as_deref())
                    .unwrap_or(&[]),
            };
            if let Some(&child) = children.get(top.next) {
                top.next += 1;
                stack.push(SnapshotFrame {
                    key: Some(child),
                    next: 0,
                    built: Vec::new(),
                });
                continue;
            }
            let Some(frame) = stack.pop() else {
                break;
            };
            let Some(key) = frame.key else {
                return frame.built;
            };
            if let (Some(slot), Some(parent)) = (self.slot(key), stack.last_mut()) {
                parent.built.push(TreeNode {
                    id: slot.id.clone(),
                    label: slot.label.clone(),
                    children: slot.children.as_ref().map(|_| frame.built),
                    has_children: slot.has_children,
                    payload: slot.payload.clone(),
                });
            }
        }
        Vec::new()
    }

    // --- internals ---

    fn slot(&self, key: NodeKey) -> Option<&Slot<P>> {
        let s = self.slots.get(key.idx())?.as_ref()?;
        (s.generation == key.1).then_some(s)
    }

    fn slot_mut(&mut self, key: NodeKey) -> Option<&mut Slot<P>> {
        let s = self.slots.get_mut(key.idx())?.as_mut()?;
        (s.generation == key.1).then_some(s)
    }

    fn alloc(&mut self, slot: impl FnOnce(u32) -> Slot<P>) -> NodeKey {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].wrapping_add(1);
            self.generations[idx] = generation;
            self.slots[idx] = Some(slot(generation));
            (idx, generation)
        } else {
            let generation = 1_u32;
            self.slots.push(Some(slot(generation)));
            self.generations.push(generation);
            (self.slots.len() - 1, generation)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "NodeKey uses 32-bit indices by design."
        )]
        let idx = idx as u32;
        NodeKey::new(idx, generation)
    }

    /// Insert an owned subtree under `parent`, returning the key of its root.
    ///
    /// The subtree root is linked into `parent`'s child list; roots are linked
    /// by the caller. Descendants are allocated in depth-first pre-order so the
    /// id index keeps the first occurrence of a duplicated id.
    fn insert_subtree(&mut self, parent: Option<NodeKey>, node: TreeNode<P>) -> NodeKey {
        let (top, children) = self.insert_one(parent, node);
        // Reversed so children pop, and therefore link, in stored order.
        let mut stack: Vec<(NodeKey, TreeNode<P>)> =
            children.into_iter().rev().map(|c| (top, c)).collect();
        while let Some((parent, node)) = stack.pop() {
            let (key, children) = self.insert_one(Some(parent), node);
            stack.extend(children.into_iter().rev().map(|c| (key, c)));
        }
        top
    }

    fn insert_one(
        &mut self,
        parent: Option<NodeKey>,
        node: TreeNode<P>,
    ) -> (NodeKey, Vec<TreeNode<P>>) {
        let TreeNode {
            id,
            label,
            children,
            has_children,
            payload,
        } = node;
        let loaded = children.is_some();
        let key = self.alloc(|generation| Slot {
            generation,
            parent,
            children: loaded.then(Vec::new),
            id: id.clone(),
            label,
            has_children,
            payload,
        });
        self.by_id.entry(id).or_insert(key);
        if let Some(p) = parent
            && let Some(siblings) = self.slot_mut(p).and_then(|s| s.children.as_mut())
        {
            siblings.push(key);
        }
        (key, children.unwrap_or_default())
    }

    /// Free `key` and its whole subtree. The caller unlinks it from its parent.
    fn free_subtree(&mut self, key: NodeKey) {
        let mut stack = alloc::vec![key];
        while let Some(k) = stack.pop() {
            let Some(slot) = self.slots.get_mut(k.idx()).and_then(Option::take) else {
                continue;
            };
            if self.by_id.get(&slot.id) == Some(&k) {
                self.by_id.remove(&slot.id);
            }
            self.free_list.push(k.idx());
            stack.extend(slot.children.into_iter().flatten());
        }
    }
}

/// A node whose children are still being snapshotted.
struct SnapshotFrame<P> {
    key: Option<NodeKey>,
    next: usize,
    built: Vec<TreeNode<P>>,
}
