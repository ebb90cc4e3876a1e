// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Check and selection changes that propagate over loaded subtrees.

use crate::state::{StateKind, StateSets};
use crate::store::Forest;
use crate::types::NodeKey;

/// Sets `id` in the `kind` set and, with `cascade`, every loaded descendant.
///
/// The walk ignores expansion and filtering. Subtrees that are not loaded yet
/// are skipped; [`reconcile_loaded`] completes them when they arrive. An id
/// absent from the forest is still recorded, without cascading.
///
/// Returns `true` if any membership changed.
pub(crate) fn apply_cascade<P>(
    forest: &Forest<P>,
    state: &mut StateSets,
    kind: StateKind,
    id: &str,
    value: bool,
    cascade: bool,
) -> bool {
    let mut changed = state.assign(kind, id, value);
    if cascade && let Some(key) = forest.key_of(id) {
        changed |= assign_descendants(forest, state, kind, key, value);
    }
    changed
}

/// Brings freshly loaded children of `key` in line with their parent.
///
/// If the parent is a member of the `kind` set, every loaded descendant
/// becomes one too. Returns `true` if any membership changed.
pub(crate) fn reconcile_loaded<P>(
    forest: &Forest<P>,
    state: &mut StateSets,
    kind: StateKind,
    key: NodeKey,
) -> bool {
    let Some(node) = forest.node(key) else {
        return false;
    };
    if !state.contains(kind, node.id()) {
        return false;
    }
    assign_descendants(forest, state, kind, key, true)
}

fn assign_descendants<P>(
    forest: &Forest<P>,
    state: &mut StateSets,
    kind: StateKind,
    key: NodeKey,
    value: bool,
) -> bool {
    let mut changed = false;
    for descendant in forest.descendants(key) {
        if let Some(node) = forest.node(descendant) {
            changed |= state.assign(kind, node.id(), value);
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TreeNode;
    use alloc::vec;

    fn forest() -> Forest {
        Forest::from_nodes(vec![
            TreeNode::new("p", "Parent")
                .child(TreeNode::new("c1", "Child").child(TreeNode::new("g", "Grandchild")))
                .child(TreeNode::new("lazy", "Lazy").lazy()),
            TreeNode::new("q", "Other"),
        ])
    }

    #[test]
    fn cascade_walks_the_loaded_subtree() {
        let f = forest();
        let mut state = StateSets::new();
        assert!(apply_cascade(&f, &mut state, StateKind::Checked, "p", true, true));
        for id in ["p", "c1", "g", "lazy"] {
            assert!(state.contains(StateKind::Checked, id), "{id}");
        }
        assert!(!state.contains(StateKind::Checked, "q"));

        assert!(apply_cascade(&f, &mut state, StateKind::Checked, "c1", false, true));
        assert!(!state.contains(StateKind::Checked, "g"));
        assert!(state.contains(StateKind::Checked, "p"));
    }

    #[test]
    fn without_cascade_only_the_node_changes() {
        let f = forest();
        let mut state = StateSets::new();
        apply_cascade(&f, &mut state, StateKind::Selected, "p", true, false);
        assert_eq!(state.selected().len(), 1);
    }

    #[test]
    fn missing_ids_are_recorded_without_cascading() {
        let f = forest();
        let mut state = StateSets::new();
        assert!(apply_cascade(&f, &mut state, StateKind::Checked, "ghost", true, true));
        assert_eq!(state.checked().len(), 1);
    }

    #[test]
    fn reconcile_extends_membership_to_new_children() {
        let mut f = forest();
        let mut state = StateSets::new();
        apply_cascade(&f, &mut state, StateKind::Checked, "p", true, true);

        let lazy = f.key_of("lazy").unwrap();
        f.replace_children(
            lazy,
            vec![TreeNode::new("l1", "L1").child(TreeNode::new("l2", "L2"))],
        );
        assert!(reconcile_loaded(&f, &mut state, StateKind::Checked, lazy));
        assert!(state.contains(StateKind::Checked, "l1"));
        assert!(state.contains(StateKind::Checked, "l2"));

        // Unchecked parents do not pull children in.
        let q = f.key_of("q").unwrap();
        f.replace_children(q, vec![TreeNode::new("q1", "Q1")]);
        assert!(!reconcile_loaded(&f, &mut state, StateKind::Checked, q));
        assert!(!state.contains(StateKind::Checked, "q1"));
    }
}
