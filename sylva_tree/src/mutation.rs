// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cycle-safe node moves.

use alloc::string::String;

use crate::error::TreeError;
use crate::store::Forest;
use crate::types::Position;

/// Moves `dragged` (with its subtree) relative to `target`.
///
/// Every guard runs before the forest is touched, so a failed move leaves it
/// unchanged:
/// - either id missing: [`TreeError::NotFound`];
/// - `target` is `dragged` or lies inside its subtree: [`TreeError::CycleRejected`].
///
/// `Inside` appends to the target's children, creating the child list if the
/// target had none. `Before` and `After` place the node next to the target
/// among the target's siblings (roots included).
pub(crate) fn try_move_node<P>(
    forest: &mut Forest<P>,
    dragged_id: &str,
    target_id: &str,
    position: Position,
) -> Result<(), TreeError> {
    let dragged = forest
        .key_of(dragged_id)
        .ok_or_else(|| TreeError::not_found(dragged_id))?;
    let target = forest
        .key_of(target_id)
        .ok_or_else(|| TreeError::not_found(target_id))?;
    if forest.is_descendant_key(dragged, target) {
        tracing::warn!(dragged = dragged_id, target = target_id, "rejected move into own subtree");
        return Err(TreeError::CycleRejected {
            dragged: String::from(dragged_id),
            target: String::from(target_id),
        });
    }
    let Some((parent, index)) = forest.position_of(target) else {
        return Err(TreeError::not_found(target_id));
    };
    if forest.position_of(dragged).is_none() {
        return Err(TreeError::not_found(dragged_id));
    }

    forest.detach(dragged);
    // The target may have shifted left if it shared a parent with the dragged node.
    let (parent, index) = forest.position_of(target).unwrap_or((parent, index));
    let attached = match position {
        Position::Before => forest.attach(dragged, parent, index),
        Position::After => forest.attach(dragged, parent, index + 1),
        Position::Inside => forest.attach(dragged, Some(target), usize::MAX),
    };
    debug_assert!(attached, "both keys were checked to be alive");
    tracing::debug!(dragged = dragged_id, target = target_id, ?position, "moved node");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TreeNode;
    use alloc::vec;
    use alloc::vec::Vec;

    fn forest() -> Forest {
        Forest::from_nodes(vec![
            TreeNode::new("a", "A")
                .child(TreeNode::new("a1", "A1"))
                .child(TreeNode::new("a2", "A2").child(TreeNode::new("a2x", "A2x"))),
            TreeNode::new("b", "B"),
            TreeNode::new("c", "C"),
        ])
    }

    fn order(f: &Forest) -> Vec<(String, usize)> {
        f.keys_depth_first()
            .into_iter()
            .filter_map(|k| f.node(k))
            .map(|n| (String::from(n.id()), n.depth()))
            .collect()
    }

    #[test]
    fn moves_inside_append_and_create_child_lists() {
        let mut f = forest();
        try_move_node(&mut f, "c", "b", Position::Inside).unwrap();
        try_move_node(&mut f, "a1", "b", Position::Inside).unwrap();
        let b = f.get("b").unwrap();
        let children: Vec<_> = b.children().map(|n| n.id()).collect();
        assert_eq!(children, vec!["c", "a1"]);
        assert!(f.is_descendant("b", "a1"));
    }

    #[test]
    fn before_and_after_between_siblings() {
        let mut f = forest();
        try_move_node(&mut f, "c", "a", Position::Before).unwrap();
        let roots: Vec<_> = f.roots().iter().filter_map(|&k| f.node(k)).map(|n| n.id()).collect();
        assert_eq!(roots, vec!["c", "a", "b"]);

        // Moving right past a later sibling accounts for the removed slot.
        try_move_node(&mut f, "c", "b", Position::After).unwrap();
        let roots: Vec<_> = f.roots().iter().filter_map(|&k| f.node(k)).map(|n| n.id()).collect();
        assert_eq!(roots, vec!["a", "b", "c"]);

        try_move_node(&mut f, "a2x", "a1", Position::After).unwrap();
        let a: Vec<_> = f.get("a").unwrap().children().map(|n| n.id()).collect();
        assert_eq!(a, vec!["a1", "a2x", "a2"]);
    }

    #[test]
    fn cycles_are_rejected_without_mutation() {
        let mut f = forest();
        let before = order(&f);
        assert_eq!(
            try_move_node(&mut f, "a", "a2x", Position::Inside),
            Err(TreeError::CycleRejected {
                dragged: "a".into(),
                target: "a2x".into()
            })
        );
        assert!(matches!(
            try_move_node(&mut f, "a", "a", Position::After),
            Err(TreeError::CycleRejected { .. })
        ));
        assert_eq!(
            try_move_node(&mut f, "a", "zzz", Position::Before),
            Err(TreeError::NotFound { id: "zzz".into() })
        );
        assert_eq!(order(&f), before);
    }

    #[test]
    fn child_moved_before_its_parent_becomes_a_root() {
        let mut f: Forest = Forest::from_nodes(vec![
            TreeNode::new("A", "A").child(TreeNode::new("B", "B")),
        ]);
        try_move_node(&mut f, "B", "A", Position::Before).unwrap();
        assert_eq!(order(&f), vec![("B".into(), 0), ("A".into(), 0)]);
        assert_eq!(f.get("A").unwrap().children().count(), 0);
    }
}
