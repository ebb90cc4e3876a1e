// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariant tests for the tree engine.
//!
//! 1. Without a search, the visible rows are exactly the nodes whose every
//!    ancestor is expanded, in depth-first order.
//! 2. With a search, a node is visible iff it or a descendant matches.
//! 3. Moving a node inside another makes it a descendant; moving a node under
//!    its own subtree never mutates the forest.
//! 4. The window realizes `ceil(viewport / row) + 1` rows from the row under
//!    the scroll offset.
//! 5. Collapsing everything is idempotent.
//! 6. Children loaded under a checked node are checked.

use futures::executor::block_on;
use proptest::prelude::*;
use sylva_tree::{LoadError, LoadRequest, Position, TreeConfig, TreeEngine, TreeNode};

// ── Helpers ─────────────────────────────────────────────────────────────

const LABELS: &[&str] = &["alpha", "Beta", "GAMMA", "delta", "Alphabet", "omega", "Zeta"];
const TERMS: &[&str] = &["al", "ET", "a", "mm", "zz", "OMEGA"];

/// A random forest: node `i` has a parent `< i` or is a root.
#[derive(Clone, Debug)]
struct Shape {
    parents: Vec<Option<usize>>,
    labels: Vec<&'static str>,
    expanded: Vec<bool>,
}

impl Shape {
    fn len(&self) -> usize {
        self.parents.len()
    }

    fn id(i: usize) -> String {
        format!("n{i}")
    }

    fn children(&self, i: Option<usize>) -> Vec<usize> {
        (0..self.len()).filter(|&j| self.parents[j] == i).collect()
    }

    /// Node indices in depth-first pre-order.
    fn preorder(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children(None).into_iter().rev().collect();
        while let Some(i) = stack.pop() {
            out.push(i);
            stack.extend(self.children(Some(i)).into_iter().rev());
        }
        out
    }

    fn ancestors(&self, mut i: usize) -> Vec<usize> {
        let mut out = Vec::new();
        while let Some(p) = self.parents[i] {
            out.push(p);
            i = p;
        }
        out
    }

    fn is_in_subtree(&self, root: usize, i: usize) -> bool {
        i == root || self.ancestors(i).contains(&root)
    }

    fn nodes(&self) -> Vec<TreeNode> {
        let n = self.len();
        let mut pending: Vec<Vec<TreeNode>> = (0..n).map(|_| Vec::new()).collect();
        let mut roots = Vec::new();
        // Children have larger indices, so they are complete before their parent.
        for i in (0..n).rev() {
            let mut node = TreeNode::new(Self::id(i), self.labels[i]);
            let mut kids = std::mem::take(&mut pending[i]);
            if !kids.is_empty() {
                kids.reverse();
                node = node.with_children(kids);
            }
            match self.parents[i] {
                Some(p) => pending[p].push(node),
                None => roots.push(node),
            }
        }
        roots.reverse();
        roots
    }

    fn engine(&self) -> TreeEngine {
        let mut tree = TreeEngine::new(self.nodes(), TreeConfig::default());
        for (i, open) in self.expanded.iter().enumerate() {
            if *open {
                tree.expand(&Self::id(i)).unwrap();
            }
        }
        tree
    }
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    prop::collection::vec(
        (
            any::<bool>(),
            any::<prop::sample::Index>(),
            0..LABELS.len(),
            any::<bool>(),
        ),
        1..40,
    )
    .prop_map(|specs| {
        let mut shape = Shape {
            parents: Vec::new(),
            labels: Vec::new(),
            expanded: Vec::new(),
        };
        for (i, (is_root, parent, label, open)) in specs.into_iter().enumerate() {
            let parent = (!is_root && i > 0).then(|| parent.index(i));
            shape.parents.push(parent);
            shape.labels.push(LABELS[label]);
            shape.expanded.push(open);
        }
        shape
    })
}

fn visible_ids(tree: &mut TreeEngine) -> Vec<String> {
    let rows = tree.rows().to_vec();
    rows.iter()
        .filter_map(|r| tree.node(r.key))
        .map(|n| n.id().to_owned())
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Expansion closure
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rows_are_nodes_with_expanded_ancestors(shape in shape_strategy()) {
        let mut tree = shape.engine();
        let expected: Vec<String> = shape
            .preorder()
            .into_iter()
            .filter(|&i| shape.ancestors(i).iter().all(|&a| shape.expanded[a]))
            .map(Shape::id)
            .collect();
        prop_assert_eq!(visible_ids(&mut tree), expected);

        let rows = tree.rows().to_vec();
        for row in rows {
            let node = tree.node(row.key).unwrap();
            prop_assert_eq!(row.depth, node.depth());
            prop_assert!(!row.is_search_match);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Search keeps matches and their ancestors only
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn search_shows_matches_and_their_ancestors(
        shape in shape_strategy(),
        term in prop::sample::select(TERMS),
    ) {
        let mut tree = shape.engine();
        tree.search(term);
        let needle = term.to_lowercase();
        let hit = |i: usize| shape.labels[i].to_lowercase().contains(&needle);
        let expected: Vec<String> = shape
            .preorder()
            .into_iter()
            .filter(|&i| (0..shape.len()).any(|j| hit(j) && shape.is_in_subtree(i, j)))
            .map(Shape::id)
            .collect();
        prop_assert_eq!(visible_ids(&mut tree), expected);

        let rows = tree.rows().to_vec();
        for row in rows {
            let node = tree.node(row.key).unwrap();
            prop_assert_eq!(row.is_search_match, node.label().to_lowercase().contains(&needle));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Moves are cycle-safe
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn moves_never_create_cycles(
        shape in shape_strategy(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
        position in prop::sample::select(&[Position::Before, Position::After, Position::Inside][..]),
    ) {
        let (a, b) = (a.index(shape.len()), b.index(shape.len()));
        let (a_id, b_id) = (Shape::id(a), Shape::id(b));
        let mut tree = shape.engine();
        let before = tree.data();

        let moved = tree.move_node(&a_id, &b_id, position);
        if shape.is_in_subtree(a, b) {
            prop_assert!(!moved);
            prop_assert_eq!(tree.data(), before);
        } else {
            prop_assert!(moved);
            prop_assert_eq!(tree.forest().len(), shape.len());
            if position == Position::Inside {
                prop_assert!(tree.is_descendant(&b_id, &a_id));
            } else {
                let parent = |id: &str| {
                    tree.find_node_by_id(id).and_then(|n| n.parent()).map(|p| p.key())
                };
                prop_assert_eq!(parent(&a_id), parent(&b_id));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Window arithmetic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn window_realizes_viewport_plus_overscan(len in 0usize..300, scroll in 0u32..20_000) {
        let nodes = (0..len).map(|i| TreeNode::new(Shape::id(i), "row")).collect();
        let mut tree: TreeEngine = TreeEngine::new(nodes, TreeConfig::default());
        tree.set_scroll_offset(f64::from(scroll));
        let w = tree.window();
        if len == 0 {
            prop_assert!(w.rows.is_empty());
        } else {
            let start = (scroll as usize / 40).min(len - 1);
            prop_assert_eq!(w.start, start);
            prop_assert_eq!(w.end, (start + 14 + 1).min(len));
            prop_assert_eq!(w.translate_offset, start as f64 * 40.0);
        }
        prop_assert_eq!(w.total_height, len as f64 * 40.0);
        prop_assert_eq!(w.rows.len(), w.end - w.start);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Collapse-all idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn collapse_all_twice_equals_once(shape in shape_strategy()) {
        let mut tree = shape.engine();
        tree.collapse_all();
        let once = visible_ids(&mut tree);
        tree.collapse_all();
        prop_assert!(tree.state().expanded().is_empty());
        prop_assert_eq!(visible_ids(&mut tree), once);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Cascade reaches late children
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn checked_parent_checks_every_loaded_descendant(shape in shape_strategy()) {
        let mut tree: TreeEngine = TreeEngine::new(
            vec![TreeNode::new("root", "Root").lazy()],
            TreeConfig::default().with_lazy(true),
        );
        tree.set_checked("root", true, true);

        let loader = |_req: LoadRequest| {
            let nodes = shape.nodes();
            async move { Ok::<_, LoadError>(nodes) }
        };
        block_on(tree.expand_with("root", &loader)).unwrap();

        prop_assert_eq!(tree.forest().len(), shape.len() + 1);
        for i in 0..shape.len() {
            prop_assert!(tree.is_checked(&Shape::id(i)));
        }
    }
}
