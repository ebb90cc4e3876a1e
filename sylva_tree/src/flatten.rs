// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flattening the forest into the ordered sequence of visible rows.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashSet;

use crate::search::SearchTerm;
use crate::store::{Forest, NodeRef};
use crate::types::NodeKey;

/// Visibility predicate. A node it rejects is hidden along with its subtree.
pub type Filter<P> = Box<dyn Fn(&NodeRef<'_, P>) -> bool>;

/// One entry of the flattened sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    /// The node shown on this row.
    pub key: NodeKey,
    /// Number of ancestors.
    pub depth: usize,
    /// The label matches the active search term.
    pub is_search_match: bool,
    /// Children are shown because a search hit lies below this node.
    pub forced_open: bool,
}

struct Candidate {
    key: NodeKey,
    parent: Option<usize>,
    depth: usize,
    self_match: bool,
    below_match: bool,
}

/// Produces the visible rows in depth-first pre-order.
///
/// A node rejected by `filter` is dropped together with its whole subtree.
/// Without a search term, a node is shown whenever its parent is shown and
/// the parent's id is in `expanded`. With a search term, a node is shown iff
/// its label or some descendant's label matches, and the children of every
/// node with a match below are shown regardless of `expanded`.
///
/// The walk uses an explicit stack, so deep forests cannot overflow the call
/// stack. The result depends only on the inputs.
pub fn compute_visible_rows<P>(
    forest: &Forest<P>,
    expanded: &HashSet<String>,
    filter: Option<&dyn Fn(&NodeRef<'_, P>) -> bool>,
    search: &SearchTerm,
) -> Vec<VisibleRow> {
    let searching = !search.is_empty();

    // Collect the candidates in pre-order. While searching every unfiltered
    // loaded node is a candidate; otherwise only expanded branches are walked.
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut stack: Vec<(NodeKey, Option<usize>, usize)> =
        forest.roots().iter().rev().map(|&k| (k, None, 0)).collect();
    while let Some((key, parent, depth)) = stack.pop() {
        let Some(node) = forest.node(key) else {
            continue;
        };
        if filter.is_some_and(|f| !f(&node)) {
            continue;
        }
        let position = candidates.len();
        candidates.push(Candidate {
            key,
            parent,
            depth,
            self_match: searching && search.matches(node.label()),
            below_match: false,
        });
        if searching || expanded.contains(node.id()) {
            if let Some(children) = node.child_keys() {
                stack.extend(children.iter().rev().map(|&c| (c, Some(position), depth + 1)));
            }
        }
    }

    if searching {
        // Children always follow their parent, so a reverse sweep settles
        // every subtree before its root is visited.
        for i in (0..candidates.len()).rev() {
            let hit = candidates[i].self_match || candidates[i].below_match;
            if hit && let Some(p) = candidates[i].parent {
                candidates[p].below_match = true;
            }
        }
    }

    let mut open = alloc::vec![false; candidates.len()];
    let mut rows = Vec::new();
    for (i, c) in candidates.iter().enumerate() {
        let parent_open = c.parent.is_none_or(|p| open[p]);
        if !parent_open {
            continue;
        }
        if searching {
            if !(c.self_match || c.below_match) {
                continue;
            }
            open[i] = c.below_match;
        } else {
            // Only expanded nodes had their children collected.
            open[i] = true;
        }
        rows.push(VisibleRow {
            key: c.key,
            depth: c.depth,
            is_search_match: c.self_match,
            forced_open: searching && c.below_match,
        });
    }

    tracing::trace!(
        rows = rows.len(),
        candidates = candidates.len(),
        searching,
        "flattened visible rows"
    );
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TreeNode;
    use alloc::vec;

    fn forest() -> Forest {
        Forest::from_nodes(vec![
            TreeNode::new("docs", "Documents")
                .child(TreeNode::new("cv", "Resume.pdf"))
                .child(
                    TreeNode::new("work", "Work")
                        .child(TreeNode::new("q1", "Report Q1"))
                        .child(TreeNode::new("q2", "Notes Q2")),
                ),
            TreeNode::new("pics", "Pictures").child(TreeNode::new("cat", "cat.png")),
            TreeNode::new("lazy", "Remote").lazy(),
        ])
    }

    fn ids(forest: &Forest, rows: &[VisibleRow]) -> Vec<String> {
        rows.iter()
            .filter_map(|r| forest.node(r.key))
            .map(|n| String::from(n.id()))
            .collect()
    }

    fn expanded(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| String::from(*s)).collect()
    }

    #[test]
    fn collapsed_forest_shows_roots_only() {
        let f = forest();
        let rows = compute_visible_rows(&f, &HashSet::new(), None, &SearchTerm::default());
        assert_eq!(ids(&f, &rows), vec!["docs", "pics", "lazy"]);
        assert!(rows.iter().all(|r| r.depth == 0 && !r.is_search_match));
    }

    #[test]
    fn expansion_requires_every_ancestor() {
        let f = forest();
        // "work" is expanded but its parent is not.
        let rows = compute_visible_rows(&f, &expanded(&["work"]), None, &SearchTerm::default());
        assert_eq!(ids(&f, &rows), vec!["docs", "pics", "lazy"]);

        let rows = compute_visible_rows(
            &f,
            &expanded(&["docs", "work", "lazy"]),
            None,
            &SearchTerm::default(),
        );
        assert_eq!(
            ids(&f, &rows),
            vec!["docs", "cv", "work", "q1", "q2", "pics", "lazy"]
        );
        assert_eq!(rows[3].depth, 2);
    }

    #[test]
    fn search_forces_matching_branches_open() {
        let f = forest();
        let rows = compute_visible_rows(&f, &HashSet::new(), None, &SearchTerm::new("report"));
        assert_eq!(ids(&f, &rows), vec!["docs", "work", "q1"]);
        assert!(!rows[0].is_search_match && rows[0].forced_open);
        assert!(rows[2].is_search_match && !rows[2].forced_open);
    }

    #[test]
    fn matching_parent_hides_non_matching_children() {
        let f = forest();
        let rows = compute_visible_rows(
            &f,
            &expanded(&["pics"]),
            None,
            &SearchTerm::new("PICT"),
        );
        assert_eq!(ids(&f, &rows), vec!["pics"]);
        assert!(!rows[0].forced_open);
    }

    #[test]
    fn filter_removes_whole_subtrees() {
        let f = forest();
        let hide_work = |n: &NodeRef<'_, ()>| n.id() != "work";
        let rows = compute_visible_rows(
            &f,
            &expanded(&["docs", "work"]),
            Some(&hide_work),
            &SearchTerm::default(),
        );
        assert_eq!(ids(&f, &rows), vec!["docs", "cv", "pics", "lazy"]);

        // A filtered subtree cannot surface through a search hit either.
        let rows = compute_visible_rows(&f, &HashSet::new(), Some(&hide_work), &SearchTerm::new("q1"));
        assert!(rows.is_empty());
    }

    #[test]
    fn deep_chains_do_not_recurse() {
        let mut node: TreeNode = TreeNode::new("leaf", "needle");
        let mut open = HashSet::new();
        for i in 0..20_000 {
            let id = alloc::format!("n{i}");
            open.insert(id.clone());
            node = TreeNode::new(id, "x").child(node);
        }
        let f = Forest::from_nodes(vec![node]);
        let rows = compute_visible_rows(&f, &open, None, &SearchTerm::default());
        assert_eq!(rows.len(), 20_001);
        let rows = compute_visible_rows(&f, &HashSet::new(), None, &SearchTerm::new("needle"));
        assert_eq!(rows.len(), 20_001);
        assert_eq!(rows.last().map(|r| r.depth), Some(20_000));
    }
}
