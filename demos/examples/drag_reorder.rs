// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Drag reordering and keyboard focus over a long, windowed list.
//!
//! This example shows how to:
//! - drive the drag commands the way an input layer would,
//! - see a drop into a node's own subtree rejected,
//! - move focus with arrow-key deltas and watch the window follow.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p sylva_demos --example drag_reorder`

use sylva_tree::{Position, TreeConfig, TreeEngine, TreeNode};
use tracing_subscriber::EnvFilter;

fn ids(tree: &mut TreeEngine) -> Vec<String> {
    let rows = tree.rows().to_vec();
    rows.iter()
        .filter_map(|r| tree.node(r.key))
        .map(|n| n.id().to_owned())
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let chapters = (1..=3)
        .map(|c| {
            let sections = (1..=3)
                .map(|s| TreeNode::new(format!("{c}.{s}"), format!("Section {c}.{s}")))
                .collect();
            TreeNode::new(format!("{c}"), format!("Chapter {c}")).with_children(sections)
        })
        .collect();
    let config = TreeConfig::default()
        .with_draggable(true)
        .with_selectable(true)
        .with_viewport_height(160.0);
    let mut tree: TreeEngine = TreeEngine::new(chapters, config);
    tree.expand_all();
    println!("start:   {:?}", ids(&mut tree));

    // Drag section 1.1 after chapter 3's last section.
    tree.start_drag("1.1");
    tree.drag_over("3");
    tree.drag_leave();
    tree.drag_over("3.3");
    let outcome = tree.drop_at("3.3", Position::After);
    println!("drop:    {outcome:?}");
    println!("after:   {:?}", ids(&mut tree));

    // Dropping a chapter into its own section is refused.
    tree.start_drag("2");
    let outcome = tree.drop("2.1");
    println!("refused: moved = {:?}", outcome.map(|o| o.moved));

    // Keyboard navigation: the window follows the focus.
    tree.select("1", false);
    for _ in 0..6 {
        tree.move_focus(1);
    }
    let focused = tree.focused_index();
    let window = tree.window();
    println!(
        "focus at row {focused:?}; window rows {}..{} at offset {}",
        window.start, window.end, window.translate_offset
    );
}
