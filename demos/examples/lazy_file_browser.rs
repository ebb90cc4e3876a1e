// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy file browser: a tree whose folders are fetched on demand.
//!
//! This example shows how to:
//! - build a lazy tree and expand folders through an async loader,
//! - check a folder before its contents arrive and see the check cascade,
//! - search across everything loaded so far,
//! - expand the whole tree with a concurrent fan-out and inspect failures.
//!
//! Run:
//! - `RUST_LOG=sylva_tree=debug cargo run -p sylva_demos --example lazy_file_browser`

use futures::executor::block_on;
use sylva_tree::{
    LoadError, LoadRequest, RowFlags, TreeConfig, TreeEngine, TreeNode, highlight_spans,
};
use tracing_subscriber::EnvFilter;

/// Payload: the path on the pretend file system.
type Path = String;

fn folder(path: &str, name: &str) -> TreeNode<Path> {
    TreeNode::with_payload(path, name, path.to_owned()).lazy()
}

fn file(path: &str, name: &str) -> TreeNode<Path> {
    TreeNode::with_payload(path, name, path.to_owned())
}

/// Lists a folder. `/mnt/offline` always fails.
async fn list_dir(req: LoadRequest<Path>) -> Result<Vec<TreeNode<Path>>, LoadError> {
    let base = req.payload;
    let entries = match base.as_str() {
        "/home" => vec![
            folder("/home/docs", "docs"),
            folder("/home/photos", "photos"),
            file("/home/todo.txt", "todo.txt"),
        ],
        "/home/docs" => vec![
            file("/home/docs/report.pdf", "Quarterly report.pdf"),
            folder("/home/docs/drafts", "drafts"),
        ],
        "/home/docs/drafts" => vec![file("/home/docs/drafts/report-v2.md", "report v2.md")],
        "/home/photos" => (1..=3)
            .map(|i| file(&format!("/home/photos/{i}.jpg"), &format!("IMG_{i:04}.jpg")))
            .collect(),
        "/mnt/offline" => return Err(LoadError::new("device not mounted")),
        _ => Vec::new(),
    };
    Ok(entries)
}

fn render(tree: &mut TreeEngine<Path>, title: &str) {
    println!("── {title}");
    let term = tree.search_term().to_owned();
    let rows = tree.window().rows.to_vec();
    for row in &rows {
        let flags = tree.row_flags(row);
        let Some(node) = tree.node(row.key) else {
            continue;
        };
        let arrow = match (
            flags.contains(RowFlags::HAS_CHILDREN),
            flags.contains(RowFlags::EXPANDED),
        ) {
            (false, _) => ' ',
            (true, true) => 'v',
            (true, false) => '>',
        };
        let check = if flags.contains(RowFlags::CHECKED) { "[x]" } else { "[ ]" };
        let mut label = node.label().to_owned();
        for span in highlight_spans(node.label(), &term).iter().rev() {
            label.insert(span.end, '*');
            label.insert(span.start, '*');
        }
        println!("{}{arrow} {check} {label}", "  ".repeat(row.depth));
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = TreeConfig::default().with_lazy(true).with_checkbox(true);
    let mut tree = TreeEngine::new(
        vec![folder("/home", "home"), folder("/mnt/offline", "offline")],
        config,
    );
    render(&mut tree, "initial");

    block_on(tree.expand_with("/home", &list_dir)).expect("home is listable");
    render(&mut tree, "after expanding home");

    // Checking a folder before it loads: its entries arrive checked.
    tree.toggle_check("/home/docs");
    block_on(tree.expand_with("/home/docs", &list_dir)).expect("docs are listable");
    render(&mut tree, "docs checked, then loaded");

    if let Err(err) = block_on(tree.expand_with("/mnt/offline", &list_dir)) {
        match std::error::Error::source(&err) {
            Some(cause) => println!("!! {err}: {cause}"),
            None => println!("!! {err}"),
        }
    }

    let report = block_on(tree.expand_all_with(&list_dir));
    println!("expand all: {} failure(s), changes {:?}", report.errors.len(), report.changes);
    render(&mut tree, "everything expanded");

    tree.search("report");
    render(&mut tree, "search: report");

    let checked: Vec<_> = tree.checked_nodes().iter().map(|n| n.id()).collect();
    println!("checked: {checked:?}");
}
