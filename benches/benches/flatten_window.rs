// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use hashbrown::HashSet;
use sylva_tree::{Forest, SearchTerm, TreeConfig, TreeEngine, TreeNode, compute_visible_rows};
use sylva_window::{UniformRows, Viewport};

const LABELS: &[&str] = &["src", "Cargo.toml", "README.md", "main.rs", "lib.rs", "tests"];

/// `fanout` roots, each with `fanout` children, each with `fanout` leaves.
fn gen_forest(fanout: usize) -> Vec<TreeNode> {
    (0..fanout)
        .map(|a| {
            let children = (0..fanout)
                .map(|b| {
                    let leaves = (0..fanout)
                        .map(|c| TreeNode::new(format!("{a}/{b}/{c}"), LABELS[c % LABELS.len()]))
                        .collect();
                    TreeNode::new(format!("{a}/{b}"), LABELS[b % LABELS.len()]).with_children(leaves)
                })
                .collect();
            TreeNode::new(format!("{a}"), LABELS[a % LABELS.len()]).with_children(children)
        })
        .collect()
}

fn bench_flatten(c: &mut Criterion) {
    // 37 * 37 * 37 + 37 * 37 + 37 = 52_059 nodes.
    let nodes = gen_forest(37);
    let forest: Forest = Forest::from_nodes(nodes.clone());
    let all_open: HashSet<String> = forest
        .keys_depth_first()
        .into_iter()
        .filter_map(|k| forest.node(k))
        .map(|n| n.id().to_owned())
        .collect();

    let mut group = c.benchmark_group("flatten");
    group.throughput(Throughput::Elements(forest.len() as u64));
    group.bench_function("expanded", |b| {
        b.iter(|| {
            black_box(compute_visible_rows(
                &forest,
                &all_open,
                None,
                &SearchTerm::default(),
            ))
        });
    });
    group.bench_function("search", |b| {
        let term = SearchTerm::new("main");
        b.iter(|| black_box(compute_visible_rows(&forest, &HashSet::new(), None, &term)));
    });
    group.bench_function("filtered", |b| {
        let filter = |n: &sylva_tree::NodeRef<'_, ()>| n.label() != "tests";
        b.iter(|| {
            black_box(compute_visible_rows(
                &forest,
                &all_open,
                Some(&filter),
                &SearchTerm::default(),
            ))
        });
    });
    group.finish();

    c.bench_function("engine/expand_all_then_window", |b| {
        b.iter_batched(
            || TreeEngine::new(nodes.clone(), TreeConfig::default()),
            |mut tree| {
                tree.expand_all();
                tree.set_scroll_offset(1_000_000.0);
                black_box(tree.window().rows.len())
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_window(c: &mut Criterion) {
    let mut view = Viewport::new(UniformRows::new(50_000, 40.0), 550.0, 1);
    let mut offset = 0.0;
    c.bench_function("window/scroll_step", |b| {
        b.iter(|| {
            offset = (offset + 37.5) % 1_999_000.0;
            view.set_scroll_offset(offset);
            black_box(view.window())
        });
    });
}

criterion_group!(benches, bench_flatten, bench_window);
criterion_main!(benches);
