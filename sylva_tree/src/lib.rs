// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sylva Tree: a windowed tree-state engine for virtualized tree views.
//!
//! Sylva Tree keeps a large, hierarchical, user-navigable list inside a fixed-height
//! viewport without materializing rows that are off screen. It owns the tree data and
//! its view state and hands the host exactly the rows to paint.
//!
//! - Flattens the forest into an ordered sequence of visible rows, honoring expansion,
//!   an optional filter predicate, and a case-insensitive search that forces matching
//!   branches open.
//! - Computes the slice of rows to realize for a scroll offset (via [`sylva_window`]).
//! - Maintains expanded, checked, selected, and loading memberships plus a focus
//!   cursor, with cascading check and selection over loaded subtrees.
//! - Moves nodes with cycle detection.
//! - Bridges to an asynchronous [`Loader`] for lazy children, including a concurrent
//!   expand-all.
//!
//! ## Not a widget
//!
//! This crate does not paint, capture input, or drive a scroll container. The host
//! translates pointer and keyboard events into engine commands, reads
//! [`TreeEngine::window`] and [`TreeEngine::row_flags`] to paint, and reports the
//! scroll offset back. Commands never repaint; they return [`Changes`] and the host
//! decides when to re-read the window.
//!
//! ## API overview
//!
//! - [`TreeEngine`]: the facade most hosts use.
//! - [`TreeNode`]: owned node data for building the tree and taking snapshots.
//! - [`Forest`] / [`NodeRef`] / [`NodeKey`]: the arena-backed node store.
//! - [`StateSets`]: id-keyed memberships and the focus cursor.
//! - [`compute_visible_rows`] / [`VisibleRow`]: the flattening algorithm on its own.
//! - [`Loader`] / [`LoadRequest`] / [`LoadReport`]: lazy loading.
//! - [`TreeConfig`]: construction-time options.
//! - [`TreeError`]: what can go wrong.
//!
//! Key operations:
//! - [`TreeEngine::expand`] / [`TreeEngine::toggle_expand`] / [`TreeEngine::collapse_all`]
//! - [`TreeEngine::expand_with`] and [`TreeEngine::expand_all_with`] to run a loader.
//! - [`TreeEngine::set_checked`] / [`TreeEngine::set_selected`] / [`TreeEngine::select`]
//! - [`TreeEngine::search`] / [`TreeEngine::set_filter`]
//! - [`TreeEngine::try_move_node`] and the drag commands ([`TreeEngine::start_drag`],
//!   [`TreeEngine::drag_over`], [`TreeEngine::drop_at`]).
//! - [`TreeEngine::move_focus`] / [`TreeEngine::scroll_to`]
//!
//! ## Lazy loading
//!
//! ```rust
//! use futures::executor::block_on;
//! use sylva_tree::{LoadError, LoadRequest, TreeConfig, TreeEngine, TreeNode};
//!
//! let mut tree: TreeEngine = TreeEngine::new(
//!     vec![TreeNode::new("remote", "Remote folder").lazy()],
//!     TreeConfig::default().with_lazy(true).with_checkbox(true),
//! );
//! tree.check_node("remote", true);
//!
//! let loader = |req: LoadRequest| async move {
//!     Ok::<_, LoadError>(vec![TreeNode::new(format!("{}/a", req.id), "a")])
//! };
//! block_on(tree.expand_with("remote", &loader)).unwrap();
//!
//! assert_eq!(tree.rows().len(), 2);
//! // Children arriving under a checked node are checked too.
//! assert!(tree.is_checked("remote/a"));
//! ```
//!
//! Ids must be unique across the forest. Duplicate ids are a caller error; lookups then
//! resolve to the first node in depth-first order.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod cascade;
mod config;
pub mod drag;
mod engine;
mod error;
mod flatten;
mod loader;
mod mutation;
mod search;
mod state;
mod store;
mod types;

pub use config::TreeConfig;
pub use engine::{DropOutcome, Expansion, TreeEngine, TreeWindow};
pub use error::{LoadError, TreeError};
pub use flatten::{Filter, VisibleRow, compute_visible_rows};
pub use loader::{LoadReport, LoadRequest, Loader};
pub use search::{SearchTerm, highlight_spans};
pub use state::{StateKind, StateSets};
pub use store::{Forest, NodeRef};
pub use types::{Changes, NodeKey, Position, RowFlags, TreeNode};

pub use sylva_window::ScrollAlign;
