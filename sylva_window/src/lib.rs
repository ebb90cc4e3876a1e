// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sylva Window: which rows of a long strip to realize for a scroll position.
//!
//! A small, renderer-agnostic core for windowing a dense strip of rows indexed
//! `0..len` inside a fixed-height scroll viewport. The tree engine in `sylva_tree`
//! builds on it, but nothing here knows about trees.
//!
//! - [`RowMetrics`]: row geometry (offsets, heights, offset-to-row lookup).
//! - [`UniformRows`]: every row the same height.
//! - [`compute_window`]: for a scroll offset, viewport height, and overscan row
//!   count, the `[start, end)` rows to realize and where to place them.
//! - [`Viewport`]: owns the metrics and the scroll state, caches the last
//!   [`RowWindow`], and scrolls rows into view with a [`ScrollAlign`].
//!
//! Host frameworks own the row views. They call [`Viewport::window`] after
//! scrolling, resizing, or changing the row count, translate the realized rows
//! by [`RowWindow::translate_offset`], and size the scroll area to
//! [`RowWindow::total_height`].
//!
//! ## Minimal example
//!
//! ```rust
//! use sylva_window::{UniformRows, Viewport};
//!
//! // 100 rows of 40 logical pixels in a 550px viewport, one row of overscan.
//! let mut view = Viewport::new(UniformRows::new(100, 40.0), 550.0, 1);
//!
//! let window = view.window();
//! assert_eq!((window.start, window.end), (0, 15));
//! assert_eq!(window.translate_offset, 0.0);
//! assert_eq!(window.total_height, 4000.0);
//!
//! view.set_scroll_offset(400.0);
//! assert_eq!(view.window().start, 10);
//! ```
//!
//! Offsets and heights are expected to be finite.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod metrics;
mod viewport;
mod window;

pub use metrics::{RowMetrics, UniformRows};
pub use viewport::{ScrollAlign, Viewport};
pub use window::{RowWindow, compute_window};
