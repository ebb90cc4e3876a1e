// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll state over a [`RowMetrics`] strip, with a cached window.

use crate::{RowMetrics, RowWindow, UniformRows, compute_window};

/// How [`Viewport::scroll_to_index`] positions a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAlign {
    /// Row top at the viewport top.
    Start,
    /// Row centered in the viewport.
    Center,
    /// Row bottom at the viewport bottom.
    End,
    /// The smallest scroll that shows the whole row; none if it already shows.
    Nearest,
}

/// Scroll offset, viewport height, and overscan over a strip of rows.
///
/// The last computed [`RowWindow`] is cached until one of its inputs
/// changes. Mutating the metrics through [`Viewport::metrics_mut`] drops the
/// cache as well.
///
/// The viewport knows nothing about what the rows show; the owner maps the
/// realized indices to its own data.
#[derive(Debug, Clone)]
pub struct Viewport<M = UniformRows> {
    metrics: M,
    scroll_offset: f64,
    viewport_height: f64,
    overscan: usize,
    cached: Option<RowWindow>,
}

impl<M: RowMetrics> Viewport<M> {
    /// Creates a viewport scrolled to the top.
    #[must_use]
    pub fn new(metrics: M, viewport_height: f64, overscan: usize) -> Self {
        Self {
            metrics,
            scroll_offset: 0.0,
            viewport_height: non_negative(viewport_height),
            overscan,
            cached: None,
        }
    }

    /// Row geometry.
    #[must_use]
    pub fn metrics(&self) -> &M {
        &self.metrics
    }

    /// Mutable row geometry. Drops the cached window.
    pub fn metrics_mut(&mut self) -> &mut M {
        self.cached = None;
        &mut self.metrics
    }

    /// Current scroll offset.
    #[must_use]
    pub const fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Sets the scroll offset; negative values clamp to zero.
    ///
    /// Returns `true` if it changed.
    pub fn set_scroll_offset(&mut self, offset: f64) -> bool {
        let offset = non_negative(offset);
        if offset == self.scroll_offset {
            return false;
        }
        self.scroll_offset = offset;
        self.cached = None;
        true
    }

    /// Scrolls by `delta`.
    pub fn scroll_by(&mut self, delta: f64) -> bool {
        self.set_scroll_offset(self.scroll_offset + delta)
    }

    /// Current viewport height.
    #[must_use]
    pub const fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Resizes the viewport. Returns `true` if the height changed.
    pub fn set_viewport_height(&mut self, height: f64) -> bool {
        let height = non_negative(height);
        if height == self.viewport_height {
            return false;
        }
        self.viewport_height = height;
        self.cached = None;
        true
    }

    /// Extra rows realized below the viewport.
    #[must_use]
    pub const fn overscan(&self) -> usize {
        self.overscan
    }

    /// Changes the overscan row count.
    pub fn set_overscan(&mut self, overscan: usize) {
        if overscan != self.overscan {
            self.overscan = overscan;
            self.cached = None;
        }
    }

    /// The rows to realize, computed on first use after a change.
    pub fn window(&mut self) -> RowWindow {
        if let Some(window) = self.cached {
            return window;
        }
        let window = compute_window(
            &self.metrics,
            self.scroll_offset,
            self.viewport_height,
            self.overscan,
        );
        self.cached = Some(window);
        window
    }

    /// Largest offset that still fills the viewport.
    #[must_use]
    pub fn max_scroll_offset(&self) -> f64 {
        non_negative(self.metrics.total_height() - self.viewport_height)
    }

    /// Pulls the scroll offset back inside the content, for example after
    /// rows collapse. Returns `true` if it moved.
    pub fn clamp_scroll(&mut self) -> bool {
        let max = self.max_scroll_offset();
        self.scroll_offset > max && self.set_scroll_offset(max)
    }

    /// Returns `true` if row `index` is entirely inside the viewport.
    #[must_use]
    pub fn is_row_fully_visible(&self, index: usize) -> bool {
        if index >= self.metrics.len() {
            return false;
        }
        let top = self.metrics.offset_of(index);
        let bottom = top + self.metrics.height_of(index);
        top >= self.scroll_offset && bottom <= self.scroll_offset + self.viewport_height
    }

    /// Scrolls row `index` (clamped to the last row) into view.
    ///
    /// Returns `true` if the scroll offset changed.
    pub fn scroll_to_index(&mut self, index: usize, align: ScrollAlign) -> bool {
        let len = self.metrics.len();
        if len == 0 {
            return self.set_scroll_offset(0.0);
        }
        let index = index.min(len - 1);
        let top = self.metrics.offset_of(index);
        let bottom = top + self.metrics.height_of(index);
        let view = self.viewport_height;
        let target = match align {
            ScrollAlign::Start => top,
            ScrollAlign::End => bottom - view,
            ScrollAlign::Center => (top + bottom - view) / 2.0,
            ScrollAlign::Nearest if self.is_row_fully_visible(index) => self.scroll_offset,
            ScrollAlign::Nearest if top < self.scroll_offset => top,
            ScrollAlign::Nearest => bottom - view,
        };
        self.set_scroll_offset(target)
    }
}

fn non_negative(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}
