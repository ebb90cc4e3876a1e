// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

/// Construction-time options for a [`TreeEngine`](crate::TreeEngine).
///
/// Use [`TreeConfig::default`] and the chainable `with_*` setters:
///
/// ```rust
/// use sylva_tree::TreeConfig;
///
/// let config = TreeConfig::default()
///     .with_lazy(true)
///     .with_checkbox(true)
///     .with_viewport_height(300.0);
/// assert_eq!(config.row_height, 40.0);
/// assert!(config.default_drag_drop);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeConfig {
    /// Height of every row, in the host's logical units.
    pub row_height: f64,
    /// Height of the scroll viewport.
    pub viewport_height: f64,
    /// Extra rows realized past the bottom of the viewport.
    pub overscan_rows: usize,
    /// Lazy mode: nodes marked `has_children` are fetched on expand.
    pub lazy: bool,
    /// Row clicks change the selection.
    pub selectable: bool,
    /// Multi-selection is allowed.
    pub multi_select: bool,
    /// Selecting a node also selects its loaded subtree.
    pub cascade_select: bool,
    /// Checkbox mode.
    pub checkbox: bool,
    /// Rows can be dragged.
    pub draggable: bool,
    /// Drops perform the move themselves; otherwise the host decides.
    pub default_drag_drop: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            row_height: 40.0,
            viewport_height: 550.0,
            overscan_rows: 1,
            lazy: false,
            selectable: false,
            multi_select: false,
            cascade_select: false,
            checkbox: false,
            draggable: false,
            default_drag_drop: true,
        }
    }
}

impl TreeConfig {
    /// Sets [`TreeConfig::row_height`].
    #[must_use]
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    /// Sets [`TreeConfig::viewport_height`].
    #[must_use]
    pub fn with_viewport_height(mut self, viewport_height: f64) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    /// Sets [`TreeConfig::overscan_rows`].
    #[must_use]
    pub fn with_overscan_rows(mut self, overscan_rows: usize) -> Self {
        self.overscan_rows = overscan_rows;
        self
    }

    /// Sets [`TreeConfig::lazy`].
    #[must_use]
    pub fn with_lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    /// Sets [`TreeConfig::selectable`].
    #[must_use]
    pub fn with_selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Sets [`TreeConfig::multi_select`].
    #[must_use]
    pub fn with_multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    /// Sets [`TreeConfig::cascade_select`].
    #[must_use]
    pub fn with_cascade_select(mut self, cascade_select: bool) -> Self {
        self.cascade_select = cascade_select;
        self
    }

    /// Sets [`TreeConfig::checkbox`].
    #[must_use]
    pub fn with_checkbox(mut self, checkbox: bool) -> Self {
        self.checkbox = checkbox;
        self
    }

    /// Sets [`TreeConfig::draggable`].
    #[must_use]
    pub fn with_draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    /// Sets [`TreeConfig::default_drag_drop`].
    #[must_use]
    pub fn with_default_drag_drop(mut self, default_drag_drop: bool) -> Self {
        self.default_drag_drop = default_drag_drop;
        self
    }
}
