// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The window computation.

use core::ops::Range;

use crate::RowMetrics;

/// Rows to realize for one scroll position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowWindow {
    /// First realized row.
    pub start: usize,
    /// One past the last realized row.
    pub end: usize,
    /// Top of row `start`: where the host places the realized chunk.
    pub translate_offset: f64,
    /// Height of every row together, for sizing the scroll area.
    pub total_height: f64,
}

impl RowWindow {
    /// Nothing to realize.
    pub const EMPTY: Self = Self {
        start: 0,
        end: 0,
        translate_offset: 0.0,
        total_height: 0.0,
    };

    /// Realized row indices.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of realized rows.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` when there is nothing to realize.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Picks the rows to realize.
///
/// The window starts at the row under `scroll_offset` (the last row if the
/// offset is past the end). Rows are counted from the top of that row until
/// `viewport_height` is covered, then `overscan` more rows are added so a
/// fractional scroll position never shows a gap. For uniform rows of height
/// `h` this gives `start = floor(scroll / h)` and
/// `end = min(start + ceil(viewport / h) + overscan, len)`.
///
/// Negative offsets and heights count as zero.
pub fn compute_window<M: RowMetrics + ?Sized>(
    metrics: &M,
    scroll_offset: f64,
    viewport_height: f64,
    overscan: usize,
) -> RowWindow {
    let len = metrics.len();
    if len == 0 {
        return RowWindow::EMPTY;
    }
    let start = metrics.row_at(scroll_offset.max(0.0)).min(len - 1);
    let fitted = metrics.fill_end(start, viewport_height.max(0.0));

    RowWindow {
        start,
        end: fitted.saturating_add(overscan).min(len),
        translate_offset: metrics.offset_of(start),
        total_height: metrics.total_height(),
    }
}
