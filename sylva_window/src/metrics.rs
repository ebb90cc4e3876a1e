// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row geometry: where each row of the strip starts and how tall it is.

/// Vertical layout of a dense strip of rows indexed `0..len`.
///
/// Offsets and heights share the coordinate space of the scroll offset
/// (typically logical pixels). Implementations must keep rows contiguous:
/// `offset_of(0) == 0` and `offset_of(i + 1) == offset_of(i) + height_of(i)`.
pub trait RowMetrics {
    /// Number of rows.
    fn len(&self) -> usize;

    /// Returns `true` if the strip has no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Top of row `index`.
    fn offset_of(&self, index: usize) -> f64;

    /// Height of row `index`.
    fn height_of(&self, index: usize) -> f64;

    /// Height of the whole strip.
    fn total_height(&self) -> f64 {
        match self.len() {
            0 => 0.0,
            n => self.offset_of(n - 1) + self.height_of(n - 1),
        }
    }

    /// Row containing `offset`, clamped into `0..len()`; `0` when empty.
    fn row_at(&self, offset: f64) -> usize;

    /// One past the last row starting within `height` of the top of `start`.
    ///
    /// The default walks row offsets. Accumulated offsets can round across a
    /// row boundary, so implementations that know their geometry should
    /// compute this directly.
    fn fill_end(&self, start: usize, height: f64) -> usize {
        let bottom = self.offset_of(start) + height;
        let mut end = start;
        while end < self.len() && self.offset_of(end) < bottom {
            end += 1;
        }
        end
    }
}

/// Rows of one shared height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformRows {
    count: usize,
    height: f64,
}

impl UniformRows {
    /// `count` rows of `height` each. Negative or NaN heights become `0.0`.
    #[must_use]
    pub fn new(count: usize, height: f64) -> Self {
        Self {
            count,
            height: sanitize(height),
        }
    }

    /// Number of rows.
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Changes the number of rows.
    pub fn set_count(&mut self, count: usize) {
        self.count = count;
    }

    /// The shared row height.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }

    /// Changes the shared row height.
    pub fn set_height(&mut self, height: f64) {
        debug_assert!(height.is_finite(), "row height must be finite, got {height}");
        self.height = sanitize(height);
    }
}

impl RowMetrics for UniformRows {
    fn len(&self) -> usize {
        self.count
    }

    fn offset_of(&self, index: usize) -> f64 {
        to_f64(index) * self.height
    }

    fn height_of(&self, _index: usize) -> f64 {
        self.height
    }

    fn total_height(&self) -> f64 {
        to_f64(self.count) * self.height
    }

    fn row_at(&self, offset: f64) -> usize {
        if self.count == 0 || self.height <= 0.0 {
            return 0;
        }
        floor_index(offset / self.height).min(self.count - 1)
    }

    fn fill_end(&self, start: usize, height: f64) -> usize {
        if self.count == 0 {
            return 0;
        }
        // `ceil(height / row)` rows, without summing offsets.
        let rows = if height > 0.0 {
            ceil_index(height / self.height)
        } else {
            0
        };
        start.saturating_add(rows).min(self.count)
    }
}

fn sanitize(height: f64) -> f64 {
    if height > 0.0 { height } else { 0.0 }
}

#[allow(
    clippy::cast_precision_loss,
    reason = "Row counts past 2^52 are not meaningful scroll extents."
)]
pub(crate) fn to_f64(n: usize) -> f64 {
    n as f64
}

/// `floor(x)` as an index; negatives and NaN give `0`, overflow saturates.
pub(crate) fn floor_index(x: f64) -> usize {
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Float to int casts saturate, and truncation is floor for non-negative values."
    )]
    let index = x as usize;
    index
}

/// `ceil(x)` as an index, saturating like [`floor_index`].
pub(crate) fn ceil_index(x: f64) -> usize {
    let floor = floor_index(x);
    if to_f64(floor) < x {
        floor.saturating_add(1)
    } else {
        floor
    }
}

#[cfg(test)]
mod tests {
    use super::{RowMetrics, UniformRows, ceil_index, floor_index};

    #[test]
    fn uniform_rows_map_offsets_to_rows() {
        let rows = UniformRows::new(4, 25.0);
        assert_eq!(rows.total_height(), 100.0);
        assert_eq!(rows.offset_of(2), 50.0);
        assert_eq!(rows.row_at(0.0), 0);
        assert_eq!(rows.row_at(24.9), 0);
        assert_eq!(rows.row_at(25.0), 1);
        assert_eq!(rows.row_at(1e9), 3);
        assert_eq!(rows.row_at(-3.0), 0);
    }

    #[test]
    fn degenerate_heights_collapse_to_zero() {
        let mut rows = UniformRows::new(3, -2.0);
        assert_eq!(rows.height(), 0.0);
        assert_eq!(rows.row_at(10.0), 0);
        rows.set_height(8.0);
        rows.set_count(0);
        assert!(rows.is_empty());
        assert_eq!(rows.total_height(), 0.0);
    }

    #[test]
    fn floor_index_saturates() {
        assert_eq!(floor_index(2.99), 2);
        assert_eq!(floor_index(-0.5), 0);
        assert_eq!(floor_index(f64::NAN), 0);
        assert_eq!(floor_index(f64::INFINITY), usize::MAX);
    }

    #[test]
    fn ceil_index_rounds_up_fractions_only() {
        assert_eq!(ceil_index(2.0), 2);
        assert_eq!(ceil_index(2.01), 3);
        assert_eq!(ceil_index(0.0), 0);
        assert_eq!(ceil_index(f64::NAN), 0);
        assert_eq!(ceil_index(f64::INFINITY), usize::MAX);
    }

    #[test]
    fn uniform_fill_matches_row_count_formula() {
        let rows = UniformRows::new(50, 40.0);
        assert_eq!(rows.fill_end(0, 550.0), 14);
        assert_eq!(rows.fill_end(45, 550.0), 50);
        assert_eq!(rows.fill_end(3, 0.0), 3);
        // Zero-height rows all fit.
        assert_eq!(UniformRows::new(5, 0.0).fill_end(0, 10.0), 5);
    }
}
