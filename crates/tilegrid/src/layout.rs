#![forbid(unsafe_code)]

//! Grid geometry: order ↔ slot mapping.
//!
//! Slots are laid out row-major in grid-local coordinates (the grid's own
//! top-left is the origin):
//!
//! ```text
//! x = (order mod columns) * tile_width
//! y = floor(order / columns) * tile_height
//! ```
//!
//! [`PositionTable`] memoizes these per item count and is rebuilt whenever
//! the metrics or the count change.

use tilegrid_core::geometry::{Point, Size};

/// Measured tile geometry for a fixed column count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    num_columns: usize,
    tile: Size,
}

impl GridMetrics {
    /// Metrics with an explicit tile size. `num_columns` is floored at 1.
    #[must_use]
    pub fn new(num_columns: usize, tile: Size) -> Self {
        Self {
            num_columns: num_columns.max(1),
            tile,
        }
    }

    /// Derive tile size from a measured grid width: `width / columns` wide,
    /// `item_height` tall or square.
    #[must_use]
    pub fn measure(grid_width: f32, num_columns: usize, item_height: Option<f32>) -> Self {
        let num_columns = num_columns.max(1);
        let tile_width = grid_width / num_columns as f32;
        Self::new(
            num_columns,
            Size::new(tile_width, item_height.unwrap_or(tile_width)),
        )
    }

    #[inline]
    pub fn num_columns(&self) -> usize {
        self.num_columns
    }

    #[inline]
    pub fn tile(&self) -> Size {
        self.tile
    }

    /// Total width of a full row.
    #[inline]
    pub fn grid_width(&self) -> f32 {
        self.tile.width * self.num_columns as f32
    }

    /// Top-left of the slot for `order`.
    #[inline]
    pub fn position_for_order(&self, order: usize) -> Point {
        let column = order % self.num_columns;
        let row = order / self.num_columns;
        Point::new(
            column as f32 * self.tile.width,
            row as f32 * self.tile.height,
        )
    }

    /// Height of `item_count` tiles laid out in rows.
    #[inline]
    pub fn content_height(&self, item_count: usize) -> f32 {
        item_count.div_ceil(self.num_columns) as f32 * self.tile.height
    }

    /// Order of the slot containing a grid-local point, if any tile is there.
    pub fn order_at(&self, local: Point, item_count: usize) -> Option<usize> {
        if !(local.x.is_finite() && local.y.is_finite())
            || local.x < 0.0
            || local.y < 0.0
            || !self.tile.is_measured()
        {
            return None;
        }
        let column = (local.x / self.tile.width) as usize;
        let row = (local.y / self.tile.height) as usize;
        if column >= self.num_columns || row >= item_count.div_ceil(self.num_columns) {
            return None;
        }
        let order = row.checked_mul(self.num_columns)?.checked_add(column)?;
        (order < item_count).then_some(order)
    }
}

/// Cached slot positions indexed by order.
#[derive(Debug, Clone)]
pub struct PositionTable {
    metrics: GridMetrics,
    slots: Vec<Point>,
}

impl PositionTable {
    #[must_use]
    pub fn new(metrics: GridMetrics, item_count: usize) -> Self {
        let mut table = Self {
            metrics,
            slots: Vec::new(),
        };
        table.rebuild(metrics, item_count);
        table
    }

    /// Recompute every slot for new metrics or a new item count.
    pub fn rebuild(&mut self, metrics: GridMetrics, item_count: usize) {
        self.metrics = metrics;
        self.slots.clear();
        self.slots
            .extend((0..item_count).map(|order| metrics.position_for_order(order)));
    }

    /// Slot position for `order`. Orders beyond the cached range fall back
    /// to the formula so a freshly appended item never lands at the origin.
    #[inline]
    pub fn position_for_order(&self, order: usize) -> Point {
        self.slots
            .get(order)
            .copied()
            .unwrap_or_else(|| self.metrics.position_for_order(order))
    }

    #[inline]
    pub fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
