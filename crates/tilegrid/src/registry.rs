#![forbid(unsafe_code)]

//! Item registry: identity ↔ logical order ↔ live position.
//!
//! The registry is the only owner of item payloads, their orders, and the
//! [`PositionTable`]. Everything else reads through it and changes order
//! exclusively via [`Registry::move_to_order`] or [`Registry::reconcile`].
//!
//! # Invariants
//!
//! 1. After every public mutation, orders are a dense permutation of
//!    `0..len()`: no duplicates, no gaps.
//! 2. Keys are unique. An incoming list that repeats a key keeps the first
//!    occurrence.
//! 3. Entries keep insertion order; that order is the render order, not the
//!    logical order.
//! 4. Reorder-disabled items never change order during
//!    [`move_to_order`](Registry::move_to_order).

use std::time::Duration;

use rustc_hash::{FxHashMap, FxHashSet};
use tilegrid_core::geometry::Point;

use crate::layout::{GridMetrics, PositionTable};
use crate::motion::Motion;

/// An item that can live in the grid.
pub trait GridItem: Clone {
    /// Stable unique identity.
    fn key(&self) -> &str;

    /// The item can never become the dragged tile.
    fn drag_disabled(&self) -> bool {
        false
    }

    /// The item never changes order during a drag, and is never a swap target.
    fn reorder_disabled(&self) -> bool {
        false
    }
}

/// One registered item with its order and live position.
#[derive(Debug, Clone)]
pub struct TileEntry<T> {
    item: T,
    order: usize,
    motion: Motion,
}

impl<T: GridItem> TileEntry<T> {
    #[inline]
    pub fn key(&self) -> &str {
        self.item.key()
    }

    #[inline]
    pub fn item(&self) -> &T {
        &self.item
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }
}

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Known keys whose order was changed by the incoming list.
    pub moved: Vec<String>,
}

impl ReconcileReport {
    /// No keys added, removed, or reordered.
    #[inline]
    pub fn is_noop(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

/// Owner of items, orders, and slot positions.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: Vec<TileEntry<T>>,
    index: FxHashMap<String, usize>,
    table: PositionTable,
    settle_duration: Duration,
}

impl<T: GridItem> Registry<T> {
    #[must_use]
    pub fn new(metrics: GridMetrics, settle_duration: Duration) -> Self {
        Self {
            entries: Vec::new(),
            index: FxHashMap::default(),
            table: PositionTable::new(metrics, 0),
            settle_duration,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    pub fn table(&self) -> &PositionTable {
        &self.table
    }

    #[inline]
    pub fn metrics(&self) -> &GridMetrics {
        self.table.metrics()
    }

    /// Entries in insertion (render) order.
    pub fn entries(&self) -> impl Iterator<Item = &TileEntry<T>> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&TileEntry<T>> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn order_of(&self, key: &str) -> Option<usize> {
        self.get(key).map(|e| e.order)
    }

    /// Inverse lookup. Linear in the number of items.
    pub fn key_at_order(&self, order: usize) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.order == order)
            .map(TileEntry::key)
    }

    /// Slot position for an order.
    #[inline]
    pub fn position_for_order(&self, order: usize) -> Point {
        self.table.position_for_order(order)
    }

    /// Payloads sorted by logical order.
    pub fn snapshot_by_order(&self) -> Vec<T> {
        let mut sorted: Vec<&TileEntry<T>> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.order);
        sorted.into_iter().map(|e| e.item.clone()).collect()
    }

    /// Whether orders form a dense permutation of `0..len()`.
    pub fn orders_are_dense(&self) -> bool {
        let mut seen = vec![false; self.entries.len()];
        for entry in &self.entries {
            match seen.get_mut(entry.order) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// Whether any tile is still animating toward its slot.
    pub fn is_animating(&self) -> bool {
        self.entries.iter().any(|e| e.motion.is_settling())
    }

    // -----------------------------------------------------------------------
    // Positions
    // -----------------------------------------------------------------------

    /// Place a tile at an arbitrary point, cancelling any settle.
    pub fn jump(&mut self, key: &str, position: Point) {
        if let Some(&i) = self.index.get(key) {
            self.entries[i].motion.jump_to(position);
        }
    }

    /// Animate a tile to the slot of its current order.
    pub fn settle(&mut self, key: &str) {
        if let Some(&i) = self.index.get(key) {
            self.settle_entry(i);
        }
    }

    /// Snap a tile to the end of its settle.
    pub fn finish_settle(&mut self, key: &str) {
        if let Some(&i) = self.index.get(key) {
            self.entries[i].motion.finish();
        }
    }

    /// Advance every settle by `dt`. Returns true while anything still moves.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let mut moving = false;
        for entry in &mut self.entries {
            moving |= entry.motion.advance(dt);
        }
        moving
    }

    /// Swap in new metrics and snap every tile to its new slot.
    pub fn relayout(&mut self, metrics: GridMetrics) {
        self.table.rebuild(metrics, self.entries.len());
        for entry in &mut self.entries {
            let slot = self.table.position_for_order(entry.order);
            entry.motion.jump_to(slot);
        }
    }

    fn settle_entry(&mut self, i: usize) {
        let slot = self.table.position_for_order(self.entries[i].order);
        self.entries[i].motion.settle_to(slot, self.settle_duration);
    }

    // -----------------------------------------------------------------------
    // Reordering
    // -----------------------------------------------------------------------

    /// Move `key` to `target`, shifting everything in between one step toward
    /// the origin. Reorder-disabled items in the range keep their order and
    /// are skipped over. Returns the keys of displaced items, each already
    /// settling toward its new slot. The moved item itself is not settled.
    pub fn move_to_order(&mut self, key: &str, target: usize) -> Vec<String> {
        let Some(&active) = self.index.get(key) else {
            return Vec::new();
        };
        let from = self.entries[active].order;
        if from == target || target >= self.entries.len() {
            return Vec::new();
        }

        let by_order = self.entries_by_order();
        let mut displaced = Vec::new();
        let mut skipped = 0usize;

        if from > target {
            for order in (target..from).rev() {
                let i = by_order[order];
                if self.entries[i].item.reorder_disabled() {
                    skipped += 1;
                } else {
                    self.entries[i].order += skipped + 1;
                    skipped = 0;
                    displaced.push(i);
                }
            }
        } else {
            for order in from + 1..=target {
                let i = by_order[order];
                if self.entries[i].item.reorder_disabled() {
                    skipped += 1;
                } else {
                    self.entries[i].order -= skipped + 1;
                    skipped = 0;
                    displaced.push(i);
                }
            }
        }
        self.entries[active].order = target;

        for &i in &displaced {
            self.settle_entry(i);
        }
        debug_assert!(self.orders_are_dense(), "orders not dense after move");
        displaced
            .into_iter()
            .map(|i| self.entries[i].item.key().to_owned())
            .collect()
    }

    /// `by_order[o]` is the entry index holding order `o`.
    fn entries_by_order(&self) -> Vec<usize> {
        let mut by_order = vec![0; self.entries.len()];
        for (i, entry) in self.entries.iter().enumerate() {
            by_order[entry.order] = i;
        }
        by_order
    }

    // -----------------------------------------------------------------------
    // Reconciliation
    // -----------------------------------------------------------------------

    /// Diff against an externally supplied ordered list.
    ///
    /// Known keys take the incoming payload and, if their index differs from
    /// their order, adopt the index and settle toward the new slot (except
    /// `pinned`, the tile under the finger). New keys are placed directly at
    /// their slot. Missing keys are dropped.
    pub fn reconcile(&mut self, items: Vec<T>, pinned: Option<&str>) -> ReconcileReport {
        let span = tracing::debug_span!(
            "tilegrid.reconcile",
            incoming = items.len(),
            added = tracing::field::Empty,
            removed = tracing::field::Empty,
            moved = tracing::field::Empty,
        );
        let _guard = span.enter();

        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut incoming = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(item.key().to_owned()) {
                incoming.push(item);
            } else {
                tracing::warn!(key = item.key(), "duplicate key in item list; keeping first");
            }
        }

        let mut report = ReconcileReport::default();
        for (index, item) in incoming.into_iter().enumerate() {
            match self.index.get(item.key()) {
                Some(&i) => {
                    let entry = &mut self.entries[i];
                    if entry.order != index {
                        entry.order = index;
                        report.moved.push(item.key().to_owned());
                    }
                    entry.item = item;
                }
                None => {
                    let key = item.key().to_owned();
                    let slot = self.table.metrics().position_for_order(index);
                    self.index.insert(key.clone(), self.entries.len());
                    self.entries.push(TileEntry {
                        item,
                        order: index,
                        motion: Motion::at(slot),
                    });
                    report.added.push(key);
                }
            }
        }

        if self.entries.len() != seen.len() {
            self.entries.retain(|e| {
                let keep = seen.contains(e.item.key());
                if !keep {
                    report.removed.push(e.item.key().to_owned());
                }
                keep
            });
            self.index = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, e)| (e.item.key().to_owned(), i))
                .collect();
        }

        if !report.added.is_empty() || !report.removed.is_empty() {
            let metrics = *self.table.metrics();
            self.table.rebuild(metrics, self.entries.len());
        }

        for key in &report.moved {
            if pinned == Some(key.as_str()) {
                continue;
            }
            if let Some(&i) = self.index.get(key) {
                self.settle_entry(i);
            }
        }

        debug_assert!(self.orders_are_dense(), "orders not dense after reconcile");
        span.record("added", report.added.len());
        span.record("removed", report.removed.len());
        span.record("moved", report.moved.len());
        if !report.is_noop() {
            tracing::debug!(
                added = report.added.len(),
                removed = report.removed.len(),
                moved = report.moved.len(),
                "reconciled item list"
            );
        }
        report
    }
}
