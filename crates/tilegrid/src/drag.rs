#![forbid(unsafe_code)]

//! Active-drag state machine and nearest-slot re-ranking.
//!
//! ```text
//! Idle ──grab──▶ Armed ──begin/track──▶ Dragging ──release──▶ Settling ──▶ Idle
//!   ▲              │                       │
//!   └────abort─────┴───────────────────────┘
//! ```
//!
//! Pointer samples arrive in page coordinates. At grab time the controller
//! stores `slot - pointer`, so adding that offset to any later pointer
//! yields the tile's grid-local top-left. Auto-scroll adds its cumulative
//! delta on top as scroll compensation.
//!
//! # Invariants
//!
//! 1. A [`DragSession`] exists exactly in `Armed` and `Dragging`.
//! 2. Orders change only through [`Registry::move_to_order`].
//! 3. The dragged tile's x never leaves `[0, grid_width - tile_width]`.
//!
//! # Failure Modes
//!
//! Track or release without a session is a no-op. Grabbing a missing or
//! drag-disabled key is ignored.

use std::time::Duration;

use tilegrid_core::animation::{Animation, Tween};
use tilegrid_core::geometry::Point;

use crate::registry::{GridItem, Registry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Grabbed by a long press; no movement yet.
    Armed,
    Dragging,
    /// Released; the tile is animating into its slot.
    Settling,
}

/// State of one grab-to-release interaction.
#[derive(Debug, Clone)]
pub struct DragSession {
    key: String,
    grab_offset: Point,
    scroll_compensation: f32,
    tracked: Point,
    lift: Tween<f32>,
}

impl DragSession {
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// `slot - pointer` captured at grab.
    #[inline]
    pub fn grab_offset(&self) -> Point {
        self.grab_offset
    }

    /// Total auto-scroll travel applied since grab.
    #[inline]
    pub fn scroll_compensation(&self) -> f32 {
        self.scroll_compensation
    }

    /// Latest intended tile top-left, grid-local.
    #[inline]
    pub fn tracked(&self) -> Point {
        self.tracked
    }

    /// Lift progress in `[0, 1]`.
    #[inline]
    pub fn lift_progress(&self) -> f32 {
        self.lift.current()
    }
}

/// A committed re-rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rerank {
    pub from: usize,
    pub to: usize,
    pub displaced: Vec<String>,
}

/// Drives one drag at a time against a [`Registry`].
#[derive(Debug, Default)]
pub struct DragController {
    phase: DragPhase,
    session: Option<DragSession>,
    settling: Option<String>,
}

impl DragController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    #[inline]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Key under the finger (`Armed`/`Dragging`).
    pub fn dragged_key(&self) -> Option<&str> {
        self.session.as_ref().map(DragSession::key)
    }

    /// Key animating into its slot after release.
    pub fn settling_key(&self) -> Option<&str> {
        self.settling.as_deref()
    }

    /// Whether a pointer currently holds a tile.
    #[inline]
    pub fn is_holding(&self) -> bool {
        matches!(self.phase, DragPhase::Armed | DragPhase::Dragging)
    }

    /// Pick up `key` with the pointer at `pointer` (page coordinates).
    ///
    /// Returns false when the grab is rejected. A tile still settling from
    /// a previous drag is snapped home first.
    pub fn grab<T: GridItem>(
        &mut self,
        registry: &mut Registry<T>,
        key: &str,
        pointer: Point,
        lift_duration: Duration,
    ) -> bool {
        if self.is_holding() {
            tracing::trace!(key, "grab ignored; drag already active");
            return false;
        }
        let Some(entry) = registry.get(key) else {
            tracing::trace!(key, "grab ignored; unknown key");
            return false;
        };
        if entry.item().drag_disabled() {
            tracing::trace!(key, "grab ignored; drag disabled");
            return false;
        }
        let slot = registry.position_for_order(entry.order());
        if let Some(previous) = self.settling.take() {
            registry.finish_settle(&previous);
        }

        registry.jump(key, slot);
        self.session = Some(DragSession {
            key: key.to_owned(),
            grab_offset: slot - pointer,
            scroll_compensation: 0.0,
            tracked: slot,
            lift: Tween::new(0.0, 1.0, lift_duration),
        });
        self.phase = DragPhase::Armed;
        tracing::debug!(key, ?slot, "drag grabbed");
        true
    }

    /// The pan gesture was granted: recapture the offset from the gesture
    /// origin and enter `Dragging`.
    pub fn begin(&mut self, origin: Point) {
        if let Some(session) = self.session.as_mut() {
            session.grab_offset = session.tracked.offset(0.0, -session.scroll_compensation) - origin;
            self.phase = DragPhase::Dragging;
        }
    }

    /// Move the dragged tile under `pointer` and re-rank if a neighbour
    /// slot is now closer.
    pub fn track<T: GridItem>(&mut self, registry: &mut Registry<T>, pointer: Point) -> Option<Rerank> {
        let session = self.session.as_mut()?;
        self.phase = DragPhase::Dragging;
        let raw = pointer + session.grab_offset;
        session.tracked = clamp_x(registry, raw.offset(0.0, session.scroll_compensation));
        self.place(registry)
    }

    /// Shift the dragged tile by an auto-scroll step and re-rank.
    pub fn compensate<T: GridItem>(&mut self, registry: &mut Registry<T>, delta: f32) -> Option<Rerank> {
        let session = self.session.as_mut()?;
        session.scroll_compensation += delta;
        session.tracked = session.tracked.offset(0.0, delta);
        self.place(registry)
    }

    /// Advance the lift animation.
    pub fn tick_lift(&mut self, dt: Duration) {
        if let Some(session) = self.session.as_mut() {
            session.lift.tick(dt);
        }
    }

    /// Drop the tile: it settles from where it was drawn to its slot.
    /// Returns the released key.
    pub fn release<T: GridItem>(&mut self, registry: &mut Registry<T>) -> Option<String> {
        let session = self.session.take()?;
        registry.settle(&session.key);
        let settling = registry
            .get(&session.key)
            .is_some_and(|e| e.motion().is_settling());
        self.phase = if settling {
            self.settling = Some(session.key.clone());
            DragPhase::Settling
        } else {
            DragPhase::Idle
        };
        tracing::debug!(
            key = session.key.as_str(),
            order = registry.order_of(&session.key),
            "drag released"
        );
        Some(session.key)
    }

    /// End the drag without a release. The tile settles if it still exists.
    pub fn abort<T: GridItem>(&mut self, registry: &mut Registry<T>) -> Option<String> {
        let session = self.session.take()?;
        registry.settle(&session.key);
        self.phase = DragPhase::Idle;
        Some(session.key)
    }

    /// Leave `Settling` once the released tile has landed.
    pub fn poll_settled<T: GridItem>(&mut self, registry: &Registry<T>) {
        if self.phase != DragPhase::Settling {
            return;
        }
        let landed = self
            .settling
            .as_deref()
            .and_then(|key| registry.get(key))
            .is_none_or(|e| !e.motion().is_settling());
        if landed {
            self.settling = None;
            self.phase = DragPhase::Idle;
        }
    }

    fn place<T: GridItem>(&self, registry: &mut Registry<T>) -> Option<Rerank> {
        let session = self.session.as_ref()?;
        registry.jump(&session.key, session.tracked);
        let target = nearest_slot(registry, &session.key, session.tracked)?;
        let from = registry.order_of(&session.key)?;
        let displaced = registry.move_to_order(&session.key, target);
        tracing::debug!(
            key = session.key.as_str(),
            from,
            to = target,
            displaced = displaced.len(),
            "re-ranked"
        );
        Some(Rerank {
            from,
            to: target,
            displaced,
        })
    }
}

fn clamp_x<T: GridItem>(registry: &Registry<T>, p: Point) -> Point {
    let metrics = registry.metrics();
    let max_x = (metrics.grid_width() - metrics.tile().width).max(0.0);
    Point::new(p.x.clamp(0.0, max_x), p.y)
}

/// Order the dragged tile at `tile` (grid-local top-left) should take, if
/// it differs from its current one.
///
/// A candidate must be strictly closer than the tile's own slot and
/// strictly closer than one tile width. Reorder-disabled items are never
/// candidates, and a reorder-disabled dragged tile never moves.
pub fn nearest_slot<T: GridItem>(registry: &Registry<T>, key: &str, tile: Point) -> Option<usize> {
    let dragged = registry.get(key)?;
    if dragged.item().reorder_disabled() {
        return None;
    }
    let own = registry.position_for_order(dragged.order());
    let reach = registry.metrics().tile().width;
    let mut best = tile.distance(own);
    let mut target = None;
    for entry in registry.entries() {
        if entry.key() == key || entry.item().reorder_disabled() {
            continue;
        }
        let d = tile.distance(registry.position_for_order(entry.order()));
        if d < best && d < reach {
            best = d;
            target = Some(entry.order());
        }
    }
    target
}
