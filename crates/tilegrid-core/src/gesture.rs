#![forbid(unsafe_code)]

//! Gesture recognition: turns raw pointer samples into press and drag events.
//!
//! [`GestureRecognizer`] is a stateful processor that converts a single
//! pointer's down / move / up / cancel stream into [`GestureEvent`]s that a
//! reorderable grid cares about: taps, long presses, and the drag lifecycle
//! that follows a long press.
//!
//! # State Machine
//!
//! ```text
//!   Down ──► Pending ──(held ≥ threshold within slop)──► LongPressed
//!               │                                            │ first Move
//!               │ Move beyond slop                           ▼
//!               ▼                                         Dragging
//!           Abandoned (the press belongs to the scroll container)
//! ```
//!
//! # Invariants
//!
//! 1. A single down → up interaction produces at most one of `Tap` or
//!    `DragEnd`, never both.
//! 2. `DragStart` is always followed by a `DragMove` for the same sample,
//!    so the first movement is never lost.
//! 3. Snapshot deltas are cumulative from the press origin, not per sample.
//! 4. After `reset()`, the recognizer is idle.
//!
//! # Failure Modes
//!
//! - A `Move` or `Up` without a prior `Down` is ignored.
//! - `check_long_press` is clock-free: callers pass `now`, so a host that
//!   never polls simply never produces a long press.

use std::time::{Duration, Instant};

use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds for gesture recognition.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Hold duration before a stationary press becomes a long press (default: 500ms).
    pub long_press_threshold: Duration,
    /// Maximum pointer travel (px) tolerated before the long press fires (default: 10).
    pub slop: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            long_press_threshold: Duration::from_millis(500),
            slop: 10.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A raw pointer sample in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    /// The platform took the pointer away (e.g. a system gesture).
    Cancel,
}

/// Accumulated gesture state, shaped after the classic pan-responder record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureSnapshot {
    /// Page x of the press origin.
    pub x0: f32,
    /// Page y of the press origin.
    pub y0: f32,
    /// Latest page x.
    pub move_x: f32,
    /// Latest page y.
    pub move_y: f32,
    /// Cumulative x travel since the press origin.
    pub dx: f32,
    /// Cumulative y travel since the press origin.
    pub dy: f32,
}

impl GestureSnapshot {
    /// Snapshot with the pointer still at its origin.
    #[must_use]
    pub fn at(origin: Point) -> Self {
        Self::between(origin, origin)
    }

    /// Snapshot for a pointer that travelled from `origin` to `current`.
    #[must_use]
    pub fn between(origin: Point, current: Point) -> Self {
        Self {
            x0: origin.x,
            y0: origin.y,
            move_x: current.x,
            move_y: current.y,
            dx: current.x - origin.x,
            dy: current.y - origin.y,
        }
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    #[inline]
    pub fn current(&self) -> Point {
        Point::new(self.move_x, self.move_y)
    }
}

/// High-level gesture produced by the recognizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Short press released within slop.
    Tap { pos: Point },
    /// Press held stationary past the threshold; a drag may follow.
    LongPress { pos: Point },
    DragStart(GestureSnapshot),
    DragMove(GestureSnapshot),
    /// Pointer released after a long press, whether or not it moved.
    DragEnd(GestureSnapshot),
    DragCancel,
}

// ---------------------------------------------------------------------------
// Internal state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressPhase {
    Pending,
    LongPressed,
    Dragging,
    Abandoned,
}

#[derive(Debug, Clone)]
struct PressTracker {
    origin: Point,
    down_at: Instant,
    phase: PressPhase,
}

// ---------------------------------------------------------------------------
// GestureRecognizer
// ---------------------------------------------------------------------------

/// Stateful single-pointer gesture recognizer.
///
/// Call [`process`](GestureRecognizer::process) for each pointer sample and
/// [`check_long_press`](GestureRecognizer::check_long_press) on a timer tick.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    config: GestureConfig,
    press: Option<PressTracker>,
}

impl GestureRecognizer {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            press: None,
        }
    }

    /// Process a pointer sample, returning any gestures produced.
    pub fn process(&mut self, event: &PointerEvent, now: Instant) -> Vec<GestureEvent> {
        let mut out = Vec::with_capacity(2);
        match *event {
            PointerEvent::Down(pos) => {
                self.press = Some(PressTracker {
                    origin: pos,
                    down_at: now,
                    phase: PressPhase::Pending,
                });
            }
            PointerEvent::Move(pos) => self.on_move(pos, now, &mut out),
            PointerEvent::Up(pos) => self.on_up(pos, &mut out),
            PointerEvent::Cancel => {
                if let Some(press) = self.press.take()
                    && matches!(press.phase, PressPhase::LongPressed | PressPhase::Dragging)
                {
                    out.push(GestureEvent::DragCancel);
                }
            }
        }
        out
    }

    /// Fire a long press if the pointer has been held past the threshold.
    pub fn check_long_press(&mut self, now: Instant) -> Option<GestureEvent> {
        let threshold = self.config.long_press_threshold;
        let press = self.press.as_mut()?;
        if press.phase != PressPhase::Pending {
            return None;
        }
        if now.saturating_duration_since(press.down_at) < threshold {
            return None;
        }
        press.phase = PressPhase::LongPressed;
        #[cfg(feature = "tracing")]
        tracing::trace!(x = press.origin.x, y = press.origin.y, "long press recognized");
        Some(GestureEvent::LongPress { pos: press.origin })
    }

    /// Whether a post-long-press drag is in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.press
            .as_ref()
            .is_some_and(|p| p.phase == PressPhase::Dragging)
    }

    /// Reset to idle without emitting anything.
    pub fn reset(&mut self) {
        self.press = None;
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Internal event handlers
// ---------------------------------------------------------------------------

impl GestureRecognizer {
    fn on_move(&mut self, pos: Point, now: Instant, out: &mut Vec<GestureEvent>) {
        // A held press may have crossed the threshold between polls.
        if let Some(event) = self.check_long_press(now) {
            out.push(event);
        }
        let slop = self.config.slop;
        let Some(press) = self.press.as_mut() else {
            return;
        };

        match press.phase {
            PressPhase::Pending => {
                if press.origin.distance(pos) > slop {
                    press.phase = PressPhase::Abandoned;
                }
            }
            PressPhase::LongPressed => {
                press.phase = PressPhase::Dragging;
                out.push(GestureEvent::DragStart(GestureSnapshot::at(press.origin)));
                out.push(GestureEvent::DragMove(GestureSnapshot::between(
                    press.origin,
                    pos,
                )));
            }
            PressPhase::Dragging => {
                out.push(GestureEvent::DragMove(GestureSnapshot::between(
                    press.origin,
                    pos,
                )));
            }
            PressPhase::Abandoned => {}
        }
    }

    fn on_up(&mut self, pos: Point, out: &mut Vec<GestureEvent>) {
        let Some(press) = self.press.take() else {
            return;
        };
        match press.phase {
            PressPhase::Pending => {
                if press.origin.distance(pos) <= self.config.slop {
                    out.push(GestureEvent::Tap { pos: press.origin });
                }
            }
            PressPhase::LongPressed | PressPhase::Dragging => {
                out.push(GestureEvent::DragEnd(GestureSnapshot::between(
                    press.origin,
                    pos,
                )));
            }
            PressPhase::Abandoned => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
