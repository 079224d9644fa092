#![forbid(unsafe_code)]

//! Edge-triggered auto-scroll while dragging.
//!
//! When the dragged tile intrudes into a trigger band at the top or bottom
//! of the viewport, a repeating timer is requested from the host. Each
//! delivered tick advances the scroll offset by a clamped step; the caller
//! moves the dragged tile by the same delta so it stays under the finger.
//!
//! # Invariants
//!
//! 1. At most one timer (one direction) is active at a time.
//! 2. The scroll offset never leaves `[0, max_offset]`.
//! 3. Ticks carrying a stale [`TimerId`] are ignored.

use std::time::Duration;

use tilegrid_core::geometry::{Point, Rect};

use crate::config::ScrollStep;

/// Distance from the content end below which the viewport counts as
/// scrolled to the bottom.
pub const END_TOLERANCE: f32 = 1.5;

/// Handle for a host-scheduled repeating timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Mirror of the scroll container's state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// Measured viewport rectangle in page coordinates.
    pub rect: Rect,
    /// Vertical scroll offset.
    pub offset: f32,
    /// Total scrollable content height.
    pub content_height: f32,
}

impl Viewport {
    /// Largest reachable scroll offset.
    #[inline]
    pub fn max_offset(&self) -> f32 {
        (self.content_height - self.rect.height).max(0.0)
    }

    #[inline]
    pub fn at_top(&self) -> bool {
        self.offset <= 0.0
    }

    #[inline]
    pub fn at_bottom(&self) -> bool {
        self.content_height - (self.offset + self.rect.height) <= END_TOLERANCE
    }

    /// Map a page point into grid-local content coordinates.
    #[inline]
    pub fn page_to_content(&self, page: Point) -> Point {
        Point::new(page.x - self.rect.x, page.y - self.rect.y + self.offset)
    }

    /// Band the tile at content-space `tile_top` (of height `tile_height`)
    /// intrudes into, if scrolling that way is still possible.
    pub fn trigger_band(&self, tile_top: f32, tile_height: f32, band: f32) -> Option<ScrollDirection> {
        let top_in_view = tile_top - self.offset;
        if top_in_view + tile_height > self.rect.height - band {
            (!self.at_bottom()).then_some(ScrollDirection::Down)
        } else if top_in_view < band {
            (!self.at_top()).then_some(ScrollDirection::Up)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// A timer start/stop request for the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRequest {
    Start { timer: TimerId, interval: Duration },
    Cancel(TimerId),
}

/// Outcome of a delivered tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Tick for a timer that is no longer active.
    Stale,
    /// Scrolled by `delta`; `stopped` carries the cancelled timer when this
    /// tick reached a boundary.
    Scrolled { delta: f32, stopped: Option<TimerId> },
    /// Condition no longer holds; timer cancelled.
    Stopped(TimerId),
}

#[derive(Debug, Clone, Copy)]
struct ActiveScroll {
    timer: TimerId,
    direction: ScrollDirection,
    ticks: u32,
}

/// Starts, steps, and stops the auto-scroll timer.
#[derive(Debug, Default)]
pub struct AutoScroller {
    active: Option<ActiveScroll>,
    next_timer: u64,
}

impl AutoScroller {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.active.map(|a| a.direction)
    }

    pub fn timer(&self) -> Option<TimerId> {
        self.active.map(|a| a.timer)
    }

    /// Re-evaluate after the dragged tile moved. Starts, switches, or stops
    /// the timer as needed.
    pub fn evaluate(
        &mut self,
        viewport: &Viewport,
        tile_top: f32,
        tile_height: f32,
        band: f32,
        interval: Duration,
    ) -> Vec<TimerRequest> {
        let wanted = viewport.trigger_band(tile_top, tile_height, band);
        let mut requests = Vec::new();
        match (self.active, wanted) {
            (Some(active), Some(direction)) if active.direction == direction => {}
            (Some(_), _) => {
                requests.extend(self.stop());
                if let Some(direction) = wanted {
                    requests.push(self.start(direction, interval));
                }
            }
            (None, Some(direction)) => requests.push(self.start(direction, interval)),
            (None, None) => {}
        }
        requests
    }

    /// Handle a delivered tick for `timer`.
    pub fn tick(
        &mut self,
        timer: TimerId,
        viewport: &Viewport,
        tile_top: f32,
        tile_height: f32,
        band: f32,
        steps: &ScrollStep,
    ) -> TickOutcome {
        let Some(active) = self.active.as_mut() else {
            return TickOutcome::Stale;
        };
        if active.timer != timer {
            return TickOutcome::Stale;
        }
        if viewport.trigger_band(tile_top, tile_height, band) != Some(active.direction) {
            let stopped = active.timer;
            self.active = None;
            tracing::debug!(timer = stopped.raw(), "auto-scroll left trigger band");
            return TickOutcome::Stopped(stopped);
        }

        let raw = steps.step(active.ticks);
        active.ticks = active.ticks.saturating_add(1);
        let delta = match active.direction {
            ScrollDirection::Down => raw.min(viewport.max_offset() - viewport.offset).max(0.0),
            ScrollDirection::Up => -raw.min(viewport.offset).max(0.0),
        };

        let after = Viewport {
            offset: viewport.offset + delta,
            ..*viewport
        };
        let boundary = match active.direction {
            ScrollDirection::Down => after.at_bottom(),
            ScrollDirection::Up => after.at_top(),
        };
        if delta == 0.0 || boundary {
            let stopped = active.timer;
            self.active = None;
            tracing::debug!(timer = stopped.raw(), offset = after.offset, "auto-scroll hit boundary");
            if delta == 0.0 {
                return TickOutcome::Stopped(stopped);
            }
            return TickOutcome::Scrolled {
                delta,
                stopped: Some(stopped),
            };
        }
        TickOutcome::Scrolled {
            delta,
            stopped: None,
        }
    }

    /// Cancel any active timer.
    pub fn stop(&mut self) -> Option<TimerRequest> {
        self.active.take().map(|a| {
            tracing::debug!(timer = a.timer.raw(), ticks = a.ticks, "auto-scroll stopped");
            TimerRequest::Cancel(a.timer)
        })
    }

    fn start(&mut self, direction: ScrollDirection, interval: Duration) -> TimerRequest {
        self.next_timer += 1;
        let timer = TimerId(self.next_timer);
        self.active = Some(ActiveScroll {
            timer,
            direction,
            ticks: 0,
        });
        tracing::debug!(timer = timer.raw(), ?direction, "auto-scroll started");
        TimerRequest::Start { timer, interval }
    }
}
