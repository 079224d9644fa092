#![forbid(unsafe_code)]

//! Live on-screen position of a single tile.

use std::time::Duration;

use tilegrid_core::animation::{Animation, Tween};
use tilegrid_core::geometry::Point;

/// Where a tile is drawn right now, and where it is heading.
///
/// A tile is either resting at a point or settling toward one. Jumping
/// cancels any settle in flight.
#[derive(Debug, Clone)]
pub struct Motion {
    resting: Point,
    settle: Option<Tween<Point>>,
}

impl Motion {
    #[must_use]
    pub fn at(position: Point) -> Self {
        Self {
            resting: position,
            settle: None,
        }
    }

    /// Current drawn position.
    pub fn position(&self) -> Point {
        self.settle.as_ref().map_or(self.resting, Tween::current)
    }

    /// Final position once any settle completes.
    pub fn destination(&self) -> Point {
        self.settle.as_ref().map_or(self.resting, Tween::target)
    }

    #[inline]
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Place the tile immediately.
    pub fn jump_to(&mut self, position: Point) {
        self.settle = None;
        self.resting = position;
    }

    /// Animate from the current drawn position to `target`.
    pub fn settle_to(&mut self, target: Point, duration: Duration) {
        let from = self.position();
        self.resting = target;
        self.settle = Some(Tween::new(from, target, duration))
            .filter(|tween| from != target && !tween.is_complete());
    }

    /// Advance any settle by `dt`. Returns true while still moving.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if let Some(tween) = self.settle.as_mut() {
            tween.tick(dt);
            if tween.is_complete() {
                self.settle = None;
            }
        }
        self.settle.is_some()
    }

    /// Skip to the end of any settle.
    pub fn finish(&mut self) {
        self.settle = None;
    }
}
