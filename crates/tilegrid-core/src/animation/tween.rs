#![forbid(unsafe_code)]

//! Fixed-duration interpolation between two values.

use std::time::Duration;

use super::{Animation, EasingFn, ease_in_out};
use crate::geometry::Point;

/// Values a [`Tween`] can interpolate.
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Point {
    #[inline]
    fn lerp(self, to: Self, t: f32) -> Self {
        Point::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
    }
}

/// Interpolates from `from` to `to` over `duration`.
///
/// A completed tween reports exactly `to`, never an eased approximation of
/// it. A zero duration is complete on construction.
#[derive(Debug, Clone, Copy)]
pub struct Tween<V: Lerp> {
    from: V,
    to: V,
    duration: Duration,
    elapsed: Duration,
    easing: EasingFn,
}

impl<V: Lerp> Tween<V> {
    #[must_use]
    pub fn new(from: V, to: V, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing: ease_in_out,
        }
    }

    /// Set the easing curve (builder pattern).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Interpolated value at the current time.
    pub fn current(&self) -> V {
        if self.is_complete() {
            self.to
        } else {
            self.from.lerp(self.to, self.value())
        }
    }

    #[inline]
    pub fn target(&self) -> V {
        self.to
    }

    /// Jump to the end.
    pub fn finish(&mut self) {
        self.elapsed = self.duration;
    }
}

impl<V: Lerp> Animation for Tween<V> {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f32() / self.duration.as_secs_f32();
        (self.easing)(t)
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}
