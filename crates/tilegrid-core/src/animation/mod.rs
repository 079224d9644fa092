#![forbid(unsafe_code)]

//! Time-driven animation primitives.
//!
//! Animations here never read a clock. The owner advances them with
//! [`Animation::tick`] from whatever frame source it has, which keeps every
//! transition deterministic under test.
//!
//! # Invariants
//!
//! 1. `value()` is normalized progress in [0.0, 1.0].
//! 2. Once `is_complete()` is true, further ticks do not change state.
//! 3. Easing functions map 0.0 → 0.0 and 1.0 → 1.0.

use std::time::Duration;

mod tween;

pub use tween::{Lerp, Tween};

/// An easing curve over normalized time.
pub type EasingFn = fn(f32) -> f32;

/// A time-driven animation.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Normalized progress (after easing) in [0.0, 1.0].
    fn value(&self) -> f32;

    /// Rewind to the start.
    fn reset(&mut self);
}

#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-in-out; the default curve for timed tile transitions.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}
