#![forbid(unsafe_code)]

//! Core: geometry, tweening, and gesture recognition.
//!
//! # Role in tilegrid
//! `tilegrid-core` holds the leaf primitives the reorder engine is built
//! from. Nothing here knows about items, orders, or drag sessions.
//!
//! # Primary responsibilities
//! - **Geometry**: [`geometry::Point`], [`geometry::Size`], and
//!   [`geometry::Rect`] in logical pixels.
//! - **Animation**: easing curves and [`animation::Tween`] for settle and
//!   lift transitions, advanced by explicit `tick(dt)` calls.
//! - **Gesture**: [`gesture::GestureRecognizer`] turns raw pointer samples
//!   into tap / long-press / drag events with cumulative deltas.
//!
//! # How it fits in the system
//! The `tilegrid` crate consumes these types and drives a single-threaded
//! update loop. Hosts that already own a platform gesture recognizer can
//! skip [`gesture`] entirely and feed drag lifecycle messages directly.

pub mod animation;
pub mod geometry;
pub mod gesture;
