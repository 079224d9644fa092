#![forbid(unsafe_code)]

//! Reorderable tile-grid engine.
//!
//! Items are laid row-major into a fixed number of columns. A long press
//! picks up a tile; while it is dragged the engine re-ranks it against its
//! nearest neighbour, auto-scrolls the viewport near its edges, and on
//! release commits the new order and settles every displaced tile into its
//! slot.
//!
//! The engine owns no clock, scroll container, or renderer. Drive it with
//! [`GridMsg`]s and carry out the returned [`Effect`]s:
//!
//! ```rust,ignore
//! let mut grid = TileGrid::new(GridConfig::new(3))?;
//! grid.update(GridMsg::Layout(rect));
//! grid.update(GridMsg::SetItems(items));
//! for effect in grid.update(GridMsg::LongPress { key, pointer }) {
//!     host.apply(effect);
//! }
//! ```

pub mod autoscroll;
pub mod config;
pub mod drag;
pub mod grid;
pub mod layout;
pub mod motion;
pub mod registry;

pub use autoscroll::{ScrollDirection, TimerId, Viewport};
pub use config::{DragEmphasis, GridConfig, GridConfigError, ScrollStep, StepFn};
pub use drag::{DragPhase, DragSession};
pub use grid::{Effect, GridMsg, TileGrid, TileView};
pub use layout::{GridMetrics, PositionTable};
pub use registry::{GridItem, ReconcileReport, Registry};

pub use tilegrid_core::geometry::{Point, Rect, Size};
pub use tilegrid_core::gesture::{
    GestureConfig, GestureEvent, GestureRecognizer, GestureSnapshot, PointerEvent,
};
