#![forbid(unsafe_code)]

//! The [`TileGrid`] engine: messages in, effects out.
//!
//! The host forwards layout, item lists, gestures, scroll reports, timer
//! ticks, and frame deltas as [`GridMsg`]s. Each message is processed to
//! completion and returns the [`Effect`]s the host must carry out: listener
//! notifications, scroll commands, and timer requests.
//!
//! Nothing is reconciled or rendered until the first layout arrives. Item
//! lists set before that are held and applied on layout.
//!
//! # Coordinates
//!
//! Pointers and layout rectangles are page coordinates. Tile positions in
//! [`TileView`] are grid-local; the host offsets them by its own origin.

use std::time::Duration;

use tilegrid_core::geometry::{Point, Rect, Size};
use tilegrid_core::gesture::{GestureEvent, GestureSnapshot};

use crate::autoscroll::{AutoScroller, TickOutcome, TimerId, TimerRequest, Viewport};
use crate::config::{DragEmphasis, GridConfig, GridConfigError};
use crate::drag::{DragController, DragPhase};
use crate::layout::GridMetrics;
use crate::registry::{GridItem, Registry};

/// z-order of the tile under the finger.
pub const ACTIVE_Z_INDEX: i32 = 3;
/// z-order of a released tile still flying home.
pub const SETTLING_Z_INDEX: i32 = 2;

// ---------------------------------------------------------------------------
// Messages and effects
// ---------------------------------------------------------------------------

/// Inbound events.
#[derive(Debug, Clone)]
pub enum GridMsg<T> {
    /// The grid's viewport was measured. Only the first one is accepted.
    Layout(Rect),
    /// Replace the item list; diffed against the current one.
    SetItems(Vec<T>),
    /// A short press on a tile.
    Press { key: String },
    /// A long press on a tile: grab it for dragging.
    LongPress { key: String, pointer: Point },
    /// The pan gesture following a long press was granted.
    GestureStart(GestureSnapshot),
    GestureMove(GestureSnapshot),
    /// Pointer lifted or gesture terminated.
    GestureEnd,
    /// The scroll container reports its offset.
    ExternalScroll(f32),
    /// A repeating timer requested via [`Effect::StartTimer`] fired.
    AutoScrollTick(TimerId),
    /// Animation frame with the time since the previous one.
    Frame(Duration),
}

/// Outbound commands and notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<T> {
    ItemPressed(T),
    DragStarted(T),
    Dragging(GestureSnapshot),
    /// The dragged tile re-ranked; payloads in their new order.
    OrderChanged(Vec<T>),
    /// Drag finished; payloads in their final order.
    DragReleased(Vec<T>),
    ScrollTo { offset: f32 },
    SetScrollEnabled(bool),
    StartTimer { timer: TimerId, interval: Duration },
    CancelTimer(TimerId),
    ContentHeightChanged(f32),
}

impl<T> From<TimerRequest> for Effect<T> {
    fn from(request: TimerRequest) -> Self {
        match request {
            TimerRequest::Start { timer, interval } => Effect::StartTimer { timer, interval },
            TimerRequest::Cancel(timer) => Effect::CancelTimer(timer),
        }
    }
}

/// Render descriptor for one tile.
#[derive(Debug, Clone, PartialEq)]
pub struct TileView<'a, T> {
    pub key: &'a str,
    pub item: &'a T,
    pub order: usize,
    /// Drawn rectangle, grid-local.
    pub rect: Rect,
    pub z_index: i32,
    /// Lift styling while the tile is held.
    pub emphasis: Option<DragEmphasis>,
}

// ---------------------------------------------------------------------------
// TileGrid
// ---------------------------------------------------------------------------

/// Reorderable tile grid engine.
#[derive(Debug)]
pub struct TileGrid<T> {
    config: GridConfig,
    registry: Registry<T>,
    drag: DragController,
    scroller: AutoScroller,
    viewport: Viewport,
    measured: bool,
    pending: Option<Vec<T>>,
    reported_height: Option<f32>,
}

impl<T: GridItem> TileGrid<T> {
    /// Build an unmeasured grid.
    pub fn new(config: GridConfig) -> Result<Self, GridConfigError> {
        config.check()?;
        let metrics = GridMetrics::new(config.num_columns, Size::default());
        Ok(Self {
            registry: Registry::new(metrics, config.settle_duration_value()),
            config,
            drag: DragController::new(),
            scroller: AutoScroller::new(),
            viewport: Viewport::default(),
            measured: false,
            pending: None,
            reported_height: None,
        })
    }

    #[inline]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    #[inline]
    pub fn is_measured(&self) -> bool {
        self.measured
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn metrics(&self) -> &GridMetrics {
        self.registry.metrics()
    }

    #[inline]
    pub fn registry(&self) -> &Registry<T> {
        &self.registry
    }

    #[inline]
    pub fn phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn dragged_key(&self) -> Option<&str> {
        self.drag.dragged_key()
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.scroller.is_active()
    }

    pub fn order_of(&self, key: &str) -> Option<usize> {
        self.registry.order_of(key)
    }

    /// Payloads in logical order.
    pub fn items_by_order(&self) -> Vec<T> {
        self.registry.snapshot_by_order()
    }

    /// Whether a [`GridMsg::Frame`] would change anything.
    pub fn needs_frame(&self) -> bool {
        self.registry.is_animating()
            || self
                .drag
                .session()
                .is_some_and(|s| s.lift_progress() < 1.0)
    }

    /// Process one message to completion.
    pub fn update(&mut self, msg: GridMsg<T>) -> Vec<Effect<T>> {
        match msg {
            GridMsg::Layout(rect) => self.on_layout(rect),
            GridMsg::SetItems(items) => self.set_items(items),
            GridMsg::Press { key } => self.press(&key),
            GridMsg::LongPress { key, pointer } => self.long_press(&key, pointer),
            GridMsg::GestureStart(snapshot) => self.gesture_start(snapshot),
            GridMsg::GestureMove(snapshot) => self.gesture_move(snapshot),
            GridMsg::GestureEnd => self.gesture_end(),
            GridMsg::ExternalScroll(offset) => {
                self.external_scroll(offset);
                Vec::new()
            }
            GridMsg::AutoScrollTick(timer) => self.auto_scroll_tick(timer),
            GridMsg::Frame(dt) => {
                self.frame(dt);
                Vec::new()
            }
        }
    }

    /// Route a recognizer event, hit-testing press positions to tiles.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Vec<Effect<T>> {
        match event {
            GestureEvent::Tap { pos } => match self.tile_at(pos).map(str::to_owned) {
                Some(key) => self.press(&key),
                None => Vec::new(),
            },
            GestureEvent::LongPress { pos } => match self.tile_at(pos).map(str::to_owned) {
                Some(key) => self.long_press(&key, pos),
                None => Vec::new(),
            },
            GestureEvent::DragStart(snapshot) => self.gesture_start(snapshot),
            GestureEvent::DragMove(snapshot) => self.gesture_move(snapshot),
            GestureEvent::DragEnd(_) | GestureEvent::DragCancel => self.gesture_end(),
        }
    }

    // -----------------------------------------------------------------------
    // Layout and items
    // -----------------------------------------------------------------------

    pub fn on_layout(&mut self, rect: Rect) -> Vec<Effect<T>> {
        if self.measured {
            tracing::trace!(?rect, "layout ignored; already measured");
            return Vec::new();
        }
        let rect = rect.translate(self.config.layout_offset);
        let metrics = GridMetrics::measure(rect.width, self.config.num_columns, self.config.item_height);
        self.registry.relayout(metrics);
        self.viewport.rect = rect;
        self.measured = true;
        tracing::debug!(?rect, tile = ?metrics.tile(), "grid measured");

        let mut effects = match self.pending.take() {
            Some(items) => self.set_items(items),
            None => Vec::new(),
        };
        self.sync_content_height(&mut effects);
        effects
    }

    pub fn set_items(&mut self, items: Vec<T>) -> Vec<Effect<T>> {
        if !self.measured {
            self.pending = Some(items);
            return Vec::new();
        }
        let pinned = self.drag.dragged_key().map(str::to_owned);
        self.registry.reconcile(items, pinned.as_deref());

        let mut effects = Vec::new();
        if let Some(key) = pinned
            && !self.registry.contains(&key)
        {
            tracing::warn!(key = key.as_str(), "dragged item removed; drag aborted");
            effects.extend(self.scroller.stop().map(Effect::from));
            self.drag.abort(&mut self.registry);
            effects.push(Effect::SetScrollEnabled(true));
        }
        self.drag.poll_settled(&self.registry);
        self.sync_content_height(&mut effects);
        effects
    }

    fn sync_content_height(&mut self, effects: &mut Vec<Effect<T>>) {
        if !self.measured {
            return;
        }
        let height = self.registry.metrics().content_height(self.registry.len());
        self.viewport.content_height = height;
        self.viewport.offset = self.viewport.offset.min(self.viewport.max_offset());
        if self.reported_height != Some(height) {
            self.reported_height = Some(height);
            effects.push(Effect::ContentHeightChanged(height));
        }
    }

    // -----------------------------------------------------------------------
    // Gestures
    // -----------------------------------------------------------------------

    pub fn press(&mut self, key: &str) -> Vec<Effect<T>> {
        if self.drag.dragged_key() == Some(key) {
            return Vec::new();
        }
        self.registry
            .get(key)
            .map(|e| vec![Effect::ItemPressed(e.item().clone())])
            .unwrap_or_default()
    }

    pub fn long_press(&mut self, key: &str, pointer: Point) -> Vec<Effect<T>> {
        if !self.measured {
            return Vec::new();
        }
        let lift = self.config.emphasis_duration();
        if !self.drag.grab(&mut self.registry, key, pointer, lift) {
            return Vec::new();
        }
        let mut effects = vec![Effect::SetScrollEnabled(false)];
        if let Some(entry) = self.registry.get(key) {
            effects.push(Effect::DragStarted(entry.item().clone()));
        }
        effects
    }

    pub fn gesture_start(&mut self, snapshot: GestureSnapshot) -> Vec<Effect<T>> {
        if !self.drag.is_holding() {
            return Vec::new();
        }
        self.drag.begin(snapshot.origin());
        let mut effects = Vec::new();
        self.follow(snapshot, &mut effects);
        effects
    }

    pub fn gesture_move(&mut self, snapshot: GestureSnapshot) -> Vec<Effect<T>> {
        if !self.drag.is_holding() {
            return Vec::new();
        }
        let mut effects = vec![Effect::Dragging(snapshot)];
        self.follow(snapshot, &mut effects);
        effects
    }

    /// Move the held tile under the pointer, re-ranking and auto-scrolling.
    fn follow(&mut self, snapshot: GestureSnapshot, effects: &mut Vec<Effect<T>>) {
        if self.drag.track(&mut self.registry, snapshot.current()).is_some() {
            effects.push(Effect::OrderChanged(self.registry.snapshot_by_order()));
        }
        if let Some(session) = self.drag.session() {
            let requests = self.scroller.evaluate(
                &self.viewport,
                session.tracked().y,
                self.registry.metrics().tile().height,
                self.config.scroll_area_size,
                self.config.scroll_interval_duration(),
            );
            effects.extend(requests.into_iter().map(Effect::from));
        }
    }

    pub fn gesture_end(&mut self) -> Vec<Effect<T>> {
        if !self.drag.is_holding() {
            return Vec::new();
        }
        let mut effects: Vec<Effect<T>> = self.scroller.stop().map(Effect::from).into_iter().collect();
        self.drag.release(&mut self.registry);
        effects.push(Effect::DragReleased(self.registry.snapshot_by_order()));
        effects.push(Effect::SetScrollEnabled(true));
        effects
    }

    // -----------------------------------------------------------------------
    // Scroll, timers, frames
    // -----------------------------------------------------------------------

    /// Mirror the container's offset, clamped to the scrollable range.
    /// Ignored while a tile is held: the auto-scroller owns the offset then.
    pub fn external_scroll(&mut self, offset: f32) {
        if self.drag.is_holding() {
            tracing::trace!(offset, "external scroll ignored during drag");
            return;
        }
        self.viewport.offset = offset.clamp(0.0, self.viewport.max_offset());
    }

    pub fn auto_scroll_tick(&mut self, timer: TimerId) -> Vec<Effect<T>> {
        let Some(tile_top) = self.drag.session().map(|s| s.tracked().y) else {
            tracing::trace!(timer = timer.raw(), "tick ignored; no drag");
            return Vec::new();
        };
        let outcome = self.scroller.tick(
            timer,
            &self.viewport,
            tile_top,
            self.registry.metrics().tile().height,
            self.config.scroll_area_size,
            &self.config.scroll_step,
        );
        match outcome {
            TickOutcome::Stale => {
                tracing::trace!(timer = timer.raw(), "stale auto-scroll tick ignored");
                Vec::new()
            }
            TickOutcome::Stopped(stopped) => vec![Effect::CancelTimer(stopped)],
            TickOutcome::Scrolled { delta, stopped } => {
                self.viewport.offset += delta;
                let mut effects = Vec::new();
                if self.drag.compensate(&mut self.registry, delta).is_some() {
                    effects.push(Effect::OrderChanged(self.registry.snapshot_by_order()));
                }
                effects.push(Effect::ScrollTo {
                    offset: self.viewport.offset,
                });
                effects.extend(stopped.map(Effect::CancelTimer));
                effects
            }
        }
    }

    /// Advance settle and lift animations by `dt`.
    pub fn frame(&mut self, dt: Duration) {
        self.registry.advance(dt);
        self.drag.tick_lift(dt);
        self.drag.poll_settled(&self.registry);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Key of the tile under a page point.
    pub fn tile_at(&self, page: Point) -> Option<&str> {
        if !self.measured {
            return None;
        }
        let local = self.viewport.page_to_content(page);
        let order = self.registry.metrics().order_at(local, self.registry.len())?;
        self.registry.key_at_order(order)
    }

    /// Render descriptors in insertion order. Empty before measurement.
    pub fn tiles(&self) -> Vec<TileView<'_, T>> {
        if !self.measured {
            return Vec::new();
        }
        let tile = self.registry.metrics().tile();
        let dragged = self.drag.dragged_key();
        let settling = self.drag.settling_key();
        self.registry
            .entries()
            .map(|entry| {
                let key = entry.key();
                let active = dragged == Some(key);
                let z_index = if active {
                    ACTIVE_Z_INDEX
                } else if settling == Some(key) {
                    SETTLING_Z_INDEX
                } else {
                    0
                };
                TileView {
                    key,
                    item: entry.item(),
                    order: entry.order(),
                    rect: Rect::from_origin_size(entry.motion().position(), tile),
                    z_index,
                    emphasis: if active { self.emphasis() } else { None },
                }
            })
            .collect()
    }

    fn emphasis(&self) -> Option<DragEmphasis> {
        if let Some(fixed) = self.config.drag_emphasis {
            return Some(fixed);
        }
        let progress = self.drag.session()?.lift_progress();
        let lifted = DragEmphasis::default();
        Some(DragEmphasis {
            scale: 1.0 + (lifted.scale - 1.0) * progress,
            ..lifted
        })
    }
}
