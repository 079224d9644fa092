//! End-to-end drag, auto-scroll, and reconciliation scenarios driven
//! through `TileGrid::update`.

use std::time::Duration;

use tilegrid::{
    DragPhase, Effect, GestureSnapshot, GridConfig, GridItem, GridMsg, Point, Rect, TileGrid,
    TimerId,
};

#[derive(Debug, Clone, PartialEq)]
struct Card {
    id: String,
    fixed: bool,
}

impl GridItem for Card {
    fn key(&self) -> &str {
        &self.id
    }

    fn reorder_disabled(&self) -> bool {
        self.fixed
    }
}

fn card(id: impl Into<String>) -> Card {
    Card {
        id: id.into(),
        fixed: false,
    }
}

fn cards(n: usize) -> Vec<Card> {
    (0..n).map(|i| card(i.to_string())).collect()
}

fn ids(items: &[Card]) -> Vec<&str> {
    items.iter().map(|c| c.id.as_str()).collect()
}

/// 3 columns of 100px square tiles in a 300x400 viewport.
fn measured(items: Vec<Card>) -> TileGrid<Card> {
    let mut grid = TileGrid::new(GridConfig::new(3)).expect("valid config");
    grid.update(GridMsg::Layout(Rect::new(0.0, 0.0, 300.0, 400.0)));
    grid.update(GridMsg::SetItems(items));
    grid
}

fn grab(grid: &mut TileGrid<Card>, key: &str, at: Point) -> Vec<Effect<Card>> {
    let mut effects = grid.update(GridMsg::LongPress {
        key: key.to_owned(),
        pointer: at,
    });
    effects.extend(grid.update(GridMsg::GestureStart(GestureSnapshot::at(at))));
    effects
}

fn drag_to(grid: &mut TileGrid<Card>, from: Point, to: Point) -> Vec<Effect<Card>> {
    grid.update(GridMsg::GestureMove(GestureSnapshot::between(from, to)))
}

fn last_order_change(effects: &[Effect<Card>]) -> Option<Vec<Card>> {
    effects.iter().rev().find_map(|e| match e {
        Effect::OrderChanged(items) => Some(items.clone()),
        _ => None,
    })
}

fn started_timer(effects: &[Effect<Card>]) -> Option<(TimerId, Duration)> {
    effects.iter().find_map(|e| match e {
        Effect::StartTimer { timer, interval } => Some((*timer, *interval)),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn nine_items_three_columns_place_order_four_at_one_tile_offset() {
    let grid = measured(cards(9));
    let metrics = grid.metrics();
    assert_eq!(metrics.position_for_order(4), Point::new(100.0, 100.0));
    let view = grid
        .tiles()
        .into_iter()
        .find(|t| t.key == "4")
        .expect("tile 4");
    assert_eq!(view.rect, Rect::new(100.0, 100.0, 100.0, 100.0));
}

#[test]
fn explicit_item_height_makes_rectangular_slots() {
    let mut grid = TileGrid::new(GridConfig::new(3).item_height(60.0)).expect("valid config");
    grid.update(GridMsg::Layout(Rect::new(0.0, 0.0, 300.0, 400.0)));
    let effects = grid.update(GridMsg::SetItems(cards(7)));
    assert_eq!(grid.metrics().position_for_order(4), Point::new(100.0, 60.0));
    assert!(effects.contains(&Effect::ContentHeightChanged(180.0)));
}

// ---------------------------------------------------------------------------
// Drag and re-rank
// ---------------------------------------------------------------------------

#[test]
fn drag_first_tile_to_sixth_slot() {
    let mut grid = measured(cards(9));
    let start = Point::new(50.0, 50.0);
    let effects = grab(&mut grid, "0", start);
    assert!(effects.contains(&Effect::DragStarted(card("0"))));
    assert!(effects.contains(&Effect::SetScrollEnabled(false)));
    assert_eq!(grid.phase(), DragPhase::Dragging);

    let mut changes = Vec::new();
    for step in 1..=4 {
        let t = step as f32 / 4.0;
        let to = Point::new(50.0 + 200.0 * t, 50.0 + 100.0 * t);
        changes.extend(drag_to(&mut grid, start, to));
    }
    let expected = vec!["1", "2", "3", "4", "5", "0", "6", "7", "8"];
    let ordering = last_order_change(&changes).expect("order changed");
    assert_eq!(ids(&ordering), expected);

    let released = grid.update(GridMsg::GestureEnd);
    let final_order = released
        .iter()
        .find_map(|e| match e {
            Effect::DragReleased(items) => Some(items.clone()),
            _ => None,
        })
        .expect("drag released");
    assert_eq!(ids(&final_order), expected);
    assert!(released.contains(&Effect::SetScrollEnabled(true)));

    grid.update(GridMsg::Frame(Duration::from_millis(250)));
    assert_eq!(grid.phase(), DragPhase::Idle);
    let view = grid
        .tiles()
        .into_iter()
        .find(|t| t.key == "0")
        .expect("tile 0");
    assert_eq!(view.rect.origin(), grid.metrics().position_for_order(5));
    assert_eq!(view.z_index, 0);
}

#[test]
fn release_without_movement_keeps_order() {
    let mut grid = measured(cards(4));
    let effects = grab(&mut grid, "2", Point::new(250.0, 50.0));
    assert!(last_order_change(&effects).is_none());
    let released = grid.update(GridMsg::GestureEnd);
    assert!(last_order_change(&released).is_none());
    assert!(released.contains(&Effect::DragReleased(cards(4))));
    assert_eq!(grid.phase(), DragPhase::Idle);
}

#[test]
fn release_lands_exactly_on_slot_after_settle() {
    let mut grid = measured(cards(6));
    let start = Point::new(50.0, 50.0);
    grab(&mut grid, "0", start);
    drag_to(&mut grid, start, Point::new(237.0, 61.0));
    grid.update(GridMsg::GestureEnd);
    assert_eq!(grid.phase(), DragPhase::Settling);
    let settling = grid
        .tiles()
        .into_iter()
        .find(|t| t.key == "0")
        .expect("tile 0");
    assert_eq!(settling.z_index, tilegrid::grid::SETTLING_Z_INDEX);

    for _ in 0..20 {
        grid.update(GridMsg::Frame(Duration::from_millis(16)));
    }
    assert_eq!(grid.phase(), DragPhase::Idle);
    let order = grid.order_of("0").expect("order");
    let view = grid
        .tiles()
        .into_iter()
        .find(|t| t.key == "0")
        .expect("tile 0");
    assert_eq!(view.rect.origin(), grid.metrics().position_for_order(order));
}

#[test]
fn reorder_disabled_middle_item_keeps_its_slot() {
    let mut items = cards(3);
    items[1].fixed = true;
    let mut grid = measured(items);
    let start = Point::new(50.0, 50.0);
    grab(&mut grid, "0", start);
    let effects = drag_to(&mut grid, start, Point::new(250.0, 50.0));

    let ordering = last_order_change(&effects).expect("order changed");
    assert_eq!(ids(&ordering), vec!["2", "1", "0"]);
    assert_eq!(grid.order_of("1"), Some(1));
    grid.update(GridMsg::GestureEnd);
    assert_eq!(grid.order_of("1"), Some(1));
}

#[test]
fn drag_disabled_item_cannot_be_grabbed() {
    #[derive(Debug, Clone)]
    struct Locked(&'static str);
    impl GridItem for Locked {
        fn key(&self) -> &str {
            self.0
        }
        fn drag_disabled(&self) -> bool {
            self.0 == "pinned"
        }
    }

    let mut grid = TileGrid::new(GridConfig::new(2)).expect("valid config");
    grid.update(GridMsg::Layout(Rect::new(0.0, 0.0, 200.0, 400.0)));
    grid.update(GridMsg::SetItems(vec![Locked("pinned"), Locked("free")]));
    let effects = grid.update(GridMsg::LongPress {
        key: "pinned".into(),
        pointer: Point::new(10.0, 10.0),
    });
    assert!(effects.is_empty());
    assert_eq!(grid.phase(), DragPhase::Idle);
}

// ---------------------------------------------------------------------------
// Auto-scroll
// ---------------------------------------------------------------------------

#[test]
fn downward_auto_scroll_ramps_and_stops_at_content_bottom() {
    // 30 rows of 100px: content 3000, viewport 400, max offset 2600.
    let mut grid = measured(cards(90));
    let start = Point::new(50.0, 50.0);
    grab(&mut grid, "0", start);
    let effects = drag_to(&mut grid, start, Point::new(50.0, 350.0));
    let (timer, interval) = started_timer(&effects).expect("auto-scroll started");
    assert_eq!(interval, Duration::from_millis(25));
    assert!(grid.is_auto_scrolling());

    let mut offsets = vec![0.0f32];
    let mut cancelled = false;
    for _ in 0..1000 {
        let effects = grid.update(GridMsg::AutoScrollTick(timer));
        for effect in &effects {
            match effect {
                Effect::ScrollTo { offset } => offsets.push(*offset),
                Effect::CancelTimer(t) if *t == timer => cancelled = true,
                _ => {}
            }
        }
        if cancelled {
            break;
        }
    }
    assert!(cancelled, "auto-scroll never stopped");
    assert!(!grid.is_auto_scrolling());

    let steps: Vec<f32> = offsets.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(steps[..120].iter().all(|&s| s == 9.0), "first 120 ticks step 9");
    let (last, middle) = steps[120..].split_last().expect("ramped ticks");
    assert!(middle.iter().all(|&s| s == 18.0), "ticks after 120 step 18");
    assert!(*last > 0.0 && *last <= 18.0);

    let viewport = grid.viewport();
    assert_eq!(viewport.offset, 2600.0);
    assert!(viewport.content_height - (viewport.offset + viewport.rect.height) <= 1.5);

    // The tile travelled with the scroll and re-ranked near the bottom.
    let held = grid.registry().get("0").expect("tile 0");
    assert_eq!(held.motion().position().y, 300.0 + 2600.0);
    assert!(grid.order_of("0").expect("order") >= 84);

    // Further ticks for the dead timer are ignored.
    assert!(grid.update(GridMsg::AutoScrollTick(timer)).is_empty());
}

#[test]
fn upward_auto_scroll_stops_at_zero() {
    let mut grid = measured(cards(30));
    grid.update(GridMsg::ExternalScroll(45.0));
    // Tile "3" sits at content y 100, view y 55.
    let start = Point::new(50.0, 105.0);
    grab(&mut grid, "3", start);
    let effects = drag_to(&mut grid, start, Point::new(50.0, 60.0));
    let (timer, _) = started_timer(&effects).expect("auto-scroll started");

    let mut offsets = Vec::new();
    loop {
        let effects = grid.update(GridMsg::AutoScrollTick(timer));
        assert!(!effects.is_empty(), "timer stopped without reaching the top");
        offsets.extend(effects.iter().filter_map(|e| match e {
            Effect::ScrollTo { offset } => Some(*offset),
            _ => None,
        }));
        if effects.contains(&Effect::CancelTimer(timer)) {
            break;
        }
    }
    assert_eq!(offsets, vec![36.0, 27.0, 18.0, 9.0, 0.0]);
}

#[test]
fn release_cancels_auto_scroll_timer() {
    let mut grid = measured(cards(30));
    let start = Point::new(50.0, 50.0);
    grab(&mut grid, "0", start);
    let effects = drag_to(&mut grid, start, Point::new(50.0, 350.0));
    let (timer, _) = started_timer(&effects).expect("auto-scroll started");
    grid.update(GridMsg::AutoScrollTick(timer));

    let released = grid.update(GridMsg::GestureEnd);
    assert_eq!(released[0], Effect::CancelTimer(timer));
    assert!(grid.update(GridMsg::AutoScrollTick(timer)).is_empty());
}

#[test]
fn scroll_mirror_resumes_after_release() {
    let mut grid = measured(cards(30));
    let start = Point::new(50.0, 50.0);
    grab(&mut grid, "0", start);
    grid.update(GridMsg::ExternalScroll(120.0));
    assert_eq!(grid.viewport().offset, 0.0);
    grid.update(GridMsg::GestureEnd);
    grid.update(GridMsg::ExternalScroll(120.0));
    assert_eq!(grid.viewport().offset, 120.0);
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

#[test]
fn same_list_twice_emits_nothing() {
    let mut grid = measured(cards(5));
    assert!(grid.update(GridMsg::SetItems(cards(5))).is_empty());
    assert!(grid.update(GridMsg::SetItems(cards(5))).is_empty());
    assert!(!grid.registry().is_animating());
}

#[test]
fn external_reorder_settles_instead_of_snapping() {
    let mut grid = measured(cards(3));
    let mut reversed = cards(3);
    reversed.reverse();
    grid.update(GridMsg::SetItems(reversed));
    assert!(grid.needs_frame());
    let before = grid
        .tiles()
        .into_iter()
        .find(|t| t.key == "0")
        .expect("tile 0")
        .rect
        .origin();
    assert_eq!(before, Point::ZERO);
    grid.update(GridMsg::Frame(Duration::from_millis(200)));
    assert_eq!(grid.order_of("0"), Some(2));
    let after = grid
        .tiles()
        .into_iter()
        .find(|t| t.key == "0")
        .expect("tile 0")
        .rect
        .origin();
    assert_eq!(after, Point::new(200.0, 0.0));
}

#[test]
fn removing_dragged_item_aborts_without_release() {
    let mut grid = measured(cards(30));
    let start = Point::new(150.0, 50.0);
    grab(&mut grid, "1", start);
    let effects = drag_to(&mut grid, start, Point::new(150.0, 350.0));
    let (timer, _) = started_timer(&effects).expect("auto-scroll started");

    let remaining: Vec<Card> = cards(30).into_iter().filter(|c| c.id != "1").collect();
    let effects = grid.update(GridMsg::SetItems(remaining));
    assert!(effects.contains(&Effect::CancelTimer(timer)));
    assert!(effects.contains(&Effect::SetScrollEnabled(true)));
    assert!(!effects.iter().any(|e| matches!(e, Effect::DragReleased(_))));
    assert_eq!(grid.phase(), DragPhase::Idle);
    assert!(grid.update(GridMsg::GestureEnd).is_empty());
    assert!(grid.registry().orders_are_dense());

    let mut back = vec![card("1")];
    back.extend(cards(30).into_iter().filter(|c| c.id != "1"));
    grid.update(GridMsg::SetItems(back));
    assert_eq!(grid.order_of("1"), Some(0));
    assert_eq!(grid.order_of("0"), Some(1));
    assert!(grid.registry().orders_are_dense());
}

#[test]
fn reconcile_during_drag_keeps_dragged_tile_under_finger() {
    let mut grid = measured(cards(6));
    let start = Point::new(50.0, 50.0);
    grab(&mut grid, "0", start);
    drag_to(&mut grid, start, Point::new(70.0, 80.0));
    let held = grid.registry().get("0").expect("0").motion().position();

    let mut shuffled = cards(6);
    shuffled.swap(0, 5);
    grid.update(GridMsg::SetItems(shuffled));
    assert_eq!(grid.phase(), DragPhase::Dragging);
    assert_eq!(grid.registry().get("0").expect("0").motion().position(), held);
}

// ---------------------------------------------------------------------------
// Gesture recognizer routing
// ---------------------------------------------------------------------------

#[test]
fn recognizer_events_drive_a_full_drag() {
    use std::time::Instant;
    use tilegrid::{GestureRecognizer, PointerEvent};

    let mut grid = measured(cards(9));
    let mut recognizer = GestureRecognizer::default();
    let t0 = Instant::now();
    let origin = Point::new(50.0, 50.0);

    let mut effects = Vec::new();
    for event in recognizer.process(&PointerEvent::Down(origin), t0) {
        effects.extend(grid.handle_gesture(event));
    }
    if let Some(event) = recognizer.check_long_press(t0 + Duration::from_millis(600)) {
        effects.extend(grid.handle_gesture(event));
    }
    assert!(effects.contains(&Effect::DragStarted(card("0"))));

    let later = t0 + Duration::from_millis(650);
    for event in recognizer.process(&PointerEvent::Move(Point::new(150.0, 50.0)), later) {
        effects.extend(grid.handle_gesture(event));
    }
    for event in recognizer.process(&PointerEvent::Up(Point::new(150.0, 50.0)), later) {
        effects.extend(grid.handle_gesture(event));
    }
    assert!(effects.contains(&Effect::DragReleased(
        ["1", "0", "2", "3", "4", "5", "6", "7", "8"]
            .map(card)
            .to_vec()
    )));
}

#[test]
fn recognizer_tap_presses_tile_under_pointer() {
    use std::time::Instant;
    use tilegrid::{GestureRecognizer, PointerEvent};

    let mut grid = measured(cards(9));
    let mut recognizer = GestureRecognizer::default();
    let t0 = Instant::now();
    let mut effects = Vec::new();
    for event in recognizer.process(&PointerEvent::Down(Point::new(150.0, 150.0)), t0) {
        effects.extend(grid.handle_gesture(event));
    }
    for event in recognizer.process(
        &PointerEvent::Up(Point::new(152.0, 151.0)),
        t0 + Duration::from_millis(80),
    ) {
        effects.extend(grid.handle_gesture(event));
    }
    assert_eq!(effects, vec![Effect::ItemPressed(card("4"))]);
}
