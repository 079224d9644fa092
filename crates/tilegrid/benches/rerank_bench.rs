//! Benchmarks for the per-sample drag path.
//!
//! Run with: cargo bench -p tilegrid

use std::hint::black_box;
use std::time::Duration;

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use tilegrid::drag::nearest_slot;
use tilegrid::{
    GestureSnapshot, GridConfig, GridItem, GridMetrics, GridMsg, Point, Rect, Registry, TileGrid,
};

#[derive(Debug, Clone)]
struct Tile {
    key: String,
    fixed: bool,
}

impl GridItem for Tile {
    fn key(&self) -> &str {
        &self.key
    }

    fn reorder_disabled(&self) -> bool {
        self.fixed
    }
}

fn tiles(n: usize) -> Vec<Tile> {
    (0..n)
        .map(|i| Tile {
            key: format!("tile-{i}"),
            fixed: i % 7 == 3,
        })
        .collect()
}

fn registry(n: usize) -> Registry<Tile> {
    let mut r = Registry::new(
        GridMetrics::measure(400.0, 4, None),
        Duration::from_millis(200),
    );
    r.reconcile(tiles(n), None);
    r
}

fn bench_nearest_slot(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag/nearest_slot");
    for n in [16, 64, 256, 1024] {
        let r = registry(n);
        let probe = Point::new(130.0, 70.0);
        group.bench_with_input(BenchmarkId::from_parameter(n), &r, |b, r| {
            b.iter(|| black_box(nearest_slot(r, "tile-0", black_box(probe))))
        });
    }
    group.finish();
}

fn bench_drag_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag/sweep");
    for n in [64, 256] {
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                || {
                    let mut grid = TileGrid::new(GridConfig::new(4)).expect("valid config");
                    grid.update(GridMsg::Layout(Rect::new(0.0, 0.0, 400.0, 800.0)));
                    grid.update(GridMsg::SetItems(tiles(n)));
                    let origin = Point::new(50.0, 50.0);
                    grid.update(GridMsg::LongPress {
                        key: "tile-0".into(),
                        pointer: origin,
                    });
                    grid
                },
                |mut grid| {
                    let origin = Point::new(50.0, 50.0);
                    for step in 0..100 {
                        let to = Point::new(50.0 + 3.0 * step as f32, 50.0 + 7.0 * step as f32);
                        let snapshot = GestureSnapshot::between(origin, to);
                        black_box(grid.update(GridMsg::GestureMove(snapshot)));
                    }
                    black_box(grid.update(GridMsg::GestureEnd))
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry/reconcile");
    for n in [64, 512] {
        let mut reversed = tiles(n);
        reversed.reverse();
        group.bench_with_input(BenchmarkId::new("reverse", n), &reversed, |b, list| {
            b.iter_batched(
                || registry(n),
                |mut r| black_box(r.reconcile(list.clone(), None)),
                BatchSize::SmallInput,
            )
        });
        group.bench_with_input(BenchmarkId::new("unchanged", n), &tiles(n), |b, list| {
            b.iter_batched(
                || registry(n),
                |mut r| black_box(r.reconcile(list.clone(), None)),
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_nearest_slot, bench_drag_sweep, bench_reconcile);
criterion_main!(benches);
