//! Benchmarks for the per-frame paths of the desktop engine.
//!
//! Run with: `cargo bench -p deskshell`
//!
//! ## Benchmark Groups
//!
//! - `snap`: Snap computation against a growing number of neighbours
//! - `grid`: Cell geometry and auto-arrangement
//! - `drag`: A full pointer session through the `Desktop` facade

use std::hint::black_box;
use std::time::{Duration, Instant};

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use deskshell_lib::config::{DeskshellConfig, GridConfig, SnapConfig};
use deskshell_lib::desktop::snap::SnapRequest;
use deskshell_lib::desktop::{
    Desktop, Insets, LayoutGridEngine, MonitorRegistry, OpenArgs, Point, Rect, Size, SnapEngine, SnapKind,
    SnapZone, WindowId,
};

// ============================================================================
// Test Data
// ============================================================================

fn monitor_1080p() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

/// Tiles `count` 300x200 windows across the monitor.
fn neighbours(count: usize) -> Vec<Rect> {
    (0..count)
        .map(|i| {
            let column = (i % 6) as f64;
            let row = (i / 6) as f64;
            Rect::new(column * 310.0, row * 210.0, 300.0, 200.0)
        })
        .collect()
}

fn engine() -> SnapEngine { SnapEngine::new(&SnapConfig::default(), Size::new(200.0, 120.0)) }

// ============================================================================
// Snap Benchmarks
// ============================================================================

fn bench_snap(c: &mut Criterion) {
    let mut group = c.benchmark_group("snap");
    let engine = engine();
    let monitor = monitor_1080p();

    for count in [0, 4, 16, 32] {
        let others = neighbours(count);

        group.bench_with_input(BenchmarkId::new("free", count), &count, |b, _| {
            b.iter(|| {
                engine.calculate_snap(
                    black_box(Rect::new(917.0, 433.0, 640.0, 480.0)),
                    black_box(&others),
                    black_box(monitor),
                    false,
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("window_edge", count), &count, |b, _| {
            b.iter(|| {
                engine.calculate_snap(
                    black_box(Rect::new(312.0, 215.0, 640.0, 480.0)),
                    black_box(&others),
                    black_box(monitor),
                    false,
                )
            });
        });
    }

    group.bench_function("zone_hold", |b| {
        let request = SnapRequest {
            geometry: Rect::new(-30.0, 300.0, 640.0, 480.0),
            others: &[],
            monitor_bounds: monitor,
            is_resizing: false,
            min_size: Size::new(200.0, 120.0),
            previous: Some(SnapKind::Zone { zone: SnapZone::LeftHalf }),
        };
        b.iter(|| engine.snap(black_box(&request)));
    });

    group.bench_function("resize_edge", |b| {
        b.iter(|| {
            engine.calculate_snap(
                black_box(Rect::new(300.0, 200.0, 1610.0, 868.0)),
                black_box(&[]),
                black_box(monitor),
                true,
            )
        });
    });

    group.finish();
}

// ============================================================================
// Grid Benchmarks
// ============================================================================

fn bench_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid");
    let config = DeskshellConfig::default();
    let monitors = MonitorRegistry::new(&config.monitors, deskshell_lib::desktop::EventBus::new(16));
    let grid = LayoutGridEngine::from_config(&GridConfig::default(), Insets::new(28.0, 0.0, 80.0, 0.0));

    group.bench_function("cell_geometry", |b| {
        b.iter(|| grid.cell_geometry(black_box("left"), &monitors));
    });

    for layout in ["halves", "quarters", "main-stack"] {
        group.bench_with_input(BenchmarkId::new("auto_arrange", layout), &layout, |b, layout| {
            b.iter_batched(
                || {
                    let mut desktop = Desktop::new(DeskshellConfig::default());
                    let ids: Vec<WindowId> = (0..4)
                        .filter_map(|_| desktop.open_window("notepad", OpenArgs::default()))
                        .collect();
                    let _ = desktop.select_layout(layout);
                    (desktop, ids)
                },
                |(mut desktop, ids)| desktop.auto_arrange_windows(black_box(&ids)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// Drag Benchmarks
// ============================================================================

fn bench_drag(c: &mut Criterion) {
    let mut group = c.benchmark_group("drag");

    for neighbours in [1, 8] {
        group.bench_with_input(BenchmarkId::new("sixty_frames", neighbours), &neighbours, |b, &count| {
            b.iter_batched(
                || {
                    let mut desktop = Desktop::new(DeskshellConfig::default());
                    for _ in 0..count {
                        desktop.open_window("files", OpenArgs::default());
                    }
                    let args = OpenArgs { geometry: Some(Rect::new(300.0, 200.0, 640.0, 480.0)), ..OpenArgs::default() };
                    let id = desktop.open_window("notepad", args);
                    (desktop, id)
                },
                |(mut desktop, id)| {
                    let Some(id) = id else { return None };
                    let start = Instant::now();
                    desktop.begin_move(id, Point::new(400.0, 210.0));
                    for frame in 0..60u32 {
                        let x = 400.0 - f64::from(frame) * 6.0;
                        desktop.pointer_move(Point::new(x, 210.0), start + Duration::from_millis(u64::from(frame) * 17));
                    }
                    desktop.pointer_up()
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(benches, bench_snap, bench_grid, bench_drag);

criterion_main!(benches);
