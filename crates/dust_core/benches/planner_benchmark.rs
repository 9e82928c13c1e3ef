//! # Planner Benchmark
//!
//! The planner runs on the host thread at surface-available time and on
//! the render thread after every resize. It must stay well under a frame.
//!
//! Run with: `cargo bench --package dust_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dust_core::{compute_particle_budget, DensityPlanner, PerformanceTier, Region};

/// Chat-bubble sized regions stacked down a 1080-wide screen.
fn message_regions(count: usize) -> Vec<Region> {
    (0..count)
        .map(|i| {
            let top = (i as i32) * 37;
            Region::new(24 + (i as i32 % 3) * 11, top, 640 + (i as i32 % 7) * 13, 33)
        })
        .collect()
}

fn bench_single_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_particle_budget");

    for count in [1_usize, 16, 64] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let regions = message_regions(count);
            b.iter(|| {
                let mut regions = regions.clone();
                black_box(compute_particle_budget(&mut regions, PerformanceTier::High, 1))
            });
        });
    }

    group.finish();
}

fn bench_replan_after_resize(c: &mut Criterion) {
    c.bench_function("replan_64_regions", |b| {
        let mut planner = DensityPlanner::new(PerformanceTier::Average);
        let mut regions = message_regions(64);
        planner.plan(&mut regions);
        b.iter(|| black_box(planner.plan(&mut regions)));
    });
}

criterion_group!(benches, bench_single_pass, bench_replan_after_resize);
criterion_main!(benches);
