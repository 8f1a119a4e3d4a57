//! Criterion micro-benchmarks for continuous storage operations.

use criterion::{criterion_group, criterion_main, Criterion};
use halo_bench::{bench_shape, query_points, reference_storage, sparse_storage, POPULATION};
use halo_core::{IntPoint, IntRect, RealPoint, RealRect};
use halo_storage::{ContinuousStorage, RegionStorage};
use std::hint::black_box;

/// Benchmark: Move all 10K objects by a small offset.
fn bench_move_10k(c: &mut Criterion) {
    let mut storage = reference_storage(1);
    let targets = query_points(POPULATION, 2);

    c.bench_function("set_location_move_10k", |b| {
        b.iter(|| {
            for (i, p) in targets.iter().enumerate() {
                storage.set_location(i as u32, p.clone()).unwrap();
            }
            black_box(storage.len());
        });
    });
}

/// Benchmark: 1000 rectangle queries of 20x20 world units.
fn bench_objects_in(c: &mut Criterion) {
    let storage = reference_storage(3);
    let rects: Vec<RealRect> = query_points(1000, 4)
        .iter()
        .map(|p| RealRect::new(p.clone(), p.shift_all(20.0)).unwrap())
        .collect();

    c.bench_function("objects_in_1k", |b| {
        b.iter(|| {
            for r in &rects {
                black_box(storage.objects_in(r));
            }
        });
    });
}

/// Benchmark: 1000 radius-10 queries on fine and coarse cell grids.
fn bench_neighbors_within(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighbors_within_1k");
    for (name, storage) in [("cell5", reference_storage(5)), ("cell50", sparse_storage(5))] {
        group.bench_function(name, |b| {
            b.iter(|| {
                for obj in 0..1000u32 {
                    black_box(storage.neighbors_within(&obj, 10.0).unwrap());
                }
            });
        });
    }
    group.finish();
}

/// Benchmark: 1000 k-NN queries for k = 1, 8, 64.
fn bench_nearest_neighbors(c: &mut Criterion) {
    let storage = reference_storage(6);
    let mut group = c.benchmark_group("nearest_neighbors_1k");
    for k in [1usize, 8, 64] {
        group.bench_function(format!("k{k}"), |b| {
            b.iter(|| {
                for obj in 0..1000u32 {
                    black_box(storage.nearest_neighbors(&obj, k).unwrap());
                }
            });
        });
    }
    group.finish();
}

/// Benchmark: Pack a 40-unit border strip and unpack it into a fresh storage.
fn bench_pack_unpack_strip(c: &mut Criterion) {
    let storage = reference_storage(7);
    let strip = IntRect::new(IntPoint::from([0, 0]), IntPoint::from([40, 500])).unwrap();

    c.bench_function("pack_unpack_strip", |b| {
        b.iter(|| {
            let packed = storage.pack(std::slice::from_ref(&strip)).unwrap();
            let mut dst: ContinuousStorage<u32> =
                ContinuousStorage::new(bench_shape(), &[5.0, 5.0]).unwrap();
            dst.unpack(std::slice::from_ref(&strip), packed).unwrap();
            black_box(dst.len());
        });
    });
}

/// Benchmark: Nearest objects to 1000 points outside the shape.
fn bench_nearest_to_outside(c: &mut Criterion) {
    let storage = reference_storage(8);
    let points: Vec<RealPoint> = query_points(1000, 9)
        .iter()
        .map(|p| RealPoint::from([p[0] - 600.0, p[1]]))
        .collect();

    c.bench_function("nearest_to_outside_1k", |b| {
        b.iter(|| {
            for p in &points {
                black_box(storage.nearest_to(p, 4));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_move_10k,
    bench_objects_in,
    bench_neighbors_within,
    bench_nearest_neighbors,
    bench_pack_unpack_strip,
    bench_nearest_to_outside
);
criterion_main!(benches);
