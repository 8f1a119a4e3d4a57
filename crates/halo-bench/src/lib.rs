//! Benchmark profiles for Halo field storage.
//!
//! - [`reference_storage`]: 500x500 shape, 10K objects, cell width 5
//! - [`sparse_storage`]: same shape and population with cell width 50
//! - [`query_points`]: deterministic query locations via seed

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use halo_core::{IntPoint, IntRect, RealPoint};
use halo_storage::ContinuousStorage;
use halo_test_utils::scatter;

/// Side length of the benchmark shape in grid units.
pub const SIDE: i32 = 500;

/// Objects placed by the reference profiles.
pub const POPULATION: usize = 10_000;

/// The `[0, SIDE)²` benchmark shape.
pub fn bench_shape() -> IntRect {
    IntRect::new(IntPoint::zeros(2), IntPoint::splat(2, SIDE))
        .expect("square benchmark shape is valid")
}

/// A storage over [`bench_shape`] holding `n` seeded objects.
pub fn populated(n: usize, cell: f64, seed: u64) -> ContinuousStorage<u32> {
    let shape = bench_shape();
    let mut storage =
        ContinuousStorage::new(shape.clone(), &[cell, cell]).expect("positive cell width");
    for (i, p) in scatter(&shape.to_real(), n, seed).into_iter().enumerate() {
        storage
            .set_location(i as u32, p)
            .expect("scatter stays inside the shape");
    }
    storage
}

/// Reference profile: cell width close to typical query radii.
pub fn reference_storage(seed: u64) -> ContinuousStorage<u32> {
    populated(POPULATION, 5.0, seed)
}

/// Coarse profile: ~200 objects per cell, stressing the narrow phase.
pub fn sparse_storage(seed: u64) -> ContinuousStorage<u32> {
    populated(POPULATION, 50.0, seed)
}

/// `n` seeded query locations inside [`bench_shape`].
pub fn query_points(n: usize, seed: u64) -> Vec<RealPoint> {
    scatter(&bench_shape().to_real(), n, seed ^ 0x5eed)
}
