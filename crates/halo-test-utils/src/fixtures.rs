//! Seeded object scatters.
//!
//! Uses a ChaCha8 stream so a seed reproduces the same scatter on every
//! platform.

use halo_core::{RealPoint, RealRect};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic stream of points uniformly distributed in a rectangle.
pub struct Scatter {
    rng: ChaCha8Rng,
    bounds: RealRect,
}

impl Scatter {
    pub fn new(bounds: RealRect, seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            bounds,
        }
    }

    /// A uniform sample in `[0, 1)`.
    pub fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// A point inside the bounds (half-open on every axis).
    pub fn point(&mut self) -> RealPoint {
        let lo = self.bounds.lower().clone();
        let size = self.bounds.size();
        let coords: Vec<f64> = (0..lo.ndim())
            .map(|i| {
                let c = lo[i] + self.unit() * size[i];
                if c < self.bounds.upper()[i] {
                    c
                } else {
                    lo[i]
                }
            })
            .collect();
        RealPoint::from(coords)
    }
}

impl Iterator for Scatter {
    type Item = RealPoint;

    fn next(&mut self) -> Option<RealPoint> {
        Some(self.point())
    }
}

/// `n` seeded points inside `bounds`.
pub fn scatter(bounds: &RealRect, n: usize, seed: u64) -> Vec<RealPoint> {
    Scatter::new(bounds.clone(), seed).take(n).collect()
}
