//! The [`Scalar`] trait over point components.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

/// A coordinate component: `i32` for discrete cells, `f64` for world space.
pub trait Scalar:
    Copy
    + Debug
    + Default
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// Widen to `f64` for distance computation.
    fn to_f64(self) -> f64;

    /// Euclidean remainder, always in `[0, rhs)` for positive `rhs`.
    fn rem_euclid(self, rhs: Self) -> Self;
}

impl Scalar for i32 {
    const ZERO: Self = 0;
    const ONE: Self = 1;

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn rem_euclid(self, rhs: Self) -> Self {
        i32::rem_euclid(self, rhs)
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    fn to_f64(self) -> f64 {
        self
    }

    fn rem_euclid(self, rhs: Self) -> Self {
        let r = f64::rem_euclid(self, rhs);
        // rem_euclid can round up to exactly `rhs` for tiny negative inputs.
        if r >= rhs {
            0.0
        } else {
            r
        }
    }
}
