//! Immutable N-dimensional points.

use crate::error::{assert_dims, check_dims, GeomError};
use crate::rect::Rect;
use crate::scalar::Scalar;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Index, Sub};

/// An immutable point with a fixed number of components.
///
/// The dimension is fixed at construction. Every operation returns a new
/// value; spatial keys must never mutate after they have been used to index
/// a cell. Up to four components are stored inline.
///
/// # Examples
///
/// ```
/// use halo_core::{IntPoint, RealPoint};
///
/// let p = RealPoint::from([1.5, 2.0]);
/// let q = p.shift_all(1.0);
/// assert_eq!(q, RealPoint::from([2.5, 3.0]));
/// assert_eq!(q.floor(), IntPoint::from([2, 3]));
/// ```
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Scalar + serde::Serialize + serde::de::DeserializeOwned"))]
pub struct Point<T: Scalar> {
    pub(crate) coords: SmallVec<[T; 4]>,
}

/// A discrete point: a cell or grid coordinate.
pub type IntPoint = Point<i32>;

/// A continuous point in world coordinates.
pub type RealPoint = Point<f64>;

impl<T: Scalar> Point<T> {
    /// Create a point from its components.
    pub fn new(coords: &[T]) -> Self {
        Self {
            coords: SmallVec::from_slice(coords),
        }
    }

    /// The origin in `ndim` dimensions.
    pub fn zeros(ndim: usize) -> Self {
        Self {
            coords: SmallVec::from_elem(T::ZERO, ndim),
        }
    }

    /// A point with every component equal to `value`.
    pub fn splat(ndim: usize, value: T) -> Self {
        Self {
            coords: SmallVec::from_elem(value, ndim),
        }
    }

    /// Number of components.
    pub fn ndim(&self) -> usize {
        self.coords.len()
    }

    /// The components as a slice.
    pub fn coords(&self) -> &[T] {
        &self.coords
    }

    /// Translate along a single axis.
    pub fn shift_axis(&self, axis: usize, offset: T) -> Result<Self, GeomError> {
        if axis >= self.ndim() {
            return Err(GeomError::AxisOutOfRange {
                axis,
                ndim: self.ndim(),
            });
        }
        let mut coords = self.coords.clone();
        coords[axis] = coords[axis] + offset;
        Ok(Self { coords })
    }

    /// Translate every axis by the same offset.
    pub fn shift_all(&self, offset: T) -> Self {
        self.map(|c| c + offset)
    }

    /// Translate by a per-axis offset slice.
    ///
    /// Returns `Err(GeomError::DimensionMismatch)` if `offsets.len()`
    /// differs from [`ndim`](Self::ndim).
    pub fn checked_shift(&self, offsets: &[T]) -> Result<Self, GeomError> {
        check_dims(self.ndim(), offsets.len())?;
        Ok(self.zip_with(offsets, |a, b| a + b))
    }

    /// Componentwise sum with another point.
    pub fn checked_add(&self, other: &Self) -> Result<Self, GeomError> {
        self.checked_shift(&other.coords)
    }

    /// Componentwise difference with another point.
    pub fn checked_sub(&self, other: &Self) -> Result<Self, GeomError> {
        check_dims(self.ndim(), other.ndim())?;
        Ok(self.zip_with(&other.coords, |a, b| a - b))
    }

    /// Drop one axis, producing an `ndim - 1` dimensional point.
    pub fn reduce_dim(&self, axis: usize) -> Result<Self, GeomError> {
        if axis >= self.ndim() {
            return Err(GeomError::AxisOutOfRange {
                axis,
                ndim: self.ndim(),
            });
        }
        let mut coords = self.coords.clone();
        coords.remove(axis);
        Ok(Self { coords })
    }

    /// Minkowski distance of order `p` to `other`.
    ///
    /// `p = 2.0` is Euclidean, `p = 1.0` Manhattan, and `p = f64::INFINITY`
    /// Chebyshev. `p` must be at least 1 for the result to be a metric.
    pub fn distance(&self, other: &Self, p: f64) -> Result<f64, GeomError> {
        check_dims(self.ndim(), other.ndim())?;
        let diffs = self
            .coords
            .iter()
            .zip(other.coords.iter())
            .map(|(&a, &b)| (a.to_f64() - b.to_f64()).abs());
        if p.is_infinite() {
            return Ok(diffs.fold(0.0, f64::max));
        }
        if p == 1.0 {
            return Ok(diffs.sum());
        }
        if p == 2.0 {
            return Ok(diffs.map(|d| d * d).sum::<f64>().sqrt());
        }
        Ok(diffs.map(|d| d.powf(p)).sum::<f64>().powf(1.0 / p))
    }

    /// Euclidean distance to `other`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn euclidean(&self, other: &Self) -> f64 {
        assert_dims(self.ndim(), other.ndim());
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(&a, &b)| {
                let d = a.to_f64() - b.to_f64();
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    /// Componentwise minimum.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn component_min(&self, other: &Self) -> Self {
        assert_dims(self.ndim(), other.ndim());
        self.zip_with(&other.coords, |a, b| if b < a { b } else { a })
    }

    /// Componentwise maximum.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn component_max(&self, other: &Self) -> Self {
        assert_dims(self.ndim(), other.ndim());
        self.zip_with(&other.coords, |a, b| if b > a { b } else { a })
    }

    /// `true` iff every component is strictly less than `other`'s.
    #[track_caller]
    pub fn all_lt(&self, other: &Self) -> bool {
        assert_dims(self.ndim(), other.ndim());
        self.coords.iter().zip(other.coords.iter()).all(|(a, b)| a < b)
    }

    /// `true` iff every component is greater than or equal to `other`'s.
    #[track_caller]
    pub fn all_ge(&self, other: &Self) -> bool {
        assert_dims(self.ndim(), other.ndim());
        self.coords.iter().zip(other.coords.iter()).all(|(a, b)| a >= b)
    }

    /// Wrap this point into `[bounds.lower, bounds.upper)` on every axis.
    ///
    /// Only meaningful for toroidal worlds; see
    /// [`Topology`](crate::Topology) for the policy switch.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn to_toroidal(&self, bounds: &Rect<T>) -> Self {
        assert_dims(self.ndim(), bounds.ndim());
        let coords = self
            .coords
            .iter()
            .zip(bounds.lower().coords.iter().zip(bounds.upper().coords.iter()))
            .map(|(&c, (&lo, &hi))| {
                let len = hi - lo;
                if len <= T::ZERO {
                    lo
                } else {
                    let wrapped = lo + (c - lo).rem_euclid(len);
                    // Float rounding can land exactly on the exclusive bound.
                    if wrapped >= hi {
                        lo
                    } else {
                        wrapped
                    }
                }
            })
            .collect();
        Self { coords }
    }

    pub(crate) fn map(&self, f: impl Fn(T) -> T) -> Self {
        Self {
            coords: self.coords.iter().map(|&c| f(c)).collect(),
        }
    }

    pub(crate) fn zip_with(&self, other: &[T], f: impl Fn(T, T) -> T) -> Self {
        Self {
            coords: self
                .coords
                .iter()
                .zip(other.iter())
                .map(|(&a, &b)| f(a, b))
                .collect(),
        }
    }
}

impl IntPoint {
    /// Convert to a continuous point.
    pub fn to_real(&self) -> RealPoint {
        RealPoint {
            coords: self.coords.iter().map(|&c| c as f64).collect(),
        }
    }
}

impl RealPoint {
    /// Round every component toward negative infinity.
    pub fn floor(&self) -> IntPoint {
        IntPoint {
            coords: self.coords.iter().map(|&c| c.floor() as i32).collect(),
        }
    }
}

impl Eq for IntPoint {}

impl Hash for IntPoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coords.hash(state);
    }
}

impl<T: Scalar> fmt::Debug for Point<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.coords.iter()).finish()
    }
}

impl<T: Scalar> Index<usize> for Point<T> {
    type Output = T;

    fn index(&self, axis: usize) -> &T {
        &self.coords[axis]
    }
}

impl<T: Scalar, const N: usize> From<[T; N]> for Point<T> {
    fn from(coords: [T; N]) -> Self {
        Self::new(&coords)
    }
}

impl<T: Scalar> From<Vec<T>> for Point<T> {
    fn from(coords: Vec<T>) -> Self {
        Self {
            coords: SmallVec::from_vec(coords),
        }
    }
}

impl<T: Scalar> Add for &Point<T> {
    type Output = Point<T>;

    #[track_caller]
    fn add(self, rhs: Self) -> Point<T> {
        assert_dims(self.ndim(), rhs.ndim());
        self.zip_with(&rhs.coords, |a, b| a + b)
    }
}

impl<T: Scalar> Sub for &Point<T> {
    type Output = Point<T>;

    #[track_caller]
    fn sub(self, rhs: Self) -> Point<T> {
        assert_dims(self.ndim(), rhs.ndim());
        self.zip_with(&rhs.coords, |a, b| a - b)
    }
}
