//! Axis-aligned half-open rectangles and row-major point iteration.

use crate::error::{assert_dims, check_dims, GeomError};
use crate::point::{IntPoint, Point, RealPoint};
use crate::scalar::Scalar;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;

/// An axis-aligned rectangle `[lower, upper)`.
///
/// The lower corner is inclusive and the upper corner exclusive on every
/// axis. This half-open convention is used for every membership test in
/// the workspace: a point lying exactly on `upper` belongs to the next
/// rectangle over, which decides which partition owns a boundary object.
///
/// # Examples
///
/// ```
/// use halo_core::{RealPoint, RealRect};
///
/// let r = RealRect::new(RealPoint::from([0.0, 0.0]), RealPoint::from([10.0, 10.0])).unwrap();
/// assert!(r.contains(&RealPoint::from([9.999, 5.0])));
/// assert!(!r.contains(&RealPoint::from([10.0, 5.0])));
/// ```
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        bound = "T: Scalar + serde::Serialize + serde::de::DeserializeOwned",
        try_from = "RawRect<T>"
    )
)]
pub struct Rect<T: Scalar> {
    lower: Point<T>,
    upper: Point<T>,
}

/// Deserialized corners, validated through [`Rect::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(bound = "T: Scalar + serde::Serialize + serde::de::DeserializeOwned")]
struct RawRect<T: Scalar> {
    lower: Point<T>,
    upper: Point<T>,
}

#[cfg(feature = "serde")]
impl<T: Scalar> TryFrom<RawRect<T>> for Rect<T> {
    type Error = GeomError;

    fn try_from(raw: RawRect<T>) -> Result<Self, GeomError> {
        Self::new(raw.lower, raw.upper)
    }
}

/// A rectangle of grid cells.
pub type IntRect = Rect<i32>;

/// A rectangle in continuous world space.
pub type RealRect = Rect<f64>;

impl<T: Scalar> Rect<T> {
    /// Create a rectangle from its corners.
    ///
    /// Returns `Err(GeomError::DimensionMismatch)` if the corners differ in
    /// dimension, or `Err(GeomError::InvertedRect)` if `lower > upper` on
    /// any axis. Degenerate (zero-width) axes are allowed.
    pub fn new(lower: Point<T>, upper: Point<T>) -> Result<Self, GeomError> {
        check_dims(lower.ndim(), upper.ndim())?;
        if let Some(axis) = (0..lower.ndim()).find(|&i| lower[i] > upper[i]) {
            return Err(GeomError::InvertedRect { axis });
        }
        Ok(Self { lower, upper })
    }

    /// Create a rectangle from its lower corner and per-axis size.
    pub fn from_size(lower: Point<T>, size: &[T]) -> Result<Self, GeomError> {
        let upper = lower.checked_shift(size)?;
        Self::new(lower, upper)
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.lower.ndim()
    }

    /// Inclusive lower corner.
    pub fn lower(&self) -> &Point<T> {
        &self.lower
    }

    /// Exclusive upper corner.
    pub fn upper(&self) -> &Point<T> {
        &self.upper
    }

    /// Per-axis extent, `upper - lower`.
    pub fn size(&self) -> Point<T> {
        &self.upper - &self.lower
    }

    /// Product of the per-axis extents.
    pub fn area(&self) -> T {
        self.size().coords.iter().fold(T::ONE, |acc, &s| acc * s)
    }

    /// `true` if any axis has zero extent.
    pub fn is_empty(&self) -> bool {
        (0..self.ndim()).any(|i| self.lower[i] >= self.upper[i])
    }

    /// `true` iff `lower <= point < upper` on every axis.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions differ.
    #[track_caller]
    pub fn contains(&self, point: &Point<T>) -> bool {
        assert_dims(self.ndim(), point.ndim());
        (0..self.ndim()).all(|i| self.lower[i] <= point[i] && point[i] < self.upper[i])
    }

    /// `true` iff `other` lies entirely within this rectangle.
    #[track_caller]
    pub fn contains_rect(&self, other: &Self) -> bool {
        assert_dims(self.ndim(), other.ndim());
        (0..self.ndim()).all(|i| self.lower[i] <= other.lower[i] && other.upper[i] <= self.upper[i])
    }

    /// `true` iff the two rectangles share at least one point.
    #[track_caller]
    pub fn intersects(&self, other: &Self) -> bool {
        assert_dims(self.ndim(), other.ndim());
        (0..self.ndim()).all(|i| self.lower[i] < other.upper[i] && other.lower[i] < self.upper[i])
    }

    /// The overlap of two rectangles, or `None` if they are disjoint.
    #[track_caller]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            lower: self.lower.component_max(&other.lower),
            upper: self.upper.component_min(&other.upper),
        })
    }

    /// The smallest rectangle covering both.
    #[track_caller]
    pub fn union_bounds(&self, other: &Self) -> Self {
        Self {
            lower: self.lower.component_min(&other.lower),
            upper: self.upper.component_max(&other.upper),
        }
    }

    /// Translate both corners by `offset`.
    #[track_caller]
    pub fn shift(&self, offset: &Point<T>) -> Self {
        Self {
            lower: &self.lower + offset,
            upper: &self.upper + offset,
        }
    }

    /// Translate both corners along one axis.
    pub fn shift_axis(&self, axis: usize, offset: T) -> Result<Self, GeomError> {
        Ok(Self {
            lower: self.lower.shift_axis(axis, offset)?,
            upper: self.upper.shift_axis(axis, offset)?,
        })
    }

    /// Grow (positive) or shrink (negative) every side by a per-axis margin.
    ///
    /// Returns `Err(GeomError::InvalidMargin)` if shrinking would invert the
    /// rectangle.
    pub fn resize(&self, margin: &[T]) -> Result<Self, GeomError> {
        check_dims(self.ndim(), margin.len())?;
        let lower = self.lower.zip_with(margin, |c, m| c - m);
        let upper = self.upper.zip_with(margin, |c, m| c + m);
        if let Some(axis) = (0..self.ndim()).find(|&i| lower[i] > upper[i]) {
            return Err(GeomError::InvalidMargin { axis });
        }
        Ok(Self { lower, upper })
    }

    /// Re-express this rectangle relative to `origin`.
    #[track_caller]
    pub fn to_local(&self, origin: &Point<T>) -> Self {
        Self {
            lower: &self.lower - origin,
            upper: &self.upper - origin,
        }
    }

    /// Inverse of [`to_local`](Self::to_local).
    #[track_caller]
    pub fn to_global(&self, origin: &Point<T>) -> Self {
        self.shift(origin)
    }
}

impl IntRect {
    /// Number of cells covered.
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.size().coords.iter().map(|&s| s as usize).product()
    }

    /// Row-major flat index of `point` (last axis fastest), or `None` if
    /// `point` lies outside the rectangle.
    pub fn flat_index(&self, point: &IntPoint) -> Option<usize> {
        if point.ndim() != self.ndim() || !self.contains(point) {
            return None;
        }
        let mut idx = 0usize;
        for i in 0..self.ndim() {
            let extent = (self.upper[i] - self.lower[i]) as usize;
            idx = idx * extent + (point[i] - self.lower[i]) as usize;
        }
        Some(idx)
    }

    /// Every integer point in `[lower, upper)` in row-major order.
    ///
    /// The iterator is lazy, finite and restartable: clone it, or call
    /// `points()` again, to start over.
    pub fn points(&self) -> RectPoints {
        RectPoints {
            next: if self.is_empty() {
                None
            } else {
                Some(self.lower.clone())
            },
            remaining: self.cell_count(),
            lower: self.lower.clone(),
            upper: self.upper.clone(),
        }
    }

    /// Convert to a continuous rectangle.
    pub fn to_real(&self) -> RealRect {
        RealRect {
            lower: self.lower.to_real(),
            upper: self.upper.to_real(),
        }
    }
}

impl Eq for IntRect {}

impl Hash for IntRect {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.lower.hash(state);
        self.upper.hash(state);
    }
}

impl<T: Scalar> fmt::Debug for Rect<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}, {:?})", self.lower, self.upper)
    }
}

/// Row-major iterator over the integer points of an [`IntRect`].
///
/// Created by [`IntRect::points`].
#[derive(Clone, Debug)]
pub struct RectPoints {
    lower: IntPoint,
    upper: IntPoint,
    next: Option<IntPoint>,
    remaining: usize,
}

impl Iterator for RectPoints {
    type Item = IntPoint;

    fn next(&mut self) -> Option<IntPoint> {
        let current = self.next.take()?;
        self.remaining -= 1;
        let mut coords = current.coords.clone();
        let mut axis = coords.len();
        while axis > 0 {
            axis -= 1;
            coords[axis] += 1;
            if coords[axis] < self.upper[axis] {
                self.next = Some(Point { coords });
                break;
            }
            coords[axis] = self.lower[axis];
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RectPoints {}

impl FusedIterator for RectPoints {}
