//! Error types for coordinate algebra.

use std::error::Error;
use std::fmt;

/// Errors arising from point and rectangle construction or arithmetic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeomError {
    /// Two operands (or an operand and an offset slice) disagree on
    /// dimension.
    DimensionMismatch {
        /// Dimension of the receiver.
        expected: usize,
        /// Dimension of the other operand.
        found: usize,
    },
    /// An axis index is not smaller than the dimension.
    AxisOutOfRange {
        /// The requested axis.
        axis: usize,
        /// Dimension of the point or rectangle.
        ndim: usize,
    },
    /// A rectangle's lower corner exceeds its upper corner on some axis.
    InvertedRect {
        /// First axis on which `lower > upper`.
        axis: usize,
    },
    /// Shrinking a rectangle by a margin would invert it.
    InvalidMargin {
        /// First axis that would invert.
        axis: usize,
    },
}

impl fmt::Display for GeomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Self::AxisOutOfRange { axis, ndim } => {
                write!(f, "axis {axis} out of range for {ndim}-dimensional value")
            }
            Self::InvertedRect { axis } => {
                write!(f, "rectangle lower corner exceeds upper corner on axis {axis}")
            }
            Self::InvalidMargin { axis } => {
                write!(f, "margin would invert rectangle on axis {axis}")
            }
        }
    }
}

impl Error for GeomError {}

/// Return `Err(DimensionMismatch)` unless `expected == found`.
pub(crate) fn check_dims(expected: usize, found: usize) -> Result<(), GeomError> {
    if expected == found {
        Ok(())
    } else {
        Err(GeomError::DimensionMismatch { expected, found })
    }
}

/// Panic with the `DimensionMismatch` message unless `expected == found`.
#[track_caller]
pub(crate) fn assert_dims(expected: usize, found: usize) {
    if let Err(e) = check_dims(expected, found) {
        panic!("{e}");
    }
}
