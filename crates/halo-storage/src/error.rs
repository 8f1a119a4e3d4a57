//! Error types for storage operations.

use halo_core::{GeomError, IntRect};
use std::error::Error;
use std::fmt;

/// Errors arising from storage construction, mutation, or pack/unpack.
#[derive(Clone, Debug, PartialEq)]
pub enum StorageError {
    /// A point or rectangle had the wrong dimension or was malformed.
    Geometry(GeomError),
    /// Storage shapes must have at least one axis.
    ZeroDimensional,
    /// A discretization cell width is not finite and positive.
    InvalidDiscretization {
        /// The offending axis.
        axis: usize,
        /// The rejected width.
        value: f64,
    },
    /// The discretization would need more cells than a storage may hold.
    TooManyCells {
        /// The axis at which the cell count exceeded `limit`.
        axis: usize,
        /// Maximum number of cells per storage.
        limit: usize,
    },
    /// A point lies outside the storage shape.
    OutOfShape {
        /// Components of the offending point.
        coords: Vec<f64>,
        /// The storage shape.
        shape: IntRect,
    },
    /// The object handle has no recorded location.
    UnknownObject {
        /// Debug rendering of the handle.
        handle: String,
    },
    /// A pack/unpack region (local frame) exceeds the storage shape.
    RegionOutOfShape {
        /// The rejected region, relative to the shape's lower corner.
        region: IntRect,
        /// The storage shape.
        shape: IntRect,
    },
    /// A grid payload does not hold one entry per region cell.
    PayloadSizeMismatch {
        /// Index of the region within the unpack call.
        region: usize,
        /// Cells in the region.
        expected: usize,
        /// Entries in the payload.
        found: usize,
    },
    /// A packed object's relative location falls outside its region.
    PayloadOutOfRegion {
        /// Index of the region within the unpack call.
        region: usize,
        /// The relative location carried by the payload.
        coords: Vec<f64>,
    },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(e) => write!(f, "geometry error: {e}"),
            Self::ZeroDimensional => write!(f, "storage shape must have at least one axis"),
            Self::InvalidDiscretization { axis, value } => {
                write!(f, "discretization on axis {axis} must be finite and > 0, got {value}")
            }
            Self::TooManyCells { axis, limit } => {
                write!(f, "cell grid exceeds {limit} cells at axis {axis}")
            }
            Self::OutOfShape { coords, shape } => {
                write!(f, "point {coords:?} outside storage shape {shape:?}")
            }
            Self::UnknownObject { handle } => write!(f, "unknown object {handle}"),
            Self::RegionOutOfShape { region, shape } => {
                write!(f, "region {region:?} exceeds storage shape {shape:?}")
            }
            Self::PayloadSizeMismatch {
                region,
                expected,
                found,
            } => write!(
                f,
                "payload for region {region} has {found} entries, expected {expected}"
            ),
            Self::PayloadOutOfRegion { region, coords } => {
                write!(f, "packed location {coords:?} lies outside region {region}")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GeomError> for StorageError {
    fn from(e: GeomError) -> Self {
        Self::Geometry(e)
    }
}
