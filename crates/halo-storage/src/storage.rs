//! The [`RegionStorage`] trait shared by every storage variant.

use crate::error::StorageError;
use halo_core::{IntPoint, IntRect};
use std::ops::Range;

/// A storage instance responsible for one local shape, able to ship the
/// contents of local sub-regions to another instance.
///
/// # Pack/unpack protocol
///
/// Regions passed to [`pack`](Self::pack) and [`unpack`](Self::unpack) are
/// expressed in the storage's *local* frame: relative to
/// `shape().lower()`. `pack` returns one payload per region, in order; the
/// receiving side calls `unpack` with the same number of regions (possibly
/// at different local offsets) and those payloads. Payload contents are
/// relative to their region's lower corner, so the receiver never needs the
/// sender's absolute frame.
///
/// Passing a different number of regions and payloads to `unpack` is a
/// protocol violation by the caller and panics.
pub trait RegionStorage {
    /// What one packed region holds.
    type Payload;

    /// The local sub-region this storage is responsible for, in global
    /// coordinates.
    fn shape(&self) -> &IntRect;

    /// Reallocate for `new_shape`, dropping all contents.
    fn reshape(&mut self, new_shape: IntRect) -> Result<(), StorageError>;

    /// Serialize the contents of each local `region`.
    fn pack(&self, regions: &[IntRect]) -> Result<Vec<Self::Payload>, StorageError>;

    /// Write `payloads` into the matching local `regions`, replacing what
    /// they held.
    ///
    /// Every region and payload is validated before anything is written, so
    /// an `Err` leaves the storage unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `regions.len() != payloads.len()`.
    fn unpack(&mut self, regions: &[IntRect], payloads: Vec<Self::Payload>)
        -> Result<(), StorageError>;

    /// Move to `new_shape`, keeping whatever lies in the overlap of the old
    /// and new shapes.
    ///
    /// Packs the overlap in the old frame, reshapes, and unpacks it in the
    /// new frame. Contents outside the overlap are dropped; the caller is
    /// responsible for shipping them to their new owner beforehand.
    fn reshape_retaining(&mut self, new_shape: IntRect) -> Result<(), StorageError> {
        let old = self.shape().clone();
        if old.ndim() != new_shape.ndim() {
            return Err(halo_core::GeomError::DimensionMismatch {
                expected: old.ndim(),
                found: new_shape.ndim(),
            }
            .into());
        }
        let Some(overlap) = old.intersection(&new_shape) else {
            return self.reshape(new_shape);
        };
        let from_old = overlap.to_local(old.lower());
        let to_new = overlap.to_local(new_shape.lower());
        let payload = self.pack(std::slice::from_ref(&from_old))?;
        self.reshape(new_shape)?;
        self.unpack(std::slice::from_ref(&to_new), payload)
    }
}

/// Reject shapes with no axes.
pub(crate) fn check_shape(shape: &IntRect) -> Result<(), StorageError> {
    if shape.ndim() == 0 {
        return Err(StorageError::ZeroDimensional);
    }
    Ok(())
}

/// Check that a local-frame `region` fits inside `shape` and return it in
/// global coordinates.
pub(crate) fn check_region(region: &IntRect, shape: &IntRect) -> Result<IntRect, StorageError> {
    if region.ndim() != shape.ndim() {
        return Err(halo_core::GeomError::DimensionMismatch {
            expected: shape.ndim(),
            found: region.ndim(),
        }
        .into());
    }
    let global = region.to_global(shape.lower());
    if !shape.contains_rect(&global) {
        return Err(StorageError::RegionOutOfShape {
            region: region.clone(),
            shape: shape.clone(),
        });
    }
    Ok(global)
}

/// Panic unless the unpack call carries one payload per region.
#[track_caller]
pub(crate) fn assert_cardinality(regions: usize, payloads: usize) {
    assert_eq!(
        regions, payloads,
        "pack/unpack protocol violation: {regions} regions but {payloads} payloads"
    );
}

/// Flat index ranges of the contiguous rows (along the last axis) that make
/// up the global rectangle `global` inside a row-major buffer over `shape`.
///
/// `global` must lie within `shape`.
pub(crate) fn row_runs(shape: &IntRect, global: &IntRect) -> Result<Vec<Range<usize>>, StorageError> {
    if global.is_empty() {
        return Ok(Vec::new());
    }
    let last = global.ndim() - 1;
    let width = (global.upper()[last] - global.lower()[last]) as usize;
    let mut row_upper = global.upper().coords().to_vec();
    row_upper[last] = global.lower()[last] + 1;
    let rows = IntRect::new(global.lower().clone(), IntPoint::from(row_upper))?;
    Ok(rows
        .points()
        .filter_map(|start| shape.flat_index(&start))
        .map(|start| start..start + width)
        .collect())
}
