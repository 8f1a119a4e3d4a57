//! Continuous-space object storage over a uniform cell grid.
//!
//! [`ContinuousStorage`] keeps an authoritative object → location map and a
//! denormalised cell → objects index. Every proximity query follows the same
//! two phases: the cell index yields a superset of candidates (broad phase),
//! then recorded locations are filtered exactly (narrow phase). Coarse cells
//! therefore cost time, never correctness.

use crate::error::StorageError;
use crate::storage::{assert_cardinality, check_region, check_shape, RegionStorage};
use halo_core::{IntPoint, IntRect, RealPoint, RealRect};
use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

/// Upper bound on the cells of one storage's grid.
pub const MAX_CELLS: usize = 1 << 26;

/// Anything usable as an object identity in a [`ContinuousStorage`].
pub trait ObjectHandle: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> ObjectHandle for T {}

/// The objects of one packed region, with locations relative to the
/// region's lower corner.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PackedObjects<H> {
    /// `(handle, location - region.lower)` pairs.
    pub entries: Vec<(H, RealPoint)>,
}

impl<H> PackedObjects<H> {
    /// Number of packed objects.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the region held no objects.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Objects at continuous locations within a local shape.
///
/// The shape is divided into cells of `discretization[axis]` world units;
/// the cell grid has `ceil(size / discretization) + 1` cells per axis.
///
/// # Invariant
///
/// For every object `o` with location `p`, `o` is a member of
/// `cells[discretize(p)]` and of no other cell.
///
/// # Examples
///
/// ```
/// use halo_core::{IntPoint, IntRect, RealPoint, RealRect};
/// use halo_storage::ContinuousStorage;
///
/// let shape = IntRect::new(IntPoint::from([10, 20]), IntPoint::from([60, 70])).unwrap();
/// let mut storage = ContinuousStorage::new(shape, &[10.0, 10.0]).unwrap();
/// storage.set_location("a", RealPoint::from([23.4, 30.2])).unwrap();
/// storage.set_location("b", RealPoint::from([29.99, 39.99])).unwrap();
///
/// let query = RealRect::new(RealPoint::from([25.0, 35.0]), RealPoint::from([35.0, 47.0])).unwrap();
/// assert_eq!(storage.objects_in(&query), vec![&"b"]);
/// ```
#[derive(Clone, Debug)]
pub struct ContinuousStorage<H: ObjectHandle> {
    shape: IntRect,
    /// `shape` as a real rectangle, cached for containment checks.
    bounds: RealRect,
    discretization: SmallVec<[f64; 4]>,
    /// `[0, cell_grid_size)`.
    grid: IntRect,
    cells: Vec<IndexSet<H>>,
    locations: IndexMap<H, RealPoint>,
}

impl<H: ObjectHandle> ContinuousStorage<H> {
    /// Create an empty storage for `shape` with the given per-axis cell
    /// width.
    ///
    /// # Errors
    ///
    /// - `ZeroDimensional` if `shape` has no axes.
    /// - `Geometry(DimensionMismatch)` if `discretization.len()` differs
    ///   from the shape's dimension.
    /// - `InvalidDiscretization` if any width is not finite and positive.
    /// - `TooManyCells` if the widths are so small that the cell grid would
    ///   exceed [`MAX_CELLS`].
    pub fn new(shape: IntRect, discretization: &[f64]) -> Result<Self, StorageError> {
        check_shape(&shape)?;
        if discretization.len() != shape.ndim() {
            return Err(halo_core::GeomError::DimensionMismatch {
                expected: shape.ndim(),
                found: discretization.len(),
            }
            .into());
        }
        if let Some((axis, &value)) = discretization
            .iter()
            .enumerate()
            .find(|(_, d)| !d.is_finite() || **d <= 0.0)
        {
            return Err(StorageError::InvalidDiscretization { axis, value });
        }
        let grid = Self::cell_grid(&shape, discretization)?;
        Ok(Self {
            bounds: shape.to_real(),
            shape,
            discretization: SmallVec::from_slice(discretization),
            cells: vec![IndexSet::new(); grid.cell_count()],
            grid,
            locations: IndexMap::new(),
        })
    }

    fn cell_grid(shape: &IntRect, discretization: &[f64]) -> Result<IntRect, StorageError> {
        let size = shape.size();
        let mut dims = Vec::with_capacity(size.ndim());
        let mut count = 1usize;
        for (axis, (&s, &d)) in size.coords().iter().zip(discretization).enumerate() {
            let too_many = StorageError::TooManyCells {
                axis,
                limit: MAX_CELLS,
            };
            let n = (f64::from(s) / d).ceil() + 1.0;
            if !(n <= MAX_CELLS as f64) {
                return Err(too_many);
            }
            count = count
                .checked_mul(n as usize)
                .filter(|&c| c <= MAX_CELLS)
                .ok_or(too_many)?;
            dims.push(n as i32);
        }
        Ok(IntRect::new(IntPoint::zeros(dims.len()), IntPoint::from(dims))?)
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Per-axis cell width.
    pub fn discretization(&self) -> &[f64] {
        &self.discretization
    }

    /// Number of cells per axis.
    pub fn cell_grid_size(&self) -> &IntPoint {
        self.grid.upper()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// `true` if no objects are stored.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// `true` if `obj` has a recorded location.
    pub fn contains_object(&self, obj: &H) -> bool {
        self.locations.contains_key(obj)
    }

    /// The recorded location of `obj`.
    pub fn location(&self, obj: &H) -> Option<&RealPoint> {
        self.locations.get(obj)
    }

    /// Every stored object with its location.
    pub fn objects(&self) -> impl Iterator<Item = (&H, &RealPoint)> {
        self.locations.iter()
    }

    /// Objects indexed under a discretized cell coordinate.
    pub fn objects_in_cell(&self, cell: &IntPoint) -> impl Iterator<Item = &H> {
        self.grid
            .flat_index(cell)
            .map(|idx| self.cells[idx].iter())
            .into_iter()
            .flatten()
    }

    // ── Discretization ──────────────────────────────────────────

    /// Map a global point to its cell coordinate:
    /// `floor((point - shape.lower) / discretization)` per axis.
    ///
    /// `point` must lie within the shape. This is a hot-path precondition
    /// and is only checked in debug builds.
    pub fn discretize(&self, point: &RealPoint) -> IntPoint {
        let cell = self.raw_cell(point);
        debug_assert!(
            self.grid.contains(&cell),
            "discretize: {point:?} outside shape {:?}",
            self.shape
        );
        cell
    }

    fn raw_cell(&self, point: &RealPoint) -> IntPoint {
        let lower = self.shape.lower();
        let coords: Vec<i32> = (0..point.ndim())
            .map(|i| ((point[i] - lower[i] as f64) / self.discretization[i]).floor() as i32)
            .collect();
        IntPoint::from(coords)
    }

    /// Cell coordinate of `point`, clamped onto the cell grid.
    fn clamped_cell(&self, point: &RealPoint) -> IntPoint {
        let raw = self.raw_cell(point);
        let max = self.grid.upper().shift_all(-1);
        raw.component_max(self.grid.lower()).component_min(&max)
    }

    /// The block of cells spanned by `[lower_cell, upper_cell]` (inclusive),
    /// clipped to the grid.
    fn cell_block(&self, lower_cell: &IntPoint, upper_cell: &IntPoint) -> Option<IntRect> {
        let end: Vec<i32> = upper_cell
            .coords()
            .iter()
            .map(|&c| c.saturating_add(1))
            .collect();
        let block = IntRect::new(lower_cell.clone(), IntPoint::from(end)).ok()?;
        block.intersection(&self.grid)
    }

    fn check_point(&self, point: &RealPoint) -> Result<(), StorageError> {
        if point.ndim() != self.shape.ndim() {
            return Err(halo_core::GeomError::DimensionMismatch {
                expected: self.shape.ndim(),
                found: point.ndim(),
            }
            .into());
        }
        if !self.bounds.contains(point) {
            return Err(StorageError::OutOfShape {
                coords: point.coords().to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(())
    }

    fn cell_index(&self, point: &RealPoint) -> usize {
        let cell = self.discretize(point);
        let mut idx = 0usize;
        for (i, &c) in cell.coords().iter().enumerate() {
            idx = idx * self.grid.upper()[i] as usize + c as usize;
        }
        idx
    }

    fn unknown(obj: &H) -> StorageError {
        StorageError::UnknownObject {
            handle: format!("{obj:?}"),
        }
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Insert `obj` at `point`, or move it there if already stored.
    ///
    /// # Errors
    ///
    /// Returns `OutOfShape` if `point` is not inside the shape (half-open),
    /// or `Geometry(DimensionMismatch)` for a wrong-dimension point. The
    /// storage is unchanged on error.
    pub fn set_location(&mut self, obj: H, point: RealPoint) -> Result<(), StorageError> {
        self.check_point(&point)?;
        let new_idx = self.cell_index(&point);
        match self.locations.get_mut(&obj) {
            Some(loc) => {
                let old = std::mem::replace(loc, point);
                let old_idx = self.cell_index(&old);
                if old_idx != new_idx {
                    self.cells[old_idx].shift_remove(&obj);
                    self.cells[new_idx].insert(obj);
                }
            }
            None => {
                self.cells[new_idx].insert(obj.clone());
                self.locations.insert(obj, point);
            }
        }
        Ok(())
    }

    /// Remove `obj`, returning its last location.
    pub fn remove_object(&mut self, obj: &H) -> Result<RealPoint, StorageError> {
        let loc = self.locations.swap_remove(obj).ok_or_else(|| Self::unknown(obj))?;
        let idx = self.cell_index(&loc);
        self.cells[idx].shift_remove(obj);
        Ok(loc)
    }

    /// Remove every object in `objs`.
    ///
    /// All handles are checked first; if any is unknown nothing is removed.
    pub fn remove_objects<'a, I>(&mut self, objs: I) -> Result<(), StorageError>
    where
        I: IntoIterator<Item = &'a H>,
        H: 'a,
    {
        let objs: Vec<&H> = objs.into_iter().collect();
        if let Some(missing) = objs.iter().find(|o| !self.locations.contains_key(**o)) {
            return Err(Self::unknown(missing));
        }
        for obj in objs {
            // Duplicates in `objs` are already gone on the second visit.
            if self.locations.contains_key(obj) {
                self.remove_object(obj)?;
            }
        }
        Ok(())
    }

    /// Remove every object located exactly at `point`.
    pub fn remove_objects_at(&mut self, point: &RealPoint) -> Vec<H> {
        let doomed: Vec<H> = self.objects_at(point).into_iter().cloned().collect();
        self.remove_all(&doomed);
        doomed
    }

    /// Remove every object located inside `rect` (global coordinates).
    pub fn remove_objects_in(&mut self, rect: &RealRect) -> Vec<H> {
        let doomed: Vec<H> = self.objects_in(rect).into_iter().cloned().collect();
        self.remove_all(&doomed);
        doomed
    }

    fn remove_all(&mut self, objs: &[H]) {
        for obj in objs {
            if let Some(loc) = self.locations.swap_remove(obj) {
                let idx = self.cell_index(&loc);
                self.cells[idx].shift_remove(obj);
            }
        }
    }

    /// Drop every object, keeping the shape.
    pub fn clear(&mut self) {
        self.locations.clear();
        self.cells.iter_mut().for_each(IndexSet::clear);
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Objects whose recorded location equals `point` exactly.
    ///
    /// Returns nothing for points outside the shape.
    pub fn objects_at(&self, point: &RealPoint) -> Vec<&H> {
        if point.ndim() != self.shape.ndim() || !self.bounds.contains(point) {
            return Vec::new();
        }
        self.cells[self.cell_index(point)]
            .iter()
            .filter(|o| self.locations.get(*o) == Some(point))
            .collect()
    }

    /// Objects whose recorded location lies in `rect` (global, half-open).
    ///
    /// Results are ordered by cell (row-major), then by insertion within a
    /// cell.
    pub fn objects_in(&self, rect: &RealRect) -> Vec<&H> {
        if rect.ndim() != self.shape.ndim() || rect.is_empty() {
            return Vec::new();
        }
        let lo = self.clamped_cell(rect.lower());
        let hi = self.clamped_cell(rect.upper());
        let Some(block) = self.cell_block(&lo, &hi) else {
            return Vec::new();
        };
        self.scan(&block, |_, loc| rect.contains(loc))
    }

    /// Broad phase over `block`, narrow phase via `keep`.
    fn scan<'a>(&'a self, block: &IntRect, keep: impl Fn(&H, &RealPoint) -> bool) -> Vec<&'a H> {
        let mut out = Vec::new();
        for cell in block.points() {
            let Some(idx) = self.grid.flat_index(&cell) else {
                continue;
            };
            for obj in &self.cells[idx] {
                if let Some(loc) = self.locations.get(obj) {
                    if keep(obj, loc) {
                        out.push(obj);
                    }
                }
            }
        }
        out
    }

    /// Objects within Euclidean `radius` (inclusive) of `point`.
    pub fn objects_within(&self, point: &RealPoint, radius: f64) -> Vec<&H> {
        self.within(point, radius, None)
    }

    /// Objects other than `obj` within Euclidean `radius` (inclusive) of
    /// `obj`'s location.
    pub fn neighbors_within(&self, obj: &H, radius: f64) -> Result<Vec<&H>, StorageError> {
        let loc = self.locations.get(obj).ok_or_else(|| Self::unknown(obj))?;
        Ok(self.within(loc, radius, Some(obj)))
    }

    fn within(&self, point: &RealPoint, radius: f64, exclude: Option<&H>) -> Vec<&H> {
        if point.ndim() != self.shape.ndim() || !(radius >= 0.0) {
            return Vec::new();
        }
        let center = self.raw_cell(point);
        let reach: Vec<i32> = self
            .discretization
            .iter()
            .map(|&d| (radius / d).ceil().min(i32::MAX as f64 / 2.0) as i32)
            .collect();
        let lo = center.zip_sub(&reach);
        let hi = center.zip_add(&reach);
        let Some(block) = self.cell_block(&lo, &hi) else {
            return Vec::new();
        };
        self.scan(&block, |o, loc| {
            Some(o) != exclude && loc.euclidean(point) <= radius
        })
    }

    /// The `k` objects other than `obj` closest to `obj`'s location.
    ///
    /// See [`nearest_to`](Self::nearest_to) for ordering and ties.
    pub fn nearest_neighbors(&self, obj: &H, k: usize) -> Result<Vec<&H>, StorageError> {
        let loc = self.locations.get(obj).ok_or_else(|| Self::unknown(obj))?;
        Ok(self.nearest(loc, k, Some(obj)))
    }

    /// The `k` objects closest to `point`, nearest first.
    ///
    /// Searches outward from `point`'s cell one Chebyshev ring of cells at a
    /// time, keeping the best `k` candidates by true Euclidean distance. The
    /// search stops once the `k`-th best is no farther than the nearest
    /// possible object in the next ring, or when the grid is exhausted; in
    /// the latter case fewer than `k` objects are returned.
    ///
    /// Ties keep discovery order: nearer rings first, then row-major cell
    /// order, then insertion order within a cell.
    pub fn nearest_to(&self, point: &RealPoint, k: usize) -> Vec<&H> {
        self.nearest(point, k, None)
    }

    fn nearest(&self, point: &RealPoint, k: usize, exclude: Option<&H>) -> Vec<&H> {
        if k == 0 || point.ndim() != self.shape.ndim() || self.is_empty() {
            return Vec::new();
        }
        let center = self.clamped_cell(point);
        let size = self.grid.upper();
        let max_layer = (0..center.ndim())
            .map(|i| center[i].max(size[i] - center[i]))
            .max()
            .unwrap_or(0);
        let min_width = self
            .discretization
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);

        let mut best: Vec<(f64, &H)> = Vec::with_capacity(k.min(self.len()) + 1);
        for layer in 0..=max_layer {
            let lo = center.shift_all(-layer);
            let hi = center.shift_all(layer);
            let Some(block) = self.cell_block(&lo, &hi) else {
                break;
            };
            for cell in block.points() {
                if chebyshev(&cell, &center) != layer {
                    continue;
                }
                let Some(idx) = self.grid.flat_index(&cell) else {
                    continue;
                };
                for obj in &self.cells[idx] {
                    if Some(obj) == exclude {
                        continue;
                    }
                    if let Some(loc) = self.locations.get(obj) {
                        best.push((loc.euclidean(point), obj));
                    }
                }
            }
            // Stable: earlier discoveries win ties.
            best.sort_by(|a, b| a.0.total_cmp(&b.0));
            best.truncate(k);
            trace!(layer, candidates = best.len(), "knn ring expanded");
            if best.len() == k && best[k - 1].0 <= layer as f64 * min_width {
                break;
            }
        }
        best.into_iter().map(|(_, o)| o).collect()
    }
}

fn chebyshev(a: &IntPoint, b: &IntPoint) -> i32 {
    (0..a.ndim()).map(|i| (a[i] - b[i]).abs()).max().unwrap_or(0)
}

trait ZipOffsets {
    fn zip_add(&self, offsets: &[i32]) -> IntPoint;
    fn zip_sub(&self, offsets: &[i32]) -> IntPoint;
}

impl ZipOffsets for IntPoint {
    fn zip_add(&self, offsets: &[i32]) -> IntPoint {
        (0..self.ndim())
            .map(|i| self[i].saturating_add(offsets[i]))
            .collect::<Vec<_>>()
            .into()
    }

    fn zip_sub(&self, offsets: &[i32]) -> IntPoint {
        (0..self.ndim())
            .map(|i| self[i].saturating_sub(offsets[i]))
            .collect::<Vec<_>>()
            .into()
    }
}

impl<H: ObjectHandle> RegionStorage for ContinuousStorage<H> {
    type Payload = PackedObjects<H>;

    fn shape(&self) -> &IntRect {
        &self.shape
    }

    fn reshape(&mut self, new_shape: IntRect) -> Result<(), StorageError> {
        if new_shape.ndim() != self.shape.ndim() {
            return Err(halo_core::GeomError::DimensionMismatch {
                expected: self.shape.ndim(),
                found: new_shape.ndim(),
            }
            .into());
        }
        let grid = Self::cell_grid(&new_shape, &self.discretization)?;
        debug!(
            old = ?self.shape,
            new = ?new_shape,
            dropped = self.locations.len(),
            cells = grid.cell_count(),
            "continuous storage reshaped"
        );
        self.cells = vec![IndexSet::new(); grid.cell_count()];
        self.grid = grid;
        self.bounds = new_shape.to_real();
        self.shape = new_shape;
        self.locations.clear();
        Ok(())
    }

    fn pack(&self, regions: &[IntRect]) -> Result<Vec<PackedObjects<H>>, StorageError> {
        let mut out = Vec::with_capacity(regions.len());
        for region in regions {
            let global = check_region(region, &self.shape)?;
            let origin = global.lower().to_real();
            let entries = self
                .objects_in(&global.to_real())
                .into_iter()
                .filter_map(|o| {
                    let loc = self.locations.get(o)?;
                    Some((o.clone(), loc - &origin))
                })
                .collect();
            out.push(PackedObjects { entries });
        }
        debug!(
            regions = regions.len(),
            objects = out.iter().map(PackedObjects::len).sum::<usize>(),
            "continuous storage packed"
        );
        Ok(out)
    }

    fn unpack(
        &mut self,
        regions: &[IntRect],
        payloads: Vec<PackedObjects<H>>,
    ) -> Result<(), StorageError> {
        assert_cardinality(regions.len(), payloads.len());

        let mut globals = Vec::with_capacity(regions.len());
        for (i, (region, payload)) in regions.iter().zip(&payloads).enumerate() {
            let global = check_region(region, &self.shape)?;
            let extent = IntRect::new(IntPoint::zeros(region.ndim()), region.size())?.to_real();
            for (_, rel) in &payload.entries {
                if rel.ndim() != extent.ndim() || !extent.contains(rel) {
                    return Err(StorageError::PayloadOutOfRegion {
                        region: i,
                        coords: rel.coords().to_vec(),
                    });
                }
            }
            globals.push(global);
        }

        let mut placed = 0usize;
        for (global, payload) in globals.iter().zip(payloads) {
            // Stale copies from a previous exchange are replaced wholesale.
            self.remove_objects_in(&global.to_real());
            let origin = global.lower().to_real();
            for (obj, rel) in payload.entries {
                let loc = &rel + &origin;
                // Rounding can push a location a hair past the region edge;
                // keep it in the last cell of the region.
                let loc = if global.to_real().contains(&loc) {
                    loc
                } else {
                    clamp_into(&loc, global)
                };
                self.set_location(obj, loc)?;
                placed += 1;
            }
        }
        debug!(regions = regions.len(), objects = placed, "continuous storage unpacked");
        Ok(())
    }
}

/// Clamp `point` into `[rect.lower, rect.upper)`.
fn clamp_into(point: &RealPoint, rect: &IntRect) -> RealPoint {
    (0..point.ndim())
        .map(|i| {
            let lo = rect.lower()[i] as f64;
            let hi = rect.upper()[i] as f64;
            point[i].max(lo).min(hi.next_down())
        })
        .collect::<Vec<_>>()
        .into()
}
