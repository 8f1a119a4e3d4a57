//! Dense one-value-per-cell grid storage.

use crate::error::StorageError;
use crate::storage::{assert_cardinality, check_region, check_shape, row_runs, RegionStorage};
use halo_core::{IntPoint, IntRect};
use tracing::debug;

/// A row-major array holding one `T` per integer cell of its shape.
///
/// Cells are addressed by global grid coordinates; one grid unit is one
/// cell. Packing copies whole rows of a region into a flat buffer.
///
/// # Examples
///
/// ```
/// use halo_core::{IntPoint, IntRect};
/// use halo_storage::{DoubleGrid, RegionStorage};
///
/// let shape = IntRect::new(IntPoint::from([0, 0]), IntPoint::from([4, 4])).unwrap();
/// let mut grid = DoubleGrid::new(shape).unwrap();
/// grid.set(&IntPoint::from([1, 2]), 0.5).unwrap();
/// assert_eq!(grid.get(&IntPoint::from([1, 2])), Some(&0.5));
///
/// let region = IntRect::new(IntPoint::from([1, 1]), IntPoint::from([2, 3])).unwrap();
/// assert_eq!(grid.pack(&[region]).unwrap(), vec![vec![0.0, 0.5]]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DenseGrid<T> {
    shape: IntRect,
    cells: Vec<T>,
}

/// Integer-valued raster (population counts, category ids).
pub type IntGrid = DenseGrid<i32>;

/// Real-valued raster (density, vegetation, pheromone).
pub type DoubleGrid = DenseGrid<f64>;

/// One optional object per cell.
pub type ObjectGrid<T> = DenseGrid<Option<T>>;

impl<T: Clone + Default> DenseGrid<T> {
    /// Create a grid over `shape` filled with `T::default()`.
    pub fn new(shape: IntRect) -> Result<Self, StorageError> {
        Self::filled(shape, T::default())
    }

    /// Create a grid over `shape` with every cell set to `value`.
    pub fn filled(shape: IntRect, value: T) -> Result<Self, StorageError> {
        check_shape(&shape)?;
        Ok(Self {
            cells: vec![value; shape.cell_count()],
            shape,
        })
    }

    /// Value at global cell `point`, or `None` outside the shape.
    pub fn get(&self, point: &IntPoint) -> Option<&T> {
        self.shape.flat_index(point).map(|i| &self.cells[i])
    }

    /// Mutable value at global cell `point`, or `None` outside the shape.
    pub fn get_mut(&mut self, point: &IntPoint) -> Option<&mut T> {
        self.shape.flat_index(point).map(|i| &mut self.cells[i])
    }

    /// Overwrite the cell at `point`, returning its previous value.
    pub fn set(&mut self, point: &IntPoint, value: T) -> Result<T, StorageError> {
        let idx = self.index(point)?;
        Ok(std::mem::replace(&mut self.cells[idx], value))
    }

    /// Overwrite every cell.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// The backing buffer in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// The backing buffer in row-major order, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Every cell with its global coordinate, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (IntPoint, &T)> {
        self.shape.points().zip(self.cells.iter())
    }

    fn index(&self, point: &IntPoint) -> Result<usize, StorageError> {
        self.shape
            .flat_index(point)
            .ok_or_else(|| StorageError::OutOfShape {
                coords: point.coords().iter().map(|&c| c as f64).collect(),
                shape: self.shape.clone(),
            })
    }
}

impl<T: Clone + Default> RegionStorage for DenseGrid<T> {
    type Payload = Vec<T>;

    fn shape(&self) -> &IntRect {
        &self.shape
    }

    fn reshape(&mut self, new_shape: IntRect) -> Result<(), StorageError> {
        check_shape(&new_shape)?;
        debug!(old = ?self.shape, new = ?new_shape, "dense grid reshaped");
        self.cells = vec![T::default(); new_shape.cell_count()];
        self.shape = new_shape;
        Ok(())
    }

    fn pack(&self, regions: &[IntRect]) -> Result<Vec<Vec<T>>, StorageError> {
        let mut out = Vec::with_capacity(regions.len());
        for region in regions {
            let global = check_region(region, &self.shape)?;
            let mut buf = Vec::with_capacity(global.cell_count());
            for run in row_runs(&self.shape, &global)? {
                buf.extend_from_slice(&self.cells[run]);
            }
            out.push(buf);
        }
        debug!(regions = regions.len(), "dense grid packed");
        Ok(out)
    }

    fn unpack(&mut self, regions: &[IntRect], payloads: Vec<Vec<T>>) -> Result<(), StorageError> {
        assert_cardinality(regions.len(), payloads.len());
        let mut plans = Vec::with_capacity(regions.len());
        for (i, (region, payload)) in regions.iter().zip(&payloads).enumerate() {
            let global = check_region(region, &self.shape)?;
            if payload.len() != global.cell_count() {
                return Err(StorageError::PayloadSizeMismatch {
                    region: i,
                    expected: global.cell_count(),
                    found: payload.len(),
                });
            }
            plans.push(row_runs(&self.shape, &global)?);
        }
        for (runs, payload) in plans.into_iter().zip(payloads) {
            let mut offset = 0;
            for run in runs {
                let len = run.len();
                self.cells[run].clone_from_slice(&payload[offset..offset + len]);
                offset += len;
            }
        }
        debug!(regions = regions.len(), "dense grid unpacked");
        Ok(())
    }
}
