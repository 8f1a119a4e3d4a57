//! Grid storage holding zero or more values per cell.

use crate::error::StorageError;
use crate::storage::{assert_cardinality, check_region, check_shape, row_runs, RegionStorage};
use halo_core::{IntPoint, IntRect};
use tracing::debug;

/// A row-major array of bags, one per integer cell of its shape.
///
/// Suited to grids where several agents may share a site. A packed region
/// is one bag per cell in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct BagGrid<T> {
    shape: IntRect,
    cells: Vec<Vec<T>>,
    len: usize,
}

impl<T: Clone + PartialEq> BagGrid<T> {
    /// Create an empty bag grid over `shape`.
    pub fn new(shape: IntRect) -> Result<Self, StorageError> {
        check_shape(&shape)?;
        Ok(Self {
            cells: vec![Vec::new(); shape.cell_count()],
            shape,
            len: 0,
        })
    }

    /// Total number of values across all cells.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if every bag is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `value` to the bag at `point`.
    pub fn add(&mut self, point: &IntPoint, value: T) -> Result<(), StorageError> {
        let idx = self.index(point)?;
        self.cells[idx].push(value);
        self.len += 1;
        Ok(())
    }

    /// Remove the first occurrence of `value` from the bag at `point`.
    ///
    /// Returns `false` if the bag did not hold it or `point` is outside the
    /// shape.
    pub fn remove(&mut self, point: &IntPoint, value: &T) -> bool {
        let Some(idx) = self.shape.flat_index(point) else {
            return false;
        };
        let bag = &mut self.cells[idx];
        match bag.iter().position(|v| v == value) {
            Some(pos) => {
                bag.remove(pos);
                self.len -= 1;
                true
            }
            None => false,
        }
    }

    /// The bag at `point`; empty outside the shape.
    pub fn get(&self, point: &IntPoint) -> &[T] {
        self.shape
            .flat_index(point)
            .map_or(&[][..], |i| self.cells[i].as_slice())
    }

    /// Empty the bag at `point`, returning its contents.
    pub fn take(&mut self, point: &IntPoint) -> Vec<T> {
        let Some(idx) = self.shape.flat_index(point) else {
            return Vec::new();
        };
        let bag = std::mem::take(&mut self.cells[idx]);
        self.len -= bag.len();
        bag
    }

    /// Empty the bag at `point`.
    pub fn clear_cell(&mut self, point: &IntPoint) {
        self.take(point);
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

impl<T: Clone + PartialEq> RegionStorage for BagGrid<T> {
    type Payload = Vec<Vec<T>>;

    fn shape(&self) -> &IntRect {
        &self.shape
    }

    fn reshape(&mut self, new_shape: IntRect) -> Result<(), StorageError> {
        check_shape(&new_shape)?;
        debug!(old = ?self.shape, new = ?new_shape, dropped = self.len, "bag grid reshaped");
        self.cells = vec![Vec::new(); new_shape.cell_count()];
        self.shape = new_shape;
        self.len = 0;
        Ok(())
    }

    fn pack(&self, regions: &[IntRect]) -> Result<Vec<Vec<Vec<T>>>, StorageError> {
        let mut out = Vec::with_capacity(regions.len());
        for region in regions {
            let global = check_region(region, &self.shape)?;
            let mut bags = Vec::with_capacity(global.cell_count());
            for run in row_runs(&self.shape, &global)? {
                bags.extend_from_slice(&self.cells[run]);
            }
            out.push(bags);
        }
        debug!(regions = regions.len(), "bag grid packed");
        Ok(out)
    }

    fn unpack(
        &mut self,
        regions: &[IntRect],
        payloads: Vec<Vec<Vec<T>>>,
    ) -> Result<(), StorageError> {
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
            let mut incoming = payload.into_iter();
            for idx in runs.into_iter().flatten() {
                let bag = incoming.next().unwrap_or_default();
                self.len = self.len - self.cells[idx].len() + bag.len();
                self.cells[idx] = bag;
            }
        }
        debug!(regions = regions.len(), values = self.len, "bag grid unpacked");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn irect(lo: [i32; 2], hi: [i32; 2]) -> IntRect {
        IntRect::new(IntPoint::from(lo), IntPoint::from(hi)).unwrap()
    }

    fn pt(x: i32, y: i32) -> IntPoint {
        IntPoint::from([x, y])
    }

    #[test]
    fn add_remove_take() {
        let mut g = BagGrid::new(irect([0, 0], [3, 3])).unwrap();
        g.add(&pt(1, 1), 'a').unwrap();
        g.add(&pt(1, 1), 'b').unwrap();
        g.add(&pt(1, 1), 'a').unwrap();
        assert_eq!(g.len(), 3);
        assert!(g.remove(&pt(1, 1), &'a'));
        assert_eq!(g.get(&pt(1, 1)), &['b', 'a']);
        assert!(!g.remove(&pt(2, 2), &'a'));
        assert!(!g.remove(&pt(9, 9), &'a'));
        assert_eq!(g.take(&pt(1, 1)), vec!['b', 'a']);
        assert!(g.is_empty());
        assert!(g.get(&pt(9, 9)).is_empty());
        assert!(g.add(&pt(3, 0), 'x').is_err());
    }

    #[test]
    fn pack_unpack_moves_bags() {
        let mut src = BagGrid::new(irect([0, 0], [4, 4])).unwrap();
        src.add(&pt(1, 1), 10).unwrap();
        src.add(&pt(1, 1), 11).unwrap();
        src.add(&pt(2, 1), 20).unwrap();
        let packed = src.pack(&[irect([1, 1], [3, 2])]).unwrap();
        assert_eq!(packed, vec![vec![vec![10, 11], vec![20]]]);

        let mut dst = BagGrid::new(irect([10, 10], [12, 12])).unwrap();
        dst.add(&pt(10, 11), 99).unwrap();
        dst.add(&pt(11, 11), 98).unwrap();
        dst.unpack(&[irect([0, 1], [2, 2])], packed).unwrap();
        assert_eq!(dst.get(&pt(10, 11)), &[10, 11]);
        assert_eq!(dst.get(&pt(11, 11)), &[20]);
        assert_eq!(dst.len(), 3);
    }

    #[test]
    fn unpack_size_mismatch_leaves_grid_untouched() {
        let mut g = BagGrid::new(irect([0, 0], [2, 2])).unwrap();
        g.add(&pt(0, 0), 1).unwrap();
        let err = g.unpack(&[irect([0, 0], [2, 2])], vec![vec![vec![5]]]).unwrap_err();
        assert!(matches!(err, StorageError::PayloadSizeMismatch { expected: 4, found: 1, .. }));
        assert_eq!(g.get(&pt(0, 0)), &[1]);
    }

    #[test]
    fn reshape_clears_count() {
        let mut g = BagGrid::new(irect([0, 0], [2, 2])).unwrap();
        g.add(&pt(0, 0), 1).unwrap();
        g.clear_cell(&pt(0, 0));
        g.add(&pt(1, 1), 2).unwrap();
        g.reshape(irect([0, 0], [5, 5])).unwrap();
        assert!(g.is_empty());
        assert_eq!(g.shape().cell_count(), 25);
    }
}
