//! The partition collaborator and a uniform grid implementation.

use crate::error::PartitionError;
use halo_core::{IntPoint, IntRect, PartitionId, RealPoint, Topology};

/// Knows how the global world is divided and which piece is local.
///
/// Storages never consult a partition themselves; layout and migration
/// code receives one explicitly.
pub trait Partition {
    /// The whole simulation world in grid units.
    fn world_bounds(&self) -> &IntRect;

    /// Boundary policy of the world.
    fn topology(&self) -> Topology;

    /// Number of partitions, ids `0..partition_count()`.
    fn partition_count(&self) -> usize;

    /// The partition this process is responsible for.
    fn local_id(&self) -> PartitionId;

    /// Owned bounds of partition `id`.
    fn bounds_of(&self, id: PartitionId) -> Result<IntRect, PartitionError>;

    /// The partition owning `point`, after applying the topology.
    ///
    /// `None` for points outside a bounded world.
    ///
    /// # Panics
    ///
    /// Panics if `point` does not match the world's dimension.
    fn partition_of(&self, point: &RealPoint) -> Option<PartitionId>;

    /// Owned bounds of the local partition.
    fn local_bounds(&self) -> Result<IntRect, PartitionError> {
        self.bounds_of(self.local_id())
    }
}

/// Splits the world into an axis-aligned grid of `splits[axis]` slabs per
/// axis.
///
/// Slabs along an axis are `size / splits` wide; the last slab absorbs the
/// remainder. Partition ids enumerate the slab grid row-major, last axis
/// fastest.
///
/// # Examples
///
/// ```
/// use halo_core::{IntPoint, IntRect, PartitionId, RealPoint, Topology};
/// use halo_partition::{Partition, UniformPartition};
///
/// let world = IntRect::new(IntPoint::from([0, 0]), IntPoint::from([10, 7])).unwrap();
/// let part = UniformPartition::new(world, &[3, 2], Topology::Bounded, PartitionId(0)).unwrap();
/// assert_eq!(part.partition_count(), 6);
/// assert_eq!(
///     part.bounds_of(PartitionId(5)).unwrap(),
///     IntRect::new(IntPoint::from([6, 3]), IntPoint::from([10, 7])).unwrap()
/// );
/// assert_eq!(part.partition_of(&RealPoint::from([9.5, 6.9])), Some(PartitionId(5)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct UniformPartition {
    world: IntRect,
    splits: Vec<u32>,
    topology: Topology,
    local: PartitionId,
    count: usize,
}

impl UniformPartition {
    /// Build the partition grid and select `local` as this process's piece.
    ///
    /// Every axis needs at least one slab, and no more slabs than grid units.
    pub fn new(
        world: IntRect,
        splits: &[u32],
        topology: Topology,
        local: PartitionId,
    ) -> Result<Self, PartitionError> {
        if splits.len() != world.ndim() {
            return Err(halo_core::GeomError::DimensionMismatch {
                expected: world.ndim(),
                found: splits.len(),
            }
            .into());
        }
        if world.ndim() == 0 {
            return Err(PartitionError::InvalidLayout {
                reason: "world must have at least one axis".into(),
            });
        }
        let size = world.size();
        for (axis, &n) in splits.iter().enumerate() {
            if n == 0 || i64::from(n) > i64::from(size[axis]) {
                return Err(PartitionError::InvalidLayout {
                    reason: format!(
                        "cannot split axis {axis} of width {} into {n} slabs",
                        size[axis]
                    ),
                });
            }
        }
        let count = splits.iter().map(|&n| n as usize).product();
        if local.index() >= count {
            return Err(PartitionError::UnknownPartition { id: local, count });
        }
        Ok(Self {
            world,
            splits: splits.to_vec(),
            topology,
            local,
            count,
        })
    }

    /// The same partition grid viewed from partition `id`.
    pub fn with_local(&self, id: PartitionId) -> Result<Self, PartitionError> {
        self.check_id(id)?;
        Ok(Self {
            local: id,
            ..self.clone()
        })
    }

    /// Slabs per axis.
    pub fn splits(&self) -> &[u32] {
        &self.splits
    }

    /// Every partition id in order.
    pub fn ids(&self) -> impl Iterator<Item = PartitionId> {
        (0..self.count as u32).map(PartitionId)
    }

    fn check_id(&self, id: PartitionId) -> Result<(), PartitionError> {
        if id.index() < self.count {
            Ok(())
        } else {
            Err(PartitionError::UnknownPartition {
                id,
                count: self.count,
            })
        }
    }

    fn slab_width(&self, axis: usize) -> i32 {
        let size = self.world.upper()[axis] - self.world.lower()[axis];
        size / self.splits[axis] as i32
    }

    /// Slab index per axis for a partition id.
    fn slab_of(&self, id: PartitionId) -> Vec<u32> {
        let mut rem = id.0;
        let mut slab = vec![0; self.splits.len()];
        for axis in (0..self.splits.len()).rev() {
            slab[axis] = rem % self.splits[axis];
            rem /= self.splits[axis];
        }
        slab
    }
}

impl Partition for UniformPartition {
    fn world_bounds(&self) -> &IntRect {
        &self.world
    }

    fn topology(&self) -> Topology {
        self.topology
    }

    fn partition_count(&self) -> usize {
        self.count
    }

    fn local_id(&self) -> PartitionId {
        self.local
    }

    fn bounds_of(&self, id: PartitionId) -> Result<IntRect, PartitionError> {
        self.check_id(id)?;
        let slab = self.slab_of(id);
        let mut lower = Vec::with_capacity(slab.len());
        let mut upper = Vec::with_capacity(slab.len());
        for (axis, &s) in slab.iter().enumerate() {
            let width = self.slab_width(axis);
            let lo = self.world.lower()[axis] + s as i32 * width;
            lower.push(lo);
            upper.push(if s + 1 == self.splits[axis] {
                self.world.upper()[axis]
            } else {
                lo + width
            });
        }
        Ok(IntRect::new(IntPoint::from(lower), IntPoint::from(upper))?)
    }

    fn partition_of(&self, point: &RealPoint) -> Option<PartitionId> {
        let p = self.topology.resolve(point, &self.world.to_real())?;
        let mut id = 0u32;
        for axis in 0..self.splits.len() {
            let offset = p[axis] - f64::from(self.world.lower()[axis]);
            let slab = (offset / f64::from(self.slab_width(axis))).floor() as i64;
            let slab = slab.clamp(0, i64::from(self.splits[axis]) - 1) as u32;
            id = id * self.splits[axis] + slab;
        }
        Some(PartitionId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn world(w: i32, h: i32) -> IntRect {
        IntRect::new(IntPoint::from([0, 0]), IntPoint::from([w, h])).unwrap()
    }

    fn irect(lo: [i32; 2], hi: [i32; 2]) -> IntRect {
        IntRect::new(IntPoint::from(lo), IntPoint::from(hi)).unwrap()
    }

    // ── Construction ────────────────────────────────────────────

    #[test]
    fn rejects_bad_splits() {
        let w = world(10, 7);
        assert!(matches!(
            UniformPartition::new(w.clone(), &[0, 1], Topology::Bounded, PartitionId(0)),
            Err(PartitionError::InvalidLayout { .. })
        ));
        assert!(matches!(
            UniformPartition::new(w.clone(), &[11, 1], Topology::Bounded, PartitionId(0)),
            Err(PartitionError::InvalidLayout { .. })
        ));
        assert!(matches!(
            UniformPartition::new(w.clone(), &[2], Topology::Bounded, PartitionId(0)),
            Err(PartitionError::Geometry(_))
        ));
        assert_eq!(
            UniformPartition::new(w, &[2, 2], Topology::Bounded, PartitionId(4)),
            Err(PartitionError::UnknownPartition {
                id: PartitionId(4),
                count: 4
            })
        );
    }

    // ── Bounds ──────────────────────────────────────────────────

    #[test]
    fn last_slab_absorbs_remainder() {
        let p = UniformPartition::new(world(10, 7), &[3, 2], Topology::Bounded, PartitionId(0))
            .unwrap();
        let all: Vec<_> = p.ids().map(|id| p.bounds_of(id).unwrap()).collect();
        assert_eq!(
            all,
            vec![
                irect([0, 0], [3, 3]),
                irect([0, 3], [3, 7]),
                irect([3, 0], [6, 3]),
                irect([3, 3], [6, 7]),
                irect([6, 0], [10, 3]),
                irect([6, 3], [10, 7]),
            ]
        );
        assert_eq!(p.local_bounds().unwrap(), irect([0, 0], [3, 3]));
        assert!(p.bounds_of(PartitionId(6)).is_err());
    }

    #[test]
    fn with_local_changes_view_only() {
        let p = UniformPartition::new(world(8, 8), &[2, 2], Topology::Toroidal, PartitionId(0))
            .unwrap();
        let q = p.with_local(PartitionId(3)).unwrap();
        assert_eq!(q.local_bounds().unwrap(), irect([4, 4], [8, 8]));
        assert_eq!(q.topology(), Topology::Toroidal);
        assert!(p.with_local(PartitionId(4)).is_err());
    }

    // ── Ownership ───────────────────────────────────────────────

    #[test]
    fn partition_of_respects_topology() {
        let bounded =
            UniformPartition::new(world(10, 7), &[3, 2], Topology::Bounded, PartitionId(0))
                .unwrap();
        let torus = UniformPartition::new(world(10, 7), &[3, 2], Topology::Toroidal, PartitionId(0))
            .unwrap();
        let off = RealPoint::from([10.5, -0.5]);
        assert_eq!(bounded.partition_of(&off), None);
        assert_eq!(torus.partition_of(&off), Some(PartitionId(1)));
        assert_eq!(
            bounded.partition_of(&RealPoint::from([5.999, 3.0])),
            Some(PartitionId(3))
        );
    }

    proptest! {
        #[test]
        fn owner_contains_point(
            x in 0.0f64..23.0,
            y in 0.0f64..17.0,
            sx in 1u32..6,
            sy in 1u32..6,
        ) {
            let p = UniformPartition::new(world(23, 17), &[sx, sy], Topology::Bounded, PartitionId(0))
                .unwrap();
            let point = RealPoint::from([x, y]);
            let owner = p.partition_of(&point).unwrap();
            prop_assert!(p.bounds_of(owner).unwrap().to_real().contains(&point));
        }
    }
}
