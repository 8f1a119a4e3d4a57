//! Halo and private parts of a partition and its exchange regions.

use crate::config::HaloConfig;
use crate::error::PartitionError;
use crate::partition::Partition;
use halo_core::{IntPoint, IntRect, PartitionId};
use halo_storage::{ContinuousStorage, DenseGrid, ObjectHandle};
use tracing::debug;

/// What the local partition exchanges with one neighbour.
///
/// All regions are in the local storage frame (relative to
/// [`HaloLayout::halo_part`]'s lower corner). `send[i]` on this side and
/// `recv[i]` on the neighbour's side describe the same cells, so payloads
/// can be matched by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NeighbourRegions {
    /// The neighbouring partition. On a torus narrow enough that a
    /// partition borders itself, this can be the local id.
    pub id: PartitionId,
    /// Owned cells that fall inside the neighbour's halo.
    pub send: Vec<IntRect>,
    /// Halo cells owned by the neighbour.
    pub recv: Vec<IntRect>,
}

/// Geometry of one partition's storage and its halo exchange.
///
/// ```text
///   +-------------------------+  halo_part (storage shape)
///   |  +-------------------+  |
///   |  |  +-------------+  |  |
///   |  |  | private_part |  |  |
///   |  |  +-------------+  |  |
///   |  +-------------------+  |  owned bounds
///   +-------------------------+
/// ```
///
/// The halo part extends `aoi` grid units past the owned bounds on every
/// side. Cells of the private part have their whole area of interest inside
/// the owned bounds, so agents there never need neighbour data.
#[derive(Clone, Debug, PartialEq)]
pub struct HaloLayout {
    local: PartitionId,
    owned: IntRect,
    halo_part: IntRect,
    private_part: IntRect,
    aoi: Vec<i32>,
    discretization: Vec<f64>,
    neighbours: Vec<NeighbourRegions>,
}

impl HaloLayout {
    /// Compute the layout of `partition`'s local piece.
    ///
    /// On a toroidal world every periodic image of every partition is
    /// considered, so a partition may appear once per image it borders.
    pub fn new<P: Partition>(partition: &P, config: &HaloConfig) -> Result<Self, PartitionError> {
        let world = partition.world_bounds();
        let ndim = world.ndim();
        config.validate(ndim)?;
        let local = partition.local_id();
        let owned = partition.local_bounds()?;
        let halo_part = owned.resize(&config.aoi)?;
        let shrink: Vec<i32> = config.aoi.iter().map(|a| -a).collect();
        let private_part = owned
            .resize(&shrink)
            .map_err(|_| PartitionError::InvalidLayout {
                reason: format!(
                    "partition {local} with bounds {owned:?} is narrower than twice the aoi {:?}",
                    config.aoi
                ),
            })?;

        let wraps = partition.topology().wraps();
        let world_size = world.size();
        if wraps {
            if let Some(axis) = (0..ndim).find(|&i| config.aoi[i] > world_size[i]) {
                return Err(PartitionError::InvalidLayout {
                    reason: format!(
                        "aoi {} on axis {axis} exceeds the toroidal world width {}",
                        config.aoi[axis], world_size[axis]
                    ),
                });
            }
        }
        let shifts = image_shifts(&world_size, wraps);
        let origin = halo_part.lower().clone();

        let mut neighbours = Vec::new();
        for id in (0..partition.partition_count() as u32).map(PartitionId) {
            let bounds = partition.bounds_of(id)?;
            let mut send = Vec::new();
            let mut recv = Vec::new();
            for shift in &shifts {
                if id == local && shift.coords().iter().all(|&c| c == 0) {
                    continue;
                }
                let image = bounds.shift(shift);
                if let Some(r) = halo_part.intersection(&image) {
                    recv.push(r);
                }
                if let Some(s) = owned.intersection(&image.resize(&config.aoi)?) {
                    // Keyed by where the cells land in the receiver's frame.
                    let landing = s.shift(&IntPoint::zeros(ndim).checked_sub(shift)?);
                    send.push((landing, s));
                }
            }
            if send.is_empty() && recv.is_empty() {
                continue;
            }
            recv.sort_by(|a, b| a.lower().coords().cmp(b.lower().coords()));
            send.sort_by(|(a, _), (b, _)| a.lower().coords().cmp(b.lower().coords()));
            neighbours.push(NeighbourRegions {
                id,
                send: send.into_iter().map(|(_, s)| s.to_local(&origin)).collect(),
                recv: recv.into_iter().map(|r| r.to_local(&origin)).collect(),
            });
        }

        debug!(
            partition = %local,
            neighbours = neighbours.len(),
            cells = halo_part.cell_count(),
            "halo layout built"
        );
        Ok(Self {
            local,
            owned,
            halo_part,
            private_part,
            aoi: config.aoi.clone(),
            discretization: config.discretization.clone(),
            neighbours,
        })
    }

    /// The partition this layout describes.
    pub fn local_id(&self) -> PartitionId {
        self.local
    }

    /// Owned bounds, global coordinates.
    pub fn owned(&self) -> &IntRect {
        &self.owned
    }

    /// Owned bounds grown by the aoi: the storage shape.
    pub fn halo_part(&self) -> &IntRect {
        &self.halo_part
    }

    /// Owned bounds shrunk by the aoi.
    pub fn private_part(&self) -> &IntRect {
        &self.private_part
    }

    /// Area of interest per axis.
    pub fn aoi(&self) -> &[i32] {
        &self.aoi
    }

    /// Every partition sharing cells with this one's halo, ordered by id.
    pub fn neighbours(&self) -> &[NeighbourRegions] {
        &self.neighbours
    }

    /// Exchange regions for neighbour `id`, if it is one.
    pub fn neighbour(&self, id: PartitionId) -> Option<&NeighbourRegions> {
        self.neighbours.iter().find(|n| n.id == id)
    }

    /// Halo cells mirrored from neighbours, in global coordinates.
    pub fn mirrored(&self) -> impl Iterator<Item = IntRect> + '_ {
        self.neighbours
            .iter()
            .flat_map(|n| n.recv.iter())
            .map(|r| r.to_global(self.halo_part.lower()))
    }

    /// An empty continuous storage shaped to the halo part.
    pub fn continuous_storage<H: ObjectHandle>(&self) -> Result<ContinuousStorage<H>, PartitionError> {
        Ok(ContinuousStorage::new(
            self.halo_part.clone(),
            &self.discretization,
        )?)
    }

    /// A default-filled dense grid shaped to the halo part.
    pub fn dense_grid<T: Clone + Default>(&self) -> Result<DenseGrid<T>, PartitionError> {
        Ok(DenseGrid::new(self.halo_part.clone())?)
    }
}

/// Offsets of every periodic image of the world that a halo can reach:
/// `{-w, 0, w}` per axis on a torus, only the origin otherwise.
fn image_shifts(world_size: &IntPoint, wraps: bool) -> Vec<IntPoint> {
    let ndim = world_size.ndim();
    let mut shifts = vec![IntPoint::zeros(ndim)];
    if !wraps {
        return shifts;
    }
    for axis in 0..ndim {
        let w = world_size[axis];
        shifts = shifts
            .into_iter()
            .flat_map(|s| {
                [-w, 0, w]
                    .into_iter()
                    .filter_map(move |d| s.shift_axis(axis, d).ok())
            })
            .collect();
    }
    shifts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::UniformPartition;
    use halo_core::Topology;

    fn irect(lo: [i32; 2], hi: [i32; 2]) -> IntRect {
        IntRect::new(IntPoint::from(lo), IntPoint::from(hi)).unwrap()
    }

    fn grid(w: i32, h: i32, splits: [u32; 2], topology: Topology) -> UniformPartition {
        UniformPartition::new(irect([0, 0], [w, h]), &splits, topology, PartitionId(0)).unwrap()
    }

    fn layouts(part: &UniformPartition, aoi: i32) -> Vec<HaloLayout> {
        let config = HaloConfig::uniform(2, aoi, 1.0);
        part.ids()
            .map(|id| HaloLayout::new(&part.with_local(id).unwrap(), &config).unwrap())
            .collect()
    }

    // ── Parts ───────────────────────────────────────────────────

    #[test]
    fn halo_and_private_parts() {
        let part = grid(8, 4, [2, 1], Topology::Bounded);
        let layout = HaloLayout::new(&part, &HaloConfig::uniform(2, 1, 1.0)).unwrap();
        assert_eq!(layout.owned(), &irect([0, 0], [4, 4]));
        assert_eq!(layout.halo_part(), &irect([-1, -1], [5, 5]));
        assert_eq!(layout.private_part(), &irect([1, 1], [3, 3]));
    }

    #[test]
    fn narrow_partition_rejected() {
        let part = grid(8, 4, [4, 1], Topology::Bounded);
        let err = HaloLayout::new(&part, &HaloConfig::uniform(2, 2, 1.0)).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidLayout { .. }));
    }

    #[test]
    fn aoi_wider_than_torus_rejected() {
        let part = grid(8, 4, [1, 1], Topology::Toroidal);
        let config = HaloConfig {
            aoi: vec![1, 5],
            discretization: vec![1.0, 1.0],
        };
        assert!(HaloLayout::new(&part, &config).is_err());
    }

    // ── Neighbour regions ───────────────────────────────────────

    #[test]
    fn bounded_strip_regions() {
        let part = grid(8, 4, [2, 1], Topology::Bounded);
        let layout = HaloLayout::new(&part, &HaloConfig::uniform(2, 1, 1.0)).unwrap();
        assert_eq!(
            layout.neighbours(),
            &[NeighbourRegions {
                id: PartitionId(1),
                send: vec![irect([4, 1], [5, 5])],
                recv: vec![irect([5, 1], [6, 5])],
            }]
        );
        assert_eq!(
            layout.mirrored().collect::<Vec<_>>(),
            vec![irect([4, 0], [5, 4])]
        );
    }

    #[test]
    fn torus_halo_fully_mirrored() {
        for (splits, aoi) in [([2, 1], 1), ([3, 2], 2), ([1, 1], 1), ([2, 2], 3)] {
            let part = grid(12, 8, splits, Topology::Toroidal);
            for layout in layouts(&part, aoi) {
                let mirrored: usize = layout.mirrored().map(|r| r.cell_count()).sum();
                assert_eq!(
                    mirrored + layout.owned().cell_count(),
                    layout.halo_part().cell_count(),
                    "splits {splits:?} aoi {aoi} partition {}",
                    layout.local_id()
                );
            }
        }
    }

    #[test]
    fn bounded_halo_mirrors_only_in_world_cells() {
        let part = grid(12, 8, [3, 2], Topology::Bounded);
        let world = irect([0, 0], [12, 8]);
        for layout in layouts(&part, 1) {
            let mirrored: usize = layout.mirrored().map(|r| r.cell_count()).sum();
            let in_world = layout
                .halo_part()
                .intersection(&world)
                .map_or(0, |r| r.cell_count());
            assert_eq!(mirrored + layout.owned().cell_count(), in_world);
        }
    }

    #[test]
    fn send_matches_peer_recv() {
        for topology in [Topology::Bounded, Topology::Toroidal] {
            for (splits, aoi) in [([2, 1], 1), ([3, 2], 2), ([1, 2], 1), ([2, 2], 2)] {
                let part = grid(12, 8, splits, topology);
                let all = layouts(&part, aoi);
                for a in &all {
                    for n in a.neighbours() {
                        let b = &all[n.id.index()];
                        let back = b.neighbour(a.local_id()).unwrap();
                        let sent: Vec<_> = n.send.iter().map(IntRect::size).collect();
                        let received: Vec<_> = back.recv.iter().map(IntRect::size).collect();
                        assert_eq!(sent, received, "{topology:?} {splits:?} {a:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn single_partition_torus_borders_itself() {
        let part = grid(6, 6, [1, 1], Topology::Toroidal);
        let layout = HaloLayout::new(&part, &HaloConfig::uniform(2, 1, 1.0)).unwrap();
        assert_eq!(layout.neighbours().len(), 1);
        let me = &layout.neighbours()[0];
        assert_eq!(me.id, PartitionId(0));
        assert_eq!(me.send.len(), 8);
        assert_eq!(me.recv.len(), 8);
    }

    #[test]
    fn storages_take_halo_shape() {
        let part = grid(8, 4, [2, 1], Topology::Bounded);
        let layout = HaloLayout::new(&part, &HaloConfig::uniform(2, 1, 0.5)).unwrap();
        let cs = layout.continuous_storage::<u32>().unwrap();
        assert_eq!(halo_storage::RegionStorage::shape(&cs), layout.halo_part());
        assert_eq!(cs.discretization(), &[0.5, 0.5]);
        let g = layout.dense_grid::<f64>().unwrap();
        assert_eq!(g.as_slice().len(), 36);
    }
}
