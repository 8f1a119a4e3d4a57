//! Halo exchange over a pluggable transport.

use crate::error::PartitionError;
use crate::layout::HaloLayout;
use halo_core::PartitionId;
use halo_storage::RegionStorage;
use tracing::debug;

/// Moves packed payloads between partitions.
///
/// One `send` to a peer is matched by exactly one `recv` from this
/// partition on the peer's side, in the same order. Implementations may
/// buffer sends; [`exchange_halo`] issues all sends before any receive.
pub trait Transport<P> {
    /// Deliver `payloads` to partition `to`.
    fn send(&mut self, to: PartitionId, payloads: Vec<P>) -> Result<(), PartitionError>;

    /// Take the next batch of payloads sent by partition `from`.
    fn recv(&mut self, from: PartitionId) -> Result<Vec<P>, PartitionError>;
}

/// Refresh the halo cells of `storage` from its neighbours.
///
/// For every neighbour in `layout`, packs the send regions and ships them;
/// then receives each neighbour's batch and unpacks it into the matching
/// receive regions, replacing whatever those halo cells held.
///
/// Every partition must call this in the same round; the call blocks (or
/// fails, depending on the transport) until all neighbours have sent.
pub fn exchange_halo<S, T>(
    storage: &mut S,
    layout: &HaloLayout,
    transport: &mut T,
) -> Result<(), PartitionError>
where
    S: RegionStorage,
    T: Transport<S::Payload>,
{
    if storage.shape() != layout.halo_part() {
        return Err(PartitionError::InvalidLayout {
            reason: format!(
                "storage shape {:?} does not match halo part {:?}",
                storage.shape(),
                layout.halo_part()
            ),
        });
    }
    for n in layout.neighbours() {
        let payloads = storage.pack(&n.send)?;
        transport.send(n.id, payloads)?;
    }
    let mut received = 0;
    for n in layout.neighbours() {
        let payloads = transport.recv(n.id)?;
        if payloads.len() != n.recv.len() {
            return Err(PartitionError::Transport {
                peer: n.id,
                reason: format!(
                    "expected {} payloads, received {}",
                    n.recv.len(),
                    payloads.len()
                ),
            });
        }
        received += payloads.len();
        storage.unpack(&n.recv, payloads)?;
    }
    debug!(
        partition = %layout.local_id(),
        neighbours = layout.neighbours().len(),
        regions = received,
        "halo exchanged"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HaloConfig;
    use crate::partition::UniformPartition;
    use halo_core::{IntPoint, IntRect, Topology};
    use halo_storage::IntGrid;
    use std::collections::{HashMap, VecDeque};

    /// Loops every send back to the sender's own inbox.
    #[derive(Default)]
    struct Loopback<P> {
        queues: HashMap<PartitionId, VecDeque<Vec<P>>>,
    }

    impl<P> Transport<P> for Loopback<P> {
        fn send(&mut self, to: PartitionId, payloads: Vec<P>) -> Result<(), PartitionError> {
            self.queues.entry(to).or_default().push_back(payloads);
            Ok(())
        }

        fn recv(&mut self, from: PartitionId) -> Result<Vec<P>, PartitionError> {
            self.queues
                .get_mut(&from)
                .and_then(VecDeque::pop_front)
                .ok_or_else(|| PartitionError::Transport {
                    peer: from,
                    reason: "nothing queued".into(),
                })
        }
    }

    fn torus(n: i32) -> UniformPartition {
        let world = IntRect::new(IntPoint::from([0, 0]), IntPoint::from([n, n])).unwrap();
        UniformPartition::new(world, &[1, 1], Topology::Toroidal, PartitionId(0)).unwrap()
    }

    #[test]
    fn single_partition_torus_wraps_own_edges() {
        let layout = HaloLayout::new(&torus(4), &HaloConfig::uniform(2, 1, 1.0)).unwrap();
        let mut grid: IntGrid = layout.dense_grid().unwrap();
        for p in layout.owned().points() {
            grid.set(&p, p[0] * 10 + p[1]).unwrap();
        }
        let mut transport = Loopback::default();
        exchange_halo(&mut grid, &layout, &mut transport).unwrap();

        assert_eq!(grid.get(&IntPoint::from([-1, 0])), Some(&30));
        assert_eq!(grid.get(&IntPoint::from([4, 2])), Some(&2));
        assert_eq!(grid.get(&IntPoint::from([1, -1])), Some(&13));
        assert_eq!(grid.get(&IntPoint::from([-1, -1])), Some(&33));
        assert_eq!(grid.get(&IntPoint::from([4, 4])), Some(&0));
    }

    #[test]
    fn rejects_storage_of_wrong_shape() {
        let layout = HaloLayout::new(&torus(4), &HaloConfig::uniform(2, 1, 1.0)).unwrap();
        let mut grid =
            IntGrid::new(IntRect::new(IntPoint::from([0, 0]), IntPoint::from([4, 4])).unwrap())
                .unwrap();
        let err = exchange_halo(&mut grid, &layout, &mut Loopback::default()).unwrap_err();
        assert!(matches!(err, PartitionError::InvalidLayout { .. }));
    }

    #[test]
    fn short_batch_is_a_transport_error() {
        struct Short;
        impl Transport<Vec<i32>> for Short {
            fn send(&mut self, _: PartitionId, _: Vec<Vec<i32>>) -> Result<(), PartitionError> {
                Ok(())
            }
            fn recv(&mut self, _: PartitionId) -> Result<Vec<Vec<i32>>, PartitionError> {
                Ok(Vec::new())
            }
        }
        let layout = HaloLayout::new(&torus(4), &HaloConfig::uniform(2, 1, 1.0)).unwrap();
        let mut grid: IntGrid = layout.dense_grid().unwrap();
        let err = exchange_halo(&mut grid, &layout, &mut Short).unwrap_err();
        assert!(matches!(err, PartitionError::Transport { .. }));
    }
}
