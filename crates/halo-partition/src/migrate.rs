//! Ownership migration of continuous objects.

use crate::error::PartitionError;
use crate::partition::Partition;
use halo_core::PartitionId;
use halo_storage::{ContinuousStorage, ObjectHandle};
use tracing::debug;

/// Objects of `storage` located outside the local owned bounds, each with
/// the partition that now owns its location.
///
/// The owner is `None` for objects that left a bounded world. Halo copies
/// mirrored from neighbours also lie outside the owned bounds, so call this
/// after agents move and before the next halo exchange, once mirrored
/// cells have been cleared.
pub fn emigrants<'a, H, P>(
    storage: &'a ContinuousStorage<H>,
    partition: &P,
) -> Result<Vec<(&'a H, Option<PartitionId>)>, PartitionError>
where
    H: ObjectHandle,
    P: Partition,
{
    let owned = partition.local_bounds()?.to_real();
    let out: Vec<_> = storage
        .objects()
        .filter(|(_, loc)| !owned.contains(loc))
        .map(|(h, loc)| (h, partition.partition_of(loc)))
        .collect();
    debug!(
        partition = %partition.local_id(),
        objects = storage.len(),
        emigrants = out.len(),
        "emigrant scan"
    );
    Ok(out)
}
