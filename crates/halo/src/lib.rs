//! Halo: partitioned spatial field storage for distributed agent-based
//! simulation.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Halo sub-crates. For most users, adding `halo` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use halo::prelude::*;
//!
//! // A 100x100 world split into two partitions; we are partition 0.
//! let world = IntRect::new(IntPoint::from([0, 0]), IntPoint::from([100, 100])).unwrap();
//! let partition =
//!     UniformPartition::new(world, &[2, 1], Topology::Bounded, PartitionId(0)).unwrap();
//! let layout = HaloLayout::new(&partition, &HaloConfig::uniform(2, 5, 2.0)).unwrap();
//!
//! // Agents live in a storage covering the owned bounds plus the halo.
//! let mut agents: ContinuousStorage<u64> = layout.continuous_storage().unwrap();
//! agents.set_location(7, RealPoint::from([12.5, 40.0])).unwrap();
//! agents.set_location(8, RealPoint::from([14.0, 41.0])).unwrap();
//! assert_eq!(agents.neighbors_within(&7, 2.0).unwrap(), vec![&8]);
//!
//! // Agent 8 walks into partition 1's territory.
//! agents.set_location(8, RealPoint::from([52.0, 41.0])).unwrap();
//! let moving = emigrants(&agents, &partition).unwrap();
//! assert_eq!(moving, vec![(&8, Some(PartitionId(1)))]);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`geom`] | `halo-core` | Points, rectangles, topology, partition ids |
//! | [`storage`] | `halo-storage` | Continuous, dense and bag storages, pack/unpack |
//! | [`partition`] | `halo-partition` | Partitions, halo layout, exchange, migration |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Coordinate algebra (`halo-core`).
///
/// [`geom::Point`] and [`geom::Rect`] in integer and real flavours, plus
/// [`geom::Topology`].
pub use halo_core as geom;

/// Field storage (`halo-storage`).
///
/// The [`storage::RegionStorage`] pack/unpack contract and its
/// implementations: [`storage::ContinuousStorage`], [`storage::DenseGrid`],
/// [`storage::BagGrid`].
pub use halo_storage as storage;

/// Partitioning and halo exchange (`halo-partition`).
///
/// The [`partition::Partition`] and [`partition::Transport`] collaborator
/// traits, [`partition::HaloLayout`] and [`partition::exchange_halo`].
pub use halo_partition as partition;

/// Common imports for typical Halo usage.
///
/// ```rust
/// use halo::prelude::*;
/// ```
pub mod prelude {
    // Geometry
    pub use halo_core::{
        IntPoint, IntRect, PartitionId, Point, RealPoint, RealRect, Rect, Topology,
    };

    // Storage
    pub use halo_storage::{
        BagGrid, ContinuousStorage, DenseGrid, DoubleGrid, IntGrid, ObjectGrid, PackedObjects,
        RegionStorage,
    };

    // Partitioning
    pub use halo_partition::{
        emigrants, exchange_halo, HaloConfig, HaloLayout, Partition, Transport,
        UniformPartition,
    };

    // Errors
    pub use halo_core::GeomError;
    pub use halo_partition::PartitionError;
    pub use halo_storage::StorageError;
}
