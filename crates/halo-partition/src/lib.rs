//! Partition layout and halo exchange for Halo field storage.
//!
//! The global world is split among cooperating partitions. Each partition
//! owns its [`local_bounds`](Partition::local_bounds) and keeps a storage
//! whose shape is those bounds grown by the area of interest: the *halo
//! part*. Cells between the owned bounds and the halo edge mirror data
//! owned by neighbours and are refreshed by [`exchange_halo`].
//!
//! Nothing here knows how payloads travel between partitions. Callers plug
//! in a [`Transport`]; `halo-test-utils` ships an in-memory one.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod exchange;
pub mod layout;
pub mod migrate;
pub mod partition;

pub use config::HaloConfig;
pub use error::PartitionError;
pub use exchange::{exchange_halo, Transport};
pub use layout::{HaloLayout, NeighbourRegions};
pub use migrate::emigrants;
pub use partition::{Partition, UniformPartition};
