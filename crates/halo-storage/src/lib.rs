//! Field storage for partitioned Halo simulations.
//!
//! Each storage instance owns one local sub-region (its *shape*) of the
//! global simulation space. Three variants share the [`RegionStorage`]
//! pack/unpack contract used for halo exchange and partition rebalancing:
//!
//! - [`ContinuousStorage`]: objects at real-valued locations, bucketed into
//!   a uniform cell grid for point, rectangle, radius and k-nearest queries.
//! - [`DenseGrid`]: one value per integer grid cell ([`IntGrid`],
//!   [`DoubleGrid`], [`ObjectGrid`]).
//! - [`BagGrid`]: zero or more values per integer grid cell.
//!
//! # Concurrency
//!
//! Storage is single-threaded and unsynchronised. Callers must ensure no
//! query or mutation runs on an instance while it is mid-pack or
//! mid-unpack; the usual discipline is a barrier around each exchange.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bag;
pub mod continuous;
pub mod error;
pub mod grid;
pub mod storage;

pub use bag::BagGrid;
pub use continuous::{ContinuousStorage, ObjectHandle, PackedObjects, MAX_CELLS};
pub use error::StorageError;
pub use grid::{DenseGrid, DoubleGrid, IntGrid, ObjectGrid};
pub use storage::RegionStorage;
