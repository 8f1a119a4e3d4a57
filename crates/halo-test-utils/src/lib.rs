//! Test utilities for Halo development.
//!
//! - [`ChannelTransport`]: an in-memory [`Transport`](halo_partition::Transport)
//!   mesh, one endpoint per partition, for running partitions on threads.
//! - [`oracle`]: brute-force reference answers for proximity queries.
//! - [`fixtures`]: seeded object scatters.
//! - [`assert_consistent`]: the cell/location invariant of a
//!   [`ContinuousStorage`](halo_storage::ContinuousStorage).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod oracle;
pub mod transport;

pub use fixtures::{scatter, Scatter};
pub use transport::ChannelTransport;

use halo_core::IntPoint;
use halo_storage::{ContinuousStorage, ObjectHandle};

/// Panic unless every stored object is indexed under exactly the cell its
/// location discretizes to, and no cell lists an unknown object.
#[track_caller]
pub fn assert_consistent<H: ObjectHandle>(storage: &ContinuousStorage<H>) {
    let grid = storage.cell_grid_size();
    let cells = halo_core::IntRect::new(IntPoint::zeros(grid.ndim()), grid.clone())
        .expect("cell grid is a valid rectangle");
    let mut indexed = 0;
    for cell in cells.points() {
        for obj in storage.objects_in_cell(&cell) {
            let loc = storage
                .location(obj)
                .unwrap_or_else(|| panic!("cell {cell:?} lists unknown object {obj:?}"));
            assert_eq!(
                storage.discretize(loc),
                cell,
                "{obj:?} at {loc:?} indexed under the wrong cell"
            );
            indexed += 1;
        }
    }
    assert_eq!(indexed, storage.len(), "cell index and location map disagree");
}
