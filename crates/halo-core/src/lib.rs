//! Core geometry types for the Halo partitioned field layer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! coordinate algebra every storage and partition type is built on:
//!
//! - [`Point`]: an immutable N-dimensional point, either discrete
//!   ([`IntPoint`], grid cells) or continuous ([`RealPoint`], world space).
//! - [`Rect`]: an axis-aligned, half-open rectangle `[lower, upper)`.
//! - [`Topology`]: whether the world is bounded or wraps around.
//! - [`PartitionId`]: identifies one cooperating partition/process.
//!
//! All binary operations between points and rectangles require equal
//! dimension. Constructors and `checked_*` methods report a mismatch as
//! [`GeomError::DimensionMismatch`]; operator impls treat it as a
//! programming error and panic.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod point;
pub mod rect;
pub mod scalar;
pub mod topology;

pub use error::GeomError;
pub use id::PartitionId;
pub use point::{IntPoint, Point, RealPoint};
pub use rect::{IntRect, RealRect, Rect, RectPoints};
pub use scalar::Scalar;
pub use topology::Topology;
