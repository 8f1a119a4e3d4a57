//! Strongly-typed identifiers.

use std::fmt;

/// Identifies one partition of the simulation world.
///
/// Partitions are numbered densely from zero; in a multi-process run the
/// partition id doubles as the process rank the transport addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PartitionId(pub u32);

impl PartitionId {
    /// The id as a `usize` index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for PartitionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
