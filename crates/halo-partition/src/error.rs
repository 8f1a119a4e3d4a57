//! Error types for partition layout and halo exchange.

use halo_core::{GeomError, PartitionId};
use halo_storage::StorageError;
use std::error::Error;
use std::fmt;

/// Errors arising from partition construction, layout, or exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum PartitionError {
    /// A point, rectangle or margin was malformed or had the wrong dimension.
    Geometry(GeomError),
    /// A storage operation failed during exchange.
    Storage(StorageError),
    /// The partition grid or halo configuration cannot produce a layout.
    InvalidLayout {
        /// What is wrong with it.
        reason: String,
    },
    /// A partition id is not below the partition count.
    UnknownPartition {
        /// The rejected id.
        id: PartitionId,
        /// Number of partitions.
        count: usize,
    },
    /// The transport failed to deliver or receive a payload.
    Transport {
        /// The remote partition.
        peer: PartitionId,
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(e) => write!(f, "geometry error: {e}"),
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::InvalidLayout { reason } => write!(f, "invalid layout: {reason}"),
            Self::UnknownPartition { id, count } => {
                write!(f, "unknown partition {id} (have {count})")
            }
            Self::Transport { peer, reason } => {
                write!(f, "transport to/from partition {peer} failed: {reason}")
            }
        }
    }
}

impl Error for PartitionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Geometry(e) => Some(e),
            Self::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GeomError> for PartitionError {
    fn from(e: GeomError) -> Self {
        Self::Geometry(e)
    }
}

impl From<StorageError> for PartitionError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_error_is_chained() {
        let err = PartitionError::from(StorageError::ZeroDimensional);
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("storage error"));
    }

    #[test]
    fn transport_message_names_peer() {
        let err = PartitionError::Transport {
            peer: PartitionId(3),
            reason: "disconnected".into(),
        };
        assert_eq!(
            err.to_string(),
            "transport to/from partition 3 failed: disconnected"
        );
    }
}
