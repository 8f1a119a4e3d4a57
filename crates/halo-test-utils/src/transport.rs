//! In-memory transport over crossbeam channels.

use crossbeam_channel::{unbounded, Receiver, Sender};
use halo_core::PartitionId;
use halo_partition::{PartitionError, Transport};
use std::time::Duration;

/// One partition's endpoint of a fully connected channel mesh.
///
/// Every ordered pair of partitions (including a partition and itself) has
/// its own unbounded channel, so sends never block and receives from one
/// peer never consume another peer's batch.
pub struct ChannelTransport<P> {
    id: PartitionId,
    outboxes: Vec<Sender<Vec<P>>>,
    inboxes: Vec<Receiver<Vec<P>>>,
    timeout: Duration,
}

impl<P> ChannelTransport<P> {
    /// How long [`recv`](Transport::recv) waits before reporting a stalled
    /// peer.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Endpoints for partitions `0..n`, indexed by partition id.
    pub fn mesh(n: usize) -> Vec<Self> {
        let mut senders: Vec<Vec<Sender<Vec<P>>>> = (0..n).map(|_| Vec::with_capacity(n)).collect();
        let mut receivers: Vec<Vec<Receiver<Vec<P>>>> =
            (0..n).map(|_| Vec::with_capacity(n)).collect();
        for outbox in senders.iter_mut() {
            for inbox in receivers.iter_mut() {
                let (tx, rx) = unbounded();
                outbox.push(tx);
                inbox.push(rx);
            }
        }
        senders
            .into_iter()
            .zip(receivers)
            .enumerate()
            .map(|(i, (outboxes, inboxes))| Self {
                id: PartitionId(i as u32),
                outboxes,
                inboxes,
                timeout: Self::DEFAULT_TIMEOUT,
            })
            .collect()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The partition this endpoint belongs to.
    pub fn id(&self) -> PartitionId {
        self.id
    }

    fn unknown(peer: PartitionId) -> PartitionError {
        PartitionError::Transport {
            peer,
            reason: "no channel to partition".into(),
        }
    }
}

impl<P> Transport<P> for ChannelTransport<P> {
    fn send(&mut self, to: PartitionId, payloads: Vec<P>) -> Result<(), PartitionError> {
        let tx = self.outboxes.get(to.index()).ok_or_else(|| Self::unknown(to))?;
        tx.send(payloads).map_err(|_| PartitionError::Transport {
            peer: to,
            reason: "receiving endpoint dropped".into(),
        })
    }

    fn recv(&mut self, from: PartitionId) -> Result<Vec<P>, PartitionError> {
        let rx = self.inboxes.get(from.index()).ok_or_else(|| Self::unknown(from))?;
        rx.recv_timeout(self.timeout)
            .map_err(|e| PartitionError::Transport {
                peer: from,
                reason: e.to_string(),
            })
    }
}
