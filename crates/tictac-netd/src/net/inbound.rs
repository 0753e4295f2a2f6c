use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::mpsc;

use crate::session::PeerConnection;

/// Unique connection identifier assigned by the accept loop.
pub type ConnId = u64;

/// Hands out connection ids in accept order.
///
/// Owned by whoever runs the accept loop; there is no process-wide counter.
#[derive(Debug)]
pub struct ConnIdAllocator {
    next: ConnId,
}

impl ConnIdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> ConnId {
        let id = self.next;
        self.next += 1;
        id
    }
}

impl Default for ConnIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Accept loop -> matchmaker. Unbounded so the accept loop never waits on pairing.
pub type InboundTx<R = OwnedReadHalf> = mpsc::UnboundedSender<PeerConnection<R>>;
pub type InboundRx<R = OwnedReadHalf> = mpsc::UnboundedReceiver<PeerConnection<R>>;
