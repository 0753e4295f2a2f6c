use std::collections::VecDeque;

use tokio::time::Instant;

use crate::session::PeerConnection;

/// A connection waiting for a partner.
pub struct Waiting<R> {
    pub conn: PeerConnection<R>,
    pub enqueued_at: Instant,
}

/// FIFO of not-yet-paired connections.
///
/// Arrival order is pairing order: the two oldest entries are always the
/// next pair, and they leave the queue together.
pub struct PendingQueue<R> {
    entries: VecDeque<Waiting<R>>,
}

impl<R> PendingQueue<R> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, conn: PeerConnection<R>) {
        self.entries.push_back(Waiting {
            conn,
            enqueued_at: Instant::now(),
        });
    }

    pub fn front_mut(&mut self) -> Option<&mut Waiting<R>> {
        self.entries.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<PeerConnection<R>> {
        self.entries.pop_front().map(|w| w.conn)
    }

    /// Remove and return the two oldest entries, if there are two.
    pub fn pop_pair(&mut self) -> Option<(PeerConnection<R>, PeerConnection<R>)> {
        if self.entries.len() < 2 {
            return None;
        }
        let first = self.entries.pop_front()?.conn;
        let second = self.entries.pop_front()?.conn;
        Some((first, second))
    }

    pub fn drain(&mut self) -> impl Iterator<Item = PeerConnection<R>> + '_ {
        self.entries.drain(..).map(|w| w.conn)
    }
}

impl<R> Default for PendingQueue<R> {
    fn default() -> Self {
        Self::new()
    }
}
