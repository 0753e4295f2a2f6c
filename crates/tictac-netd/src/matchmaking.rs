//! FIFO pairing of accepted connections into sessions.

use std::time::Duration;

use futures_util::FutureExt;
use tictac_netproto::messages::server::ServerMsg;
use tokio::io::AsyncRead;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use crate::ServerConfig;
use crate::net::inbound::InboundRx;
use crate::net::rate_limit::ConnRateLimiter;
use crate::session::{DisconnectReason, PeerConnection, Session, SessionEnd, SessionId};

pub mod queue;

pub use queue::PendingQueue;

pub const WAITING_NOTICE: &str = "Waiting for an opponent.";
pub const NO_OPPONENT_NOTICE: &str = "No opponent found. Please try again later.";

/// Buffered lines from the oldest waiter looked at before each enqueue.
const SETTLE_BUDGET: usize = 32;

/// Something that happened to the oldest waiting connection.
enum HeadEvent {
    Line(String),
    Gone(DisconnectReason),
    Expired,
}

/// Owns the pending queue and the session id counter.
pub struct Matchmaker<R> {
    queue: PendingQueue<R>,
    next_session_id: SessionId,
    config: ServerConfig,
}

impl<R> Matchmaker<R>
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
{
    pub fn new(config: ServerConfig) -> Self {
        Self {
            queue: PendingQueue::new(),
            next_session_id: 1,
            config,
        }
    }

    pub fn waiting(&self) -> usize {
        self.queue.len()
    }

    /// Pair connections from `rx` until the accept side goes away.
    pub async fn run(mut self, mut rx: InboundRx<R>) {
        info!("Matchmaker started");

        loop {
            tokio::select! {
                conn = rx.recv() => {
                    let Some(conn) = conn else {
                        break;
                    };
                    self.enqueue(conn);
                }
                event = watch_head(&mut self.queue, self.config.pairing_timeout) => {
                    self.on_head_event(event);
                }
            }
        }

        for conn in self.queue.drain() {
            conn.close().await;
        }
        info!("Matchmaker stopped");
    }

    /// Queue `conn` and start a session if it completes a pair.
    pub fn enqueue(&mut self, mut conn: PeerConnection<R>) {
        if let Some(rate_limit) = &self.config.rate_limit {
            conn.set_rate_limiter(ConnRateLimiter::new(rate_limit));
        }

        self.settle_head();
        self.queue.push(conn);

        while let Some((first, second)) = self.queue.pop_pair() {
            self.start_session(first, second);
        }
    }

    /// Handle whatever the head already has buffered, without waiting.
    ///
    /// Catches a waiter that hung up just before its partner arrived. Looks
    /// at no more than `SETTLE_BUDGET` lines so a flooding waiter cannot hold
    /// up the queue.
    fn settle_head(&mut self) {
        for _ in 0..SETTLE_BUDGET {
            let Some(head) = self.queue.front_mut() else {
                return;
            };
            let Some(ready) = head.conn.next_line().now_or_never() else {
                return;
            };
            let event = match ready {
                Ok(line) => HeadEvent::Line(line),
                Err(reason) => HeadEvent::Gone(reason),
            };
            self.on_head_event(event);
        }
    }

    /// Never awaits the waiter's socket: anything that could block is
    /// handed to a task of its own.
    fn on_head_event(&mut self, event: HeadEvent) {
        match event {
            HeadEvent::Line(line) => {
                let Some(head) = self.queue.front_mut() else {
                    return;
                };
                debug!(conn_id = head.conn.conn_id(), %line, "Line from unpaired connection");
                if !head.conn.try_notify(&ServerMsg::message(WAITING_NOTICE))
                    && let Some(conn) = self.queue.pop_front()
                {
                    warn!(conn_id = conn.conn_id(), "Unpaired connection is not reading; dropping it");
                    retire(conn, None);
                }
            }
            HeadEvent::Gone(reason) => {
                if let Some(conn) = self.queue.pop_front() {
                    info!(conn_id = conn.conn_id(), %reason, "Connection left before pairing");
                    retire(conn, None);
                }
            }
            HeadEvent::Expired => {
                if let Some(conn) = self.queue.pop_front() {
                    info!(conn_id = conn.conn_id(), "No opponent found in time");
                    retire(conn, Some(ServerMsg::message(NO_OPPONENT_NOTICE)));
                }
            }
        }
    }

    fn start_session(&mut self, first: PeerConnection<R>, second: PeerConnection<R>) {
        let session_id = self.next_session_id;
        self.next_session_id += 1;

        info!(
            session_id,
            x = first.conn_id(),
            o = second.conn_id(),
            "Pairing two players for a new game"
        );

        let session = Session::new(session_id, first, second, self.config.turn_timeout);
        tokio::spawn(async move {
            match session.run().await {
                SessionEnd::Finished(outcome) => {
                    info!(session_id, outcome = outcome.label(), "Session finished");
                }
                SessionEnd::Abandoned { by, reason } => {
                    info!(session_id, symbol = %by, %reason, "Session abandoned");
                }
            }
        });
    }
}

/// Close a connection that left the queue without a partner, on its own
/// task. `farewell` is queued only if there is room for it.
fn retire<R>(conn: PeerConnection<R>, farewell: Option<ServerMsg>)
where
    R: AsyncRead + Unpin + Send + Sync + 'static,
{
    if let Some(msg) = farewell {
        conn.try_notify(&msg);
    }
    tokio::spawn(conn.close());
}

/// Resolves when the oldest waiter sends a line, hangs up, or runs out of
/// time. Never resolves while the queue is empty.
async fn watch_head<R: AsyncRead + Unpin>(
    queue: &mut PendingQueue<R>,
    pairing_timeout: Option<Duration>,
) -> HeadEvent {
    let Some(head) = queue.front_mut() else {
        return std::future::pending().await;
    };
    let deadline = pairing_timeout.map(|limit| head.enqueued_at + limit);

    tokio::select! {
        res = head.conn.next_line() => match res {
            Ok(line) => HeadEvent::Line(line),
            Err(reason) => HeadEvent::Gone(reason),
        },
        _ = sleep_until_opt(deadline) => HeadEvent::Expired,
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
