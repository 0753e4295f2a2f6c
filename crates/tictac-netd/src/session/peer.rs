use std::net::SocketAddr;
use std::time::Duration;

use tictac_core::Symbol;
use tictac_netproto::messages::server::ServerMsg;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::net::framing::LineReader;
use crate::net::inbound::ConnId;
use crate::net::outbound::{OutboundTx, SendError, send_msg, spawn_stream_writer, try_send_msg};
use crate::net::rate_limit::ConnRateLimiter;

use super::error::DisconnectReason;

/// How long `close` waits for queued lines to drain before giving up.
const CLOSE_GRACE: Duration = Duration::from_secs(2);

/// One peer's end of the line protocol.
///
/// Reading happens inline on whoever owns the connection; writing goes
/// through a dedicated writer task so a slow reader never stalls a session.
pub struct PeerConnection<R> {
    conn_id: ConnId,
    peer: SocketAddr,
    role: Option<Symbol>,
    reader: LineReader<R>,
    outbound: OutboundTx,
    writer: JoinHandle<anyhow::Result<()>>,
    rate_limiter: Option<ConnRateLimiter>,
}

impl PeerConnection<OwnedReadHalf> {
    pub fn from_tcp(conn_id: ConnId, peer: SocketAddr, stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self::new(conn_id, peer, read, write)
    }
}

impl<R: AsyncRead + Unpin> PeerConnection<R> {
    /// Must be called from within a tokio runtime: spawns the writer task.
    pub fn new<W>(conn_id: ConnId, peer: SocketAddr, read: R, write: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (outbound, writer) = spawn_stream_writer(write);
        Self {
            conn_id,
            peer,
            role: None,
            reader: LineReader::new(read),
            outbound,
            writer,
            rate_limiter: None,
        }
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn_id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn role(&self) -> Option<Symbol> {
        self.role
    }

    pub(crate) fn bind_role(&mut self, symbol: Symbol) {
        self.role = Some(symbol);
    }

    pub fn set_rate_limiter(&mut self, limiter: Option<ConnRateLimiter>) {
        self.rate_limiter = limiter;
    }

    /// Queue `msg` for this peer.
    pub async fn send(&self, msg: &ServerMsg) -> Result<(), SendError> {
        send_msg(&self.outbound, msg).await
    }

    /// Best-effort send; a peer that is gone shows up on its next read.
    pub async fn notify(&self, msg: &ServerMsg) {
        if let Err(e) = self.send(msg).await {
            debug!(conn_id = self.conn_id, error = %e, "dropping outbound message");
        }
    }

    /// Queue `msg` only if there is room right now.
    ///
    /// Returns `false` when the peer is gone or not reading what it is sent.
    pub fn try_notify(&self, msg: &ServerMsg) -> bool {
        match try_send_msg(&self.outbound, msg) {
            Ok(()) => true,
            Err(e) => {
                debug!(conn_id = self.conn_id, error = %e, "outbound message not queued");
                false
            }
        }
    }

    /// Next line from this peer. Cancel safe.
    pub async fn next_line(&mut self) -> Result<String, DisconnectReason> {
        let line = self.reader.next_line().await?.ok_or(DisconnectReason::Eof)?;
        if let Some(limiter) = &self.rate_limiter
            && !limiter.admit()
        {
            return Err(DisconnectReason::RateLimited);
        }
        Ok(line)
    }

    /// Flush queued lines and shut the write half down.
    ///
    /// Takes `self`, so a connection can only be closed once.
    pub async fn close(self) {
        let Self {
            conn_id,
            outbound,
            writer,
            ..
        } = self;
        drop(outbound);

        let abort = writer.abort_handle();
        match tokio::time::timeout(CLOSE_GRACE, writer).await {
            Ok(Ok(Ok(()))) => debug!(conn_id, "connection closed"),
            Ok(Ok(Err(e))) => debug!(conn_id, error = %e, "writer ended with error"),
            Ok(Err(e)) => debug!(conn_id, error = %e, "writer task failed"),
            Err(_) => {
                debug!(conn_id, "writer did not drain in time; aborting");
                abort.abort();
            }
        }
    }
}
