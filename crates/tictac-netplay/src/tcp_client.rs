//! Socket side of the client: one task writes queued lines, another reads
//! and decodes whatever the server sends.

use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use tictac_netproto::{
    ClientMsg, ProtoError, ServerMsg, decode_message, encode_message, limits::RX_BUFFER_SIZE,
    try_decode_lines,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
    sync::mpsc,
};
use tracing::{debug, error, info, trace, warn};

use crate::error::NetplayError;

const COMMAND_QUEUE_LEN: usize = 256;

/// What the reader task reports, in arrival order.
#[derive(Debug)]
pub enum TcpClientEvent {
    Connected,
    /// A line from the server that decoded cleanly.
    Message(ServerMsg),
    /// A line from the server that did not decode. The reader keeps going.
    Malformed { line: String, error: ProtoError },
    /// EOF, read error or oversized line. Always the last event.
    Disconnected { reason: String },
    /// Write-side error.
    Error(String),
}

/// Work for the writer task.
#[derive(Debug)]
pub enum TcpClientCommand {
    /// Send an already encoded line.
    SendRaw(Bytes),
    /// Shut the write half down.
    Disconnect,
}

/// Cheap to clone; every clone feeds the same writer task.
#[derive(Debug, Clone)]
pub struct TcpClientHandle {
    inner: Arc<TcpClientInner>,
}

#[derive(Debug)]
struct TcpClientInner {
    server: SocketAddr,
    cmd_tx: mpsc::Sender<TcpClientCommand>,
}

impl TcpClientHandle {
    pub fn server_addr(&self) -> SocketAddr {
        self.inner.server
    }

    /// Encode and queue a message for the server.
    pub async fn send_message(&self, msg: &ClientMsg) -> Result<(), NetplayError> {
        let line = encode_message(msg)?;
        self.inner
            .cmd_tx
            .send(TcpClientCommand::SendRaw(Bytes::from(line)))
            .await
            .map_err(|_| NetplayError::ChannelSend)
    }

    /// Half-close the connection once every queued line is written.
    pub async fn disconnect(&self) -> Result<(), NetplayError> {
        self.inner
            .cmd_tx
            .send(TcpClientCommand::Disconnect)
            .await
            .map_err(|_| NetplayError::ChannelSend)
    }
}

/// Open a connection to `addr` and spawn its reader and writer tasks.
///
/// Every line the server sends ends up on `event_tx`.
pub async fn connect(
    addr: SocketAddr,
    event_tx: mpsc::Sender<TcpClientEvent>,
) -> Result<TcpClientHandle, NetplayError> {
    info!(%addr, "Connecting");

    let stream = TcpStream::connect(addr).await.map_err(|e| match e.kind() {
        ErrorKind::ConnectionRefused => NetplayError::ConnectionRefused,
        _ => NetplayError::ConnectionFailed(format!("{addr}: {e}")),
    })?;

    if let Err(e) = stream.set_nodelay(true) {
        debug!(error = %e, "TCP_NODELAY not applied");
    }
    let (read, write) = stream.into_split();
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_QUEUE_LEN);

    tokio::spawn(writer_loop(write, cmd_rx, event_tx.clone()));
    tokio::spawn(reader_loop(read, event_tx));

    Ok(TcpClientHandle {
        inner: Arc::new(TcpClientInner {
            server: addr,
            cmd_tx,
        }),
    })
}

/// Drains queued lines into the socket until told to stop or the handle
/// goes away, then half-closes the connection.
async fn writer_loop(
    mut sink: impl AsyncWrite + Unpin,
    mut commands: mpsc::Receiver<TcpClientCommand>,
    event_tx: mpsc::Sender<TcpClientEvent>,
) {
    while let Some(TcpClientCommand::SendRaw(line)) = commands.recv().await {
        trace!(len = line.len(), "tx line");
        if let Err(e) = sink.write_all(&line).await {
            error!(error = %e, "Writing to server failed");
            let _ = event_tx.send(TcpClientEvent::Error(e.to_string())).await;
            break;
        }
    }

    debug!("Client writer stopping");
    let _ = sink.shutdown().await;
}

/// Splits the byte stream into lines and forwards each one, decoded or not.
///
/// Always finishes with exactly one `Disconnected`, unless the handler has
/// already gone away.
async fn reader_loop(mut source: impl AsyncRead + Unpin, event_tx: mpsc::Sender<TcpClientEvent>) {
    if event_tx.send(TcpClientEvent::Connected).await.is_err() {
        return;
    }

    let mut buf = BytesMut::with_capacity(RX_BUFFER_SIZE);
    let reason = loop {
        buf.reserve(RX_BUFFER_SIZE);
        let n = match source.read_buf(&mut buf).await {
            Ok(0) => break "server closed connection".to_string(),
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "Reading from server failed");
                break e.to_string();
            }
        };
        trace!(len = n, "rx bytes");

        let (lines, consumed) = match try_decode_lines(&buf) {
            Ok(split) => split,
            Err(e) => {
                error!(error = %e, "Server sent an oversized line");
                break format!("protocol error: {e}");
            }
        };
        buf.advance(consumed);

        for line in lines {
            if event_tx.send(decode_line(line)).await.is_err() {
                debug!("Handler gone, client reader stopping");
                return;
            }
        }
    };

    info!(%reason, "Connection to server ended");
    let _ = event_tx.send(TcpClientEvent::Disconnected { reason }).await;
}

fn decode_line(line: String) -> TcpClientEvent {
    match decode_message::<ServerMsg>(&line) {
        Ok(msg) => {
            debug!(?msg, "rx");
            TcpClientEvent::Message(msg)
        }
        Err(error) => {
            warn!(%line, %error, "Ignoring undecodable line from server");
            TcpClientEvent::Malformed { line, error }
        }
    }
}
