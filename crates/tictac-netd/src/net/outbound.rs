use bytes::Bytes;
use futures_util::{Sink, SinkExt};
use thiserror::Error;
use tictac_netproto::codec::encode_message;
use tictac_netproto::error::ProtoError;
use tictac_netproto::messages::server::ServerMsg;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::codec::{BytesCodec, FramedWrite};

/// Outbound channel sender type. Data is already line-encoded.
pub type OutboundTx = mpsc::Sender<Bytes>;

/// Depth of each connection's outbound queue.
pub const OUTBOUND_QUEUE_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("encode failed: {0}")]
    Encode(#[from] ProtoError),
    #[error("connection closed")]
    Closed,
    #[error("outbound queue full")]
    Full,
}

/// Spawn a writer task that drains `rx` into `write`.
///
/// - Exits when the channel is closed, after closing the sink (which shuts
///   the underlying write half down).
/// - Returns an error if a socket write fails.
pub fn spawn_writer<S>(mut write: S, mut rx: mpsc::Receiver<Bytes>) -> JoinHandle<anyhow::Result<()>>
where
    S: Sink<Bytes, Error = std::io::Error> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            write.send(frame).await?;
        }
        write.close().await?;
        Ok(())
    })
}

/// Wrap a raw write half in a bytes sink and spawn its writer.
pub fn spawn_stream_writer<W>(write: W) -> (OutboundTx, JoinHandle<anyhow::Result<()>>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_LEN);
    let sink = FramedWrite::new(write, BytesCodec::new());
    (tx, spawn_writer(sink, rx))
}

/// Encode a server message and queue it on `tx`.
pub async fn send_msg(tx: &OutboundTx, msg: &ServerMsg) -> Result<(), SendError> {
    let line = encode_message(msg)?;
    tx.send(Bytes::from(line))
        .await
        .map_err(|_| SendError::Closed)
}

/// Like [`send_msg`] but never waits for queue space.
pub fn try_send_msg(tx: &OutboundTx, msg: &ServerMsg) -> Result<(), SendError> {
    let line = encode_message(msg)?;
    tx.try_send(Bytes::from(line)).map_err(|e| match e {
        TrySendError::Full(_) => SendError::Full,
        TrySendError::Closed(_) => SendError::Closed,
    })
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn writer_flushes_then_shuts_down() {
        let (server, mut client) = tokio::io::duplex(256);
        let (tx, writer) = spawn_stream_writer(server);

        send_msg(&tx, &ServerMsg::YourTurn).await.unwrap();
        send_msg(&tx, &ServerMsg::message("hi")).await.unwrap();
        drop(tx);
        writer.await.unwrap().unwrap();

        let mut out = String::new();
        client.read_to_string(&mut out).await.unwrap();
        assert_eq!(out, "YOUR_TURN\nMESSAGE hi\n");
    }

    #[tokio::test]
    async fn send_after_writer_exit_reports_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let err = send_msg(&tx, &ServerMsg::OpponentTurn).await.unwrap_err();
        assert!(matches!(err, SendError::Closed));
    }

    #[tokio::test]
    async fn try_send_reports_a_full_queue() {
        let (tx, mut rx) = mpsc::channel(1);
        try_send_msg(&tx, &ServerMsg::YourTurn).unwrap();
        let err = try_send_msg(&tx, &ServerMsg::YourTurn).unwrap_err();
        assert!(matches!(err, SendError::Full));

        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"YOUR_TURN\n"));
        drop(rx);
        let err = try_send_msg(&tx, &ServerMsg::YourTurn).unwrap_err();
        assert!(matches!(err, SendError::Closed));
    }
}
