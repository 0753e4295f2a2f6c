use std::collections::VecDeque;
use std::io;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tictac_netproto::codec::try_decode_lines;
use tictac_netproto::error::ProtoError;
use tictac_netproto::limits::RX_BUFFER_SIZE;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Line splitting over a growable receive buffer.
///
/// - keeps an internal receive buffer (`BytesMut`)
/// - splits off as many complete lines as possible
/// - keeps the unterminated tail for the next read
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(initial_capacity),
        }
    }

    /// Mutable access to the receive buffer for `read_buf`.
    pub fn buf_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }

    /// Split every complete line out of the buffer.
    pub fn drain_lines(&mut self) -> Result<Vec<String>, ProtoError> {
        let (lines, consumed) = try_decode_lines(&self.buf)?;
        self.buf.advance(consumed);
        Ok(lines)
    }
}

#[derive(Debug, Error)]
pub enum ReadLineError {
    #[error("read error: {0}")]
    Io(#[from] io::Error),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtoError),
}

/// Reads one line at a time from an async byte stream.
pub struct LineReader<R> {
    read: R,
    framer: LineFramer,
    pending: VecDeque<String>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    pub fn new(read: R) -> Self {
        Self {
            read,
            framer: LineFramer::new(RX_BUFFER_SIZE),
            pending: VecDeque::new(),
        }
    }

    /// Next complete line, or `Ok(None)` once the peer has closed its side.
    ///
    /// Cancel safe: dropping the future never loses bytes that were already
    /// read, so it can sit in a `select!` next to a timer.
    pub async fn next_line(&mut self) -> Result<Option<String>, ReadLineError> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Ok(Some(line));
            }

            self.framer.buf_mut().reserve(1024);
            let n = self.read.read_buf(self.framer.buf_mut()).await?;
            if n == 0 {
                // An unterminated tail at EOF is dropped.
                return Ok(None);
            }
            self.pending.extend(self.framer.drain_lines()?);
        }
    }
}
