//! Replies for rejected input and reasons a session ends early.

use thiserror::Error;
use tictac_netproto::error::ProtoError;
use tictac_netproto::messages::server::ServerMsg;

use crate::net::framing::ReadLineError;

/// A line from the turn owner that did not produce a move.
///
/// Sent back to the same peer only; the turn does not advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    reply: ServerMsg,
}

impl Rejection {
    pub fn cell_occupied() -> Self {
        Self {
            reply: ServerMsg::invalid_move("Cell already occupied. Try again."),
        }
    }

    pub fn out_of_bounds() -> Self {
        Self {
            reply: ServerMsg::invalid_move("Move out of bounds. Try again."),
        }
    }

    pub fn malformed_move() -> Self {
        Self {
            reply: ServerMsg::invalid_move("Malformed move. Try again."),
        }
    }

    pub fn unknown_command() -> Self {
        Self {
            reply: ServerMsg::invalid_command("Unknown command. Try again."),
        }
    }

    pub fn rematch_unsupported() -> Self {
        Self {
            reply: ServerMsg::message(
                "A new game needs a new connection. Finish or leave this one first.",
            ),
        }
    }

    pub fn reply(&self) -> &ServerMsg {
        &self.reply
    }
}

/// Why a peer stopped taking part in its session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisconnectReason {
    #[error("eof")]
    Eof,
    #[error("read error: {0}")]
    ReadError(String),
    #[error("protocol error: {0}")]
    Protocol(ProtoError),
    #[error("turn timed out")]
    TimedOut,
    #[error("message rate limit exceeded")]
    RateLimited,
}

impl From<ReadLineError> for DisconnectReason {
    fn from(err: ReadLineError) -> Self {
        match err {
            ReadLineError::Io(e) => DisconnectReason::ReadError(e.to_string()),
            ReadLineError::Protocol(e) => DisconnectReason::Protocol(e),
        }
    }
}
