//! Client error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetplayError {
    #[error("Not connected to server!")]
    NotConnected,

    #[error("Not your turn.")]
    NotYourTurn,

    #[error("The game is over.")]
    GameFinished,

    #[error("Invalid move: {0}")]
    Move(#[from] tictac_core::MoveError),

    #[error("Connection refused. Server might not be running.")]
    ConnectionRefused,

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("connection lost: {0}")]
    ConnectionLost(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] tictac_netproto::ProtoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("channel send error")]
    ChannelSend,
}
