//! Tic-tac-toe network client.
//!
//! # Architecture
//!
//! - [`tcp_client`]: socket reader/writer tasks and line decoding
//! - [`session`]: the client state machine and mirrored board
//! - [`handler`]: single consumer that applies server lines and local commands
//! - [`local`]: offline game against the computer
//! - [`error`]: Error types
//!
//! [`spawn_client`] wires all of it together for an application.

use std::net::SocketAddr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::warn;

pub mod error;
pub mod handler;
pub mod local;
pub mod session;
pub mod tcp_client;

pub use error::NetplayError;
pub use handler::{ClientCommand, ClientEvent, SessionHandler, SharedSession};
pub use local::LocalGame;
pub use session::{ClientSession, ClientState};
pub use tcp_client::{TcpClientEvent, TcpClientHandle, connect};

const EVENT_QUEUE_LEN: usize = 64;

/// Application side of a running client.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    commands: mpsc::Sender<ClientCommand>,
    session: SharedSession,
}

impl ClientHandle {
    pub async fn send_move(&self, row: u8, col: u8) -> Result<(), NetplayError> {
        self.command(ClientCommand::SendMove { row, col }).await
    }

    pub async fn request_new_game(&self) -> Result<(), NetplayError> {
        self.command(ClientCommand::NewGameRequest).await
    }

    pub async fn disconnect(&self) -> Result<(), NetplayError> {
        self.command(ClientCommand::Disconnect).await
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> ClientSession {
        self.session.lock().clone()
    }

    async fn command(&self, cmd: ClientCommand) -> Result<(), NetplayError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| NetplayError::NotConnected)
    }
}

/// Connect to `addr` in the background and start the session handler.
///
/// Must be called from within a tokio runtime. A failed connect shows up as
/// [`ClientEvent::ConnectionError`] on the returned receiver.
pub fn spawn_client(addr: SocketAddr) -> (ClientHandle, mpsc::Receiver<ClientEvent>) {
    let session: SharedSession = Arc::new(Mutex::new(ClientSession::new()));
    session.lock().on_connecting();

    let (command_tx, command_rx) = mpsc::channel(EVENT_QUEUE_LEN);
    let (update_tx, update_rx) = mpsc::channel(EVENT_QUEUE_LEN);

    let shared = session.clone();
    tokio::spawn(async move {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_LEN);
        let client = match connect(addr, event_tx).await {
            Ok(client) => client,
            Err(e) => {
                warn!(%addr, error = %e, "Could not connect");
                let update = shared.lock().on_connection_error(e.to_string());
                let _ = update_tx.send(update).await;
                return;
            }
        };

        let mut handler =
            SessionHandler::with_commands(client, shared, event_rx, command_rx, update_tx);
        if let Err(e) = handler.run().await {
            warn!(error = %e, "Client session ended with error");
        }
    });

    let handle = ClientHandle {
        commands: command_tx,
        session,
    };
    (handle, update_rx)
}
