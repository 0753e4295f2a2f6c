//! Session handler: the single consumer of network events and local commands.

use std::sync::Arc;

use parking_lot::Mutex;
use tictac_core::{Outcome, Symbol};
use tictac_netproto::ClientMsg;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::error::NetplayError;
use crate::session::ClientSession;
use crate::tcp_client::{TcpClientEvent, TcpClientHandle};

const COMMAND_QUEUE_LEN: usize = 32;

/// Session state shared with whoever renders it. Only the handler writes.
pub type SharedSession = Arc<Mutex<ClientSession>>;

/// Commands from the application to the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    SendMove { row: u8, col: u8 },
    NewGameRequest,
    Disconnect,
}

/// Everything the application gets to see, in server order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    Connected,
    RoleAssigned(Symbol),
    TurnChanged { my_turn: bool },
    MoveReceived { symbol: Symbol, row: u8, col: u8 },
    /// `INVALID_MOVE` or `INVALID_COMMAND`; the turn stays where it was.
    InvalidMove(String),
    GameOver(Outcome),
    /// Server advisories and local rejections.
    Message(String),
    Disconnected(String),
    ConnectionError(String),
}

/// Session handler that processes server lines and local commands.
pub struct SessionHandler {
    client: TcpClientHandle,
    session: SharedSession,
    event_rx: mpsc::Receiver<TcpClientEvent>,
    command_rx: mpsc::Receiver<ClientCommand>,
    update_tx: mpsc::Sender<ClientEvent>,
}

impl SessionHandler {
    /// Create a new session handler.
    ///
    /// Returns the handler and a command sender for controlling it.
    pub fn new(
        client: TcpClientHandle,
        session: SharedSession,
        event_rx: mpsc::Receiver<TcpClientEvent>,
        update_tx: mpsc::Sender<ClientEvent>,
    ) -> (Self, mpsc::Sender<ClientCommand>) {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_LEN);
        let handler = Self::with_commands(client, session, event_rx, command_rx, update_tx);
        (handler, command_tx)
    }

    /// Like [`SessionHandler::new`] for a command channel created before the
    /// connection existed.
    pub fn with_commands(
        client: TcpClientHandle,
        session: SharedSession,
        event_rx: mpsc::Receiver<TcpClientEvent>,
        command_rx: mpsc::Receiver<ClientCommand>,
        update_tx: mpsc::Sender<ClientEvent>,
    ) -> Self {
        Self {
            client,
            session,
            event_rx,
            command_rx,
            update_tx,
        }
    }

    /// Run until the connection ends or the application goes away.
    pub async fn run(&mut self) -> Result<(), NetplayError> {
        let mut commands_open = true;

        loop {
            // Server lines first, so a local command never races ahead of a
            // turn change that already arrived.
            tokio::select! {
                biased;

                event = self.event_rx.recv() => {
                    match event {
                        Some(TcpClientEvent::Connected) => {
                            info!(server = %self.client.server_addr(), "Connected to server");
                            let update = self.session.lock().on_connected();
                            self.publish(update).await?;
                        }
                        Some(TcpClientEvent::Message(msg)) => {
                            let update = self.session.lock().on_server_message(msg);
                            self.publish(update).await?;
                        }
                        Some(TcpClientEvent::Malformed { line, error }) => {
                            warn!(%line, %error, "Skipping malformed server line");
                        }
                        Some(TcpClientEvent::Disconnected { reason }) => {
                            warn!(%reason, "Session disconnected");
                            let update = self.session.lock().on_disconnected(reason);
                            self.publish(update).await?;
                            return Ok(());
                        }
                        Some(TcpClientEvent::Error(e)) => {
                            error!("Connection error: {}", e);
                            self.publish(ClientEvent::ConnectionError(e)).await?;
                        }
                        None => {
                            debug!("Event channel closed");
                            return Ok(());
                        }
                    }
                }
                cmd = self.command_rx.recv(), if commands_open => {
                    match cmd {
                        Some(ClientCommand::SendMove { row, col }) => {
                            let prepared = self.session.lock().prepare_move(row, col);
                            self.send_or_report(prepared).await?;
                        }
                        Some(ClientCommand::NewGameRequest) => {
                            let prepared = self.session.lock().prepare_new_game_request();
                            self.send_or_report(prepared).await?;
                        }
                        Some(ClientCommand::Disconnect) => {
                            let _ = self.client.disconnect().await;
                            let update = self
                                .session
                                .lock()
                                .on_disconnected("disconnected by user".to_string());
                            self.publish(update).await?;
                            return Ok(());
                        }
                        None => {
                            debug!("Command channel closed");
                            commands_open = false;
                        }
                    }
                }
            }
        }
    }

    async fn send_or_report(
        &mut self,
        prepared: Result<ClientMsg, NetplayError>,
    ) -> Result<(), NetplayError> {
        match prepared {
            Ok(msg) => {
                debug!(?msg, "Sending to server");
                self.client.send_message(&msg).await
            }
            Err(rejected) => {
                debug!(%rejected, "Command rejected locally");
                self.publish(ClientEvent::Message(rejected.to_string())).await
            }
        }
    }

    async fn publish(&self, update: ClientEvent) -> Result<(), NetplayError> {
        self.update_tx
            .send(update)
            .await
            .map_err(|_| NetplayError::ChannelSend)
    }
}
