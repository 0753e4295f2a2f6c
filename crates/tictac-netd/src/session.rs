//! One paired game, from role assignment to the terminal broadcast.
//!
//! A [`Session`] owns both [`PeerConnection`]s and its [`Board`] outright and
//! runs on its own task. Only the turn owner's stream is ever read, so the
//! two peers can never race each other; a line the other peer sends early
//! just waits in its socket until the turn flips.

use std::time::Duration;

use tictac_core::{Board, MoveError, Outcome, Symbol};
use tictac_netproto::codec::decode_message;
use tictac_netproto::messages::client::ClientMsg;
use tictac_netproto::messages::server::ServerMsg;
use tictac_netproto::msg_id::Keyword;
use tokio::io::AsyncRead;
use tracing::{debug, info};

pub mod error;
pub mod peer;

pub use error::{DisconnectReason, Rejection};
pub use peer::PeerConnection;

pub type SessionId = u64;

pub const OPPONENT_DISCONNECTED: &str = "Opponent disconnected.";
pub const TURN_TIMED_OUT: &str = "You took too long to move.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingRoleAssignment,
    Turn(Symbol),
    Terminal,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Finished(Outcome),
    /// The turn owner left (or was dropped) before the game finished.
    Abandoned { by: Symbol, reason: DisconnectReason },
}

/// A move that landed on the board.
struct Applied {
    row: u8,
    col: u8,
    outcome: Outcome,
}

pub struct Session<R> {
    id: SessionId,
    board: Board,
    state: SessionState,
    /// Indexed by [`Symbol::index`].
    players: [PeerConnection<R>; 2],
    turn_timeout: Option<Duration>,
}

impl<R: AsyncRead + Unpin> Session<R> {
    /// `first` plays X and moves first, `second` plays O.
    pub fn new(
        id: SessionId,
        mut first: PeerConnection<R>,
        mut second: PeerConnection<R>,
        turn_timeout: Option<Duration>,
    ) -> Self {
        first.bind_role(Symbol::Cross);
        second.bind_role(Symbol::Nought);
        Self {
            id,
            board: Board::new(),
            state: SessionState::AwaitingRoleAssignment,
            players: [first, second],
            turn_timeout,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn player(&self, symbol: Symbol) -> &PeerConnection<R> {
        &self.players[symbol.index()]
    }

    /// Drive the game to its end and close both connections.
    pub async fn run(mut self) -> SessionEnd {
        info!(
            session_id = self.id,
            x = self.player(Symbol::Cross).conn_id(),
            o = self.player(Symbol::Nought).conn_id(),
            "Session started"
        );
        self.assign_roles().await;

        let mut turn = Symbol::Cross;
        let end = loop {
            self.state = SessionState::Turn(turn);
            self.announce_turn(turn).await;

            match self.play_turn(turn).await {
                Ok(Outcome::InProgress) => turn = turn.opponent(),
                Ok(outcome) => {
                    self.broadcast(&ServerMsg::GameOver(outcome)).await;
                    info!(session_id = self.id, outcome = %outcome, "Game over");
                    break SessionEnd::Finished(outcome);
                }
                Err(reason) => {
                    info!(session_id = self.id, symbol = %turn, %reason, "Player left mid-game");
                    if reason == DisconnectReason::TimedOut {
                        self.player(turn).notify(&ServerMsg::message(TURN_TIMED_OUT)).await;
                    }
                    self.player(turn.opponent())
                        .notify(&ServerMsg::message(OPPONENT_DISCONNECTED))
                        .await;
                    break SessionEnd::Abandoned { by: turn, reason };
                }
            }
        };

        self.state = SessionState::Terminal;
        let [x, o] = self.players;
        tokio::join!(x.close(), o.close());
        debug!(session_id = self.id, "Session closed");
        end
    }

    async fn assign_roles(&self) {
        let x = self.player(Symbol::Cross);
        let o = self.player(Symbol::Nought);

        x.notify(&ServerMsg::Assign(Symbol::Cross)).await;
        o.notify(&ServerMsg::Assign(Symbol::Nought)).await;
        x.notify(&ServerMsg::message("X's Turn. Make your move.")).await;
        o.notify(&ServerMsg::message("X's Turn. Wait for opponent."))
            .await;
    }

    async fn announce_turn(&self, turn: Symbol) {
        self.player(turn).notify(&ServerMsg::YourTurn).await;
        self.player(turn.opponent())
            .notify(&ServerMsg::OpponentTurn)
            .await;
    }

    async fn broadcast(&self, msg: &ServerMsg) {
        for player in &self.players {
            player.notify(msg).await;
        }
    }

    /// Read from the turn owner until one of its lines lands on the board.
    async fn play_turn(&mut self, turn: Symbol) -> Result<Outcome, DisconnectReason> {
        loop {
            let line = self.read_from(turn).await?;
            debug!(session_id = self.id, symbol = %turn, %line, "Received line");

            match self.apply_line(turn, &line) {
                Ok(Applied { row, col, outcome }) => {
                    self.broadcast(&ServerMsg::Move {
                        symbol: turn,
                        row,
                        col,
                    })
                    .await;
                    return Ok(outcome);
                }
                Err(rejection) => self.player(turn).notify(rejection.reply()).await,
            }
        }
    }

    async fn read_from(&mut self, turn: Symbol) -> Result<String, DisconnectReason> {
        let limit = self.turn_timeout;
        let peer = &mut self.players[turn.index()];
        match limit {
            Some(limit) => tokio::time::timeout(limit, peer.next_line())
                .await
                .map_err(|_| DisconnectReason::TimedOut)?,
            None => peer.next_line().await,
        }
    }

    fn apply_line(&mut self, turn: Symbol, line: &str) -> Result<Applied, Rejection> {
        match decode_message::<ClientMsg>(line) {
            Ok(ClientMsg::Move { row, col }) => {
                let outcome = self
                    .board
                    .apply_move(turn, row, col)
                    .map_err(|err| match err {
                        MoveError::OutOfBounds { .. } => Rejection::out_of_bounds(),
                        MoveError::Occupied { .. } => Rejection::cell_occupied(),
                    })?;
                Ok(Applied { row, col, outcome })
            }
            Ok(ClientMsg::NewGameRequest) => Err(Rejection::rematch_unsupported()),
            Err(err) if Keyword::of_line(line) == Some(Keyword::Move) => {
                debug!(session_id = self.id, error = %err, "Malformed move");
                Err(Rejection::malformed_move())
            }
            Err(err) => {
                debug!(session_id = self.id, error = %err, "Unknown command");
                Err(Rejection::unknown_command())
            }
        }
    }
}
