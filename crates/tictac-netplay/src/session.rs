use tictac_core::{Board, Outcome, Symbol};
use tictac_netproto::{ClientMsg, ServerMsg};
use tracing::warn;

use crate::error::NetplayError;
use crate::handler::ClientEvent;

/// Client-side view of a game, driven only by what the server says.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    /// Not connected to any server.
    #[default]
    Disconnected,
    /// TCP connect in progress.
    Connecting,
    /// Connected, waiting for an opponent and a role.
    WaitingForRole,
    MyTurn,
    OpponentTurn,
    /// The server announced the end of the game.
    GameOver(Outcome),
}

/// Client session context.
///
/// Holds the role, a mirror of the server's board and the turn flag. Each
/// server message moves it through exactly one transition.
#[derive(Debug, Clone, Default)]
pub struct ClientSession {
    state: ClientState,
    connected: bool,
    role: Option<Symbol>,
    board: Board,
    is_my_turn: bool,
    /// Sent but not yet echoed back by the server.
    pending_move: Option<(u8, u8)>,
}

impl ClientSession {
    /// Create a new disconnected session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn role(&self) -> Option<Symbol> {
        self.role
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn is_my_turn(&self) -> bool {
        self.is_my_turn
    }

    pub fn pending_move(&self) -> Option<(u8, u8)> {
        self.pending_move
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn on_connecting(&mut self) {
        *self = Self {
            state: ClientState::Connecting,
            ..Self::default()
        };
    }

    pub fn on_connected(&mut self) -> ClientEvent {
        self.connected = true;
        self.state = ClientState::WaitingForRole;
        ClientEvent::Connected
    }

    pub fn on_connection_error(&mut self, reason: String) -> ClientEvent {
        self.connected = false;
        self.state = ClientState::Disconnected;
        self.is_my_turn = false;
        ClientEvent::ConnectionError(reason)
    }

    /// The connection is gone. A finished game keeps its outcome.
    pub fn on_disconnected(&mut self, reason: String) -> ClientEvent {
        self.connected = false;
        if !matches!(self.state, ClientState::GameOver(_)) {
            self.state = ClientState::Disconnected;
        }
        self.is_my_turn = false;
        self.pending_move = None;
        ClientEvent::Disconnected(reason)
    }

    /// Apply one server message.
    pub fn on_server_message(&mut self, msg: ServerMsg) -> ClientEvent {
        match msg {
            ServerMsg::Assign(symbol) => {
                self.role = Some(symbol);
                self.is_my_turn = false;
                self.state = ClientState::OpponentTurn;
                ClientEvent::RoleAssigned(symbol)
            }
            ServerMsg::YourTurn => self.set_turn(true),
            ServerMsg::OpponentTurn => self.set_turn(false),
            ServerMsg::Move { symbol, row, col } => {
                if let Err(error) = self.board.apply_move(symbol, row, col) {
                    warn!(%symbol, row, col, %error, "Server move does not fit the local board");
                }
                if Some(symbol) == self.role {
                    self.pending_move = None;
                }
                ClientEvent::MoveReceived { symbol, row, col }
            }
            ServerMsg::GameOver(outcome) => {
                self.state = ClientState::GameOver(outcome);
                self.is_my_turn = false;
                self.pending_move = None;
                ClientEvent::GameOver(outcome)
            }
            ServerMsg::InvalidMove(reason) | ServerMsg::InvalidCommand(reason) => {
                self.reclaim_turn();
                ClientEvent::InvalidMove(reason)
            }
            ServerMsg::Message(text) => ClientEvent::Message(text),
        }
    }

    fn set_turn(&mut self, mine: bool) -> ClientEvent {
        self.is_my_turn = mine;
        self.state = if mine {
            ClientState::MyTurn
        } else {
            ClientState::OpponentTurn
        };
        ClientEvent::TurnChanged { my_turn: mine }
    }

    /// A rejection means the server kept the turn with us and will not say
    /// `YOUR_TURN` again.
    fn reclaim_turn(&mut self) {
        self.pending_move = None;
        if self.state == ClientState::MyTurn {
            self.is_my_turn = true;
        }
    }

    /// Check a local move and build the line to send.
    ///
    /// On success the local turn is marked as over until the server says
    /// otherwise. Bounds and occupancy are left to the server.
    pub fn prepare_move(&mut self, row: u8, col: u8) -> Result<ClientMsg, NetplayError> {
        if !self.connected {
            return Err(NetplayError::NotConnected);
        }
        match self.state {
            ClientState::GameOver(_) => return Err(NetplayError::GameFinished),
            _ if !self.is_my_turn => return Err(NetplayError::NotYourTurn),
            _ => {}
        }

        self.is_my_turn = false;
        self.pending_move = Some((row, col));
        Ok(ClientMsg::Move { row, col })
    }

    pub fn prepare_new_game_request(&self) -> Result<ClientMsg, NetplayError> {
        if self.connected {
            Ok(ClientMsg::NewGameRequest)
        } else {
            Err(NetplayError::NotConnected)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tictac_core::Position;

    fn connected_as(symbol: Symbol) -> ClientSession {
        let mut session = ClientSession::new();
        session.on_connecting();
        session.on_connected();
        session.on_server_message(ServerMsg::Assign(symbol));
        session
    }

    #[test]
    fn starts_disconnected_and_rejects_moves() {
        let mut session = ClientSession::new();
        assert_eq!(session.state(), ClientState::Disconnected);
        assert!(matches!(
            session.prepare_move(0, 0),
            Err(NetplayError::NotConnected)
        ));
        assert!(matches!(
            session.prepare_new_game_request(),
            Err(NetplayError::NotConnected)
        ));
    }

    #[test]
    fn role_assignment_does_not_grant_the_turn() {
        let mut session = connected_as(Symbol::Cross);
        assert_eq!(session.role(), Some(Symbol::Cross));
        assert!(!session.is_my_turn());
        assert!(matches!(
            session.prepare_move(1, 1),
            Err(NetplayError::NotYourTurn)
        ));
    }

    #[test]
    fn only_the_server_hands_out_turns() {
        let mut session = connected_as(Symbol::Cross);
        assert_eq!(
            session.on_server_message(ServerMsg::YourTurn),
            ClientEvent::TurnChanged { my_turn: true }
        );
        assert_eq!(session.state(), ClientState::MyTurn);

        let msg = session.prepare_move(1, 1).unwrap();
        assert_eq!(msg, ClientMsg::Move { row: 1, col: 1 });
        assert!(!session.is_my_turn());
        assert_eq!(session.pending_move(), Some((1, 1)));
        assert!(matches!(
            session.prepare_move(0, 0),
            Err(NetplayError::NotYourTurn)
        ));

        // The echo confirms the move but does not change whose turn it is.
        let event = session.on_server_message(ServerMsg::Move {
            symbol: Symbol::Cross,
            row: 1,
            col: 1,
        });
        assert_eq!(
            event,
            ClientEvent::MoveReceived {
                symbol: Symbol::Cross,
                row: 1,
                col: 1
            }
        );
        assert_eq!(session.pending_move(), None);
        assert!(!session.is_my_turn());
        assert_eq!(
            session.board().get(Position::new(1, 1).unwrap()),
            tictac_core::Cell::Occupied(Symbol::Cross)
        );

        session.on_server_message(ServerMsg::OpponentTurn);
        assert_eq!(session.state(), ClientState::OpponentTurn);
    }

    #[test]
    fn rejected_move_gives_the_turn_back() {
        let mut session = connected_as(Symbol::Nought);
        session.on_server_message(ServerMsg::YourTurn);
        session.prepare_move(1, 1).unwrap();

        let event =
            session.on_server_message(ServerMsg::invalid_move("Cell already occupied. Try again."));
        assert_eq!(
            event,
            ClientEvent::InvalidMove("Cell already occupied. Try again.".into())
        );
        assert!(session.is_my_turn());
        assert_eq!(session.pending_move(), None);
        assert!(session.prepare_move(0, 0).is_ok());
    }

    #[test]
    fn stray_rejection_does_not_grant_a_turn() {
        let mut session = connected_as(Symbol::Nought);
        session.on_server_message(ServerMsg::OpponentTurn);
        let event =
            session.on_server_message(ServerMsg::invalid_command("Unknown command. Try again."));
        assert_eq!(
            event,
            ClientEvent::InvalidMove("Unknown command. Try again.".into())
        );
        assert!(!session.is_my_turn());
    }

    #[test]
    fn game_over_survives_the_disconnect() {
        let mut session = connected_as(Symbol::Cross);
        session.on_server_message(ServerMsg::YourTurn);
        assert_eq!(
            session.on_server_message(ServerMsg::GameOver(Outcome::Draw)),
            ClientEvent::GameOver(Outcome::Draw)
        );
        assert!(matches!(
            session.prepare_move(0, 0),
            Err(NetplayError::GameFinished)
        ));

        session.on_disconnected("server closed connection".into());
        assert_eq!(session.state(), ClientState::GameOver(Outcome::Draw));
        assert!(!session.is_connected());
        assert!(matches!(
            session.prepare_new_game_request(),
            Err(NetplayError::NotConnected)
        ));
    }

    #[test]
    fn disconnect_mid_game_resets_state() {
        let mut session = connected_as(Symbol::Cross);
        session.on_server_message(ServerMsg::YourTurn);
        session.on_disconnected("server closed connection".into());
        assert_eq!(session.state(), ClientState::Disconnected);
        assert!(matches!(
            session.prepare_move(0, 0),
            Err(NetplayError::NotConnected)
        ));
    }

    #[test]
    fn generic_messages_do_not_touch_state() {
        let mut session = connected_as(Symbol::Cross);
        session.on_server_message(ServerMsg::YourTurn);
        let event = session.on_server_message(ServerMsg::message("X's Turn. Make your move."));
        assert_eq!(event, ClientEvent::Message("X's Turn. Make your move.".into()));
        assert_eq!(session.state(), ClientState::MyTurn);
        assert!(session.is_my_turn());
    }
}
