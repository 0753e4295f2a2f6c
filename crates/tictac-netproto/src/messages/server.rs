use tictac_core::{Outcome, Symbol};

use super::{Fields, Message, push_field, push_text};
use crate::error::ProtoError;
use crate::msg_id::Keyword;

/// Server to client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMsg {
    /// `YOU_ARE_X` / `YOU_ARE_O`, sent once per session.
    Assign(Symbol),
    YourTurn,
    OpponentTurn,
    /// A move the session accepted, echoed to both peers.
    Move { symbol: Symbol, row: u8, col: u8 },
    /// Always a terminal outcome.
    GameOver(Outcome),
    InvalidMove(String),
    InvalidCommand(String),
    Message(String),
}

impl ServerMsg {
    pub fn message(text: impl Into<String>) -> Self {
        ServerMsg::Message(text.into())
    }

    pub fn invalid_move(reason: impl Into<String>) -> Self {
        ServerMsg::InvalidMove(reason.into())
    }

    pub fn invalid_command(reason: impl Into<String>) -> Self {
        ServerMsg::InvalidCommand(reason.into())
    }
}

impl Message for ServerMsg {
    fn keyword(&self) -> Keyword {
        match self {
            ServerMsg::Assign(Symbol::Cross) => Keyword::YouAreX,
            ServerMsg::Assign(Symbol::Nought) => Keyword::YouAreO,
            ServerMsg::YourTurn => Keyword::YourTurn,
            ServerMsg::OpponentTurn => Keyword::OpponentTurn,
            ServerMsg::Move { .. } => Keyword::Move,
            ServerMsg::GameOver(_) => Keyword::GameOver,
            ServerMsg::InvalidMove(_) => Keyword::InvalidMove,
            ServerMsg::InvalidCommand(_) => Keyword::InvalidCommand,
            ServerMsg::Message(_) => Keyword::Message,
        }
    }

    fn write_fields(&self, out: &mut String) -> Result<(), ProtoError> {
        match self {
            ServerMsg::Assign(_) | ServerMsg::YourTurn | ServerMsg::OpponentTurn => {}
            ServerMsg::Move { symbol, row, col } => {
                push_field(out, symbol);
                push_field(out, row);
                push_field(out, col);
            }
            ServerMsg::GameOver(outcome) => {
                if !outcome.is_terminal() {
                    return Err(ProtoError::NonTerminalOutcome);
                }
                push_field(out, outcome.wire_name());
            }
            ServerMsg::InvalidMove(text)
            | ServerMsg::InvalidCommand(text)
            | ServerMsg::Message(text) => push_text(out, text)?,
        }
        Ok(())
    }

    fn parse_fields(keyword: Keyword, rest: &str) -> Result<Self, ProtoError> {
        let mut fields = Fields::new(rest);
        let msg = match keyword {
            Keyword::YouAreX => ServerMsg::Assign(Symbol::Cross),
            Keyword::YouAreO => ServerMsg::Assign(Symbol::Nought),
            Keyword::YourTurn => ServerMsg::YourTurn,
            Keyword::OpponentTurn => ServerMsg::OpponentTurn,
            Keyword::Move => {
                let raw = fields.next("symbol")?;
                let symbol = raw
                    .parse::<Symbol>()
                    .map_err(|_| ProtoError::UnknownSymbol(raw.to_string()))?;
                let row = fields.coord("row")?;
                let col = fields.coord("col")?;
                ServerMsg::Move { symbol, row, col }
            }
            Keyword::GameOver => {
                let raw = fields.next("outcome")?;
                let outcome = raw
                    .parse::<Outcome>()
                    .map_err(|_| ProtoError::UnknownOutcome(raw.to_string()))?;
                if !outcome.is_terminal() {
                    return Err(ProtoError::NonTerminalOutcome);
                }
                ServerMsg::GameOver(outcome)
            }
            Keyword::InvalidMove => return Ok(ServerMsg::InvalidMove(rest.to_string())),
            Keyword::InvalidCommand => return Ok(ServerMsg::InvalidCommand(rest.to_string())),
            Keyword::Message => return Ok(ServerMsg::Message(rest.to_string())),
            Keyword::NewGameRequest => return Err(ProtoError::UnexpectedKeyword(keyword)),
        };
        fields.finish()?;
        Ok(msg)
    }
}
