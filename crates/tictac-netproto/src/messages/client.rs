use super::{Fields, Message, push_field};
use crate::error::ProtoError;
use crate::msg_id::Keyword;

/// Client to server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMsg {
    /// Coordinates are not range-checked here; the session owns that rule.
    Move { row: u8, col: u8 },
    NewGameRequest,
}

impl Message for ClientMsg {
    fn keyword(&self) -> Keyword {
        match self {
            ClientMsg::Move { .. } => Keyword::Move,
            ClientMsg::NewGameRequest => Keyword::NewGameRequest,
        }
    }

    fn write_fields(&self, out: &mut String) -> Result<(), ProtoError> {
        if let ClientMsg::Move { row, col } = self {
            push_field(out, row);
            push_field(out, col);
        }
        Ok(())
    }

    fn parse_fields(keyword: Keyword, rest: &str) -> Result<Self, ProtoError> {
        let mut fields = Fields::new(rest);
        let msg = match keyword {
            Keyword::Move => {
                let row = fields.coord("row")?;
                let col = fields.coord("col")?;
                ClientMsg::Move { row, col }
            }
            Keyword::NewGameRequest => ClientMsg::NewGameRequest,
            other => return Err(ProtoError::UnexpectedKeyword(other)),
        };
        fields.finish()?;
        Ok(msg)
    }
}
