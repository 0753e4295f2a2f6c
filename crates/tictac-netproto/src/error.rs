use thiserror::Error;

use crate::msg_id::Keyword;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtoError {
    #[error("empty line")]
    Empty,
    #[error("unknown command: {0}")]
    UnknownCommand(String),
    #[error("{0} is not valid in this direction")]
    UnexpectedKeyword(Keyword),
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("unexpected trailing field: {0}")]
    TrailingField(String),
    #[error("field `{field}` is not a valid coordinate: {value}")]
    BadInteger { field: &'static str, value: String },
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("unknown outcome: {0}")]
    UnknownOutcome(String),
    #[error("game over requires a terminal outcome")]
    NonTerminalOutcome,
    #[error("text field contains a line break")]
    EmbeddedNewline,
    #[error("line too long: {0} bytes")]
    LineTooLong(usize),
}
