use strum::{Display, EnumString, IntoStaticStr};

/// Leading token of every protocol line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Keyword {
    #[strum(serialize = "YOU_ARE_X")]
    YouAreX,
    #[strum(serialize = "YOU_ARE_O")]
    YouAreO,
    #[strum(serialize = "YOUR_TURN")]
    YourTurn,
    #[strum(serialize = "OPPONENT_TURN")]
    OpponentTurn,
    #[strum(serialize = "MOVE")]
    Move,
    #[strum(serialize = "GAME_OVER")]
    GameOver,
    #[strum(serialize = "INVALID_MOVE")]
    InvalidMove,
    #[strum(serialize = "INVALID_COMMAND")]
    InvalidCommand,
    #[strum(serialize = "MESSAGE")]
    Message,
    #[strum(serialize = "NEW_GAME_REQUEST")]
    NewGameRequest,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Keyword at the start of `line`, if it is a known one.
    pub fn of_line(line: &str) -> Option<Keyword> {
        line.split_ascii_whitespace().next()?.parse().ok()
    }
}
