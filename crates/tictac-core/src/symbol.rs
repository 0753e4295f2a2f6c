use strum::{Display, EnumString, IntoStaticStr};

/// One of the two playable marks.
///
/// `Cross` is always assigned to the first peer of a pairing and always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Symbol {
    #[strum(serialize = "X")]
    Cross,
    #[strum(serialize = "O")]
    Nought,
}

impl Symbol {
    /// Both symbols in turn order.
    pub const ALL: [Symbol; 2] = [Symbol::Cross, Symbol::Nought];

    pub fn opponent(self) -> Self {
        match self {
            Symbol::Cross => Symbol::Nought,
            Symbol::Nought => Symbol::Cross,
        }
    }

    /// Human-readable label, identical to the wire form.
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Slot index used by fixed-size per-player arrays.
    pub fn index(self) -> usize {
        match self {
            Symbol::Cross => 0,
            Symbol::Nought => 1,
        }
    }
}

/// Classification of a board state.
///
/// Never stored on its own: always derived from a [`crate::Board`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Outcome {
    #[strum(serialize = "PLAYING")]
    InProgress,
    #[strum(serialize = "DRAW")]
    Draw,
    #[strum(serialize = "CROSS_WON")]
    CrossWon,
    #[strum(serialize = "NOUGHT_WON")]
    NoughtWon,
}

impl Outcome {
    pub fn won_by(symbol: Symbol) -> Self {
        match symbol {
            Symbol::Cross => Outcome::CrossWon,
            Symbol::Nought => Outcome::NoughtWon,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    pub fn winner(self) -> Option<Symbol> {
        match self {
            Outcome::CrossWon => Some(Symbol::Cross),
            Outcome::NoughtWon => Some(Symbol::Nought),
            Outcome::InProgress | Outcome::Draw => None,
        }
    }

    /// Wire name (`PLAYING`, `DRAW`, `CROSS_WON`, `NOUGHT_WON`).
    pub fn wire_name(self) -> &'static str {
        self.into()
    }

    /// Status-bar text.
    pub fn label(self) -> &'static str {
        match self {
            Outcome::InProgress => "Playing",
            Outcome::Draw => "It's a Draw",
            Outcome::CrossWon => "'X' Won",
            Outcome::NoughtWon => "'O' Won",
        }
    }
}
