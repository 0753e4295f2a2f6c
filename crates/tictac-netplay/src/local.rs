//! Offline game against a [`MoveSelector`], no server involved.

use tictac_core::{Board, MoveSelector, Outcome, Position, Symbol};
use tracing::debug;

use crate::error::NetplayError;

/// One human against the computer on a local board.
///
/// Whoever starts plays X, matching the networked game where X always
/// moves first.
#[derive(Debug)]
pub struct LocalGame<S> {
    selector: S,
    board: Board,
    human: Symbol,
    turn: Symbol,
}

impl<S: MoveSelector> LocalGame<S> {
    pub fn new(selector: S, human_starts: bool) -> Self {
        let human = if human_starts {
            Symbol::Cross
        } else {
            Symbol::Nought
        };
        Self {
            selector,
            board: Board::new(),
            human,
            turn: Symbol::Cross,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn human(&self) -> Symbol {
        self.human
    }

    pub fn computer(&self) -> Symbol {
        self.human.opponent()
    }

    pub fn outcome(&self) -> Outcome {
        self.board.outcome()
    }

    pub fn is_human_turn(&self) -> bool {
        !self.outcome().is_terminal() && self.turn == self.human
    }

    /// Play the human's mark. A rejected move leaves the turn with the human.
    pub fn human_move(&mut self, row: u8, col: u8) -> Result<Outcome, NetplayError> {
        if self.outcome().is_terminal() {
            return Err(NetplayError::GameFinished);
        }
        if self.turn != self.human {
            return Err(NetplayError::NotYourTurn);
        }
        self.place(row, col)
    }

    /// Let the computer play if it is its turn.
    ///
    /// Returns the cell it took, or `None` when it was not its move.
    pub fn computer_move(&mut self) -> Result<Option<Position>, NetplayError> {
        if self.outcome().is_terminal() || self.turn == self.human {
            return Ok(None);
        }
        let Some(pos) = self.selector.select_move(&self.board, self.turn) else {
            return Ok(None);
        };
        debug!(?pos, symbol = %self.turn, "Computer move");
        self.place(pos.row(), pos.col())?;
        Ok(Some(pos))
    }

    fn place(&mut self, row: u8, col: u8) -> Result<Outcome, NetplayError> {
        let outcome = self.board.apply_move(self.turn, row, col)?;
        self.turn = self.turn.opponent();
        Ok(outcome)
    }
}
