//! Fixed-priority move selection for computer-controlled players.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::trace;

use crate::board::{Board, Position};
use crate::symbol::Symbol;

const CENTER: (u8, u8) = (1, 1);
const CORNERS: [(u8, u8); 4] = [(0, 0), (0, 2), (2, 0), (2, 2)];

/// Something that can pick the next cell for `me`.
pub trait MoveSelector {
    /// Returns `None` only when the board has no empty cell.
    fn select_move(&mut self, board: &Board, me: Symbol) -> Option<Position>;
}

/// Win, else block, else center, else a corner, else any empty cell.
#[derive(Debug)]
pub struct HeuristicAi<R = StdRng> {
    rng: R,
}

impl HeuristicAi<StdRng> {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_rng(&mut rand::rng()),
        }
    }

    /// Deterministic fallback choices, for tests and replays.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for HeuristicAi<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> HeuristicAi<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

/// First empty cell where `symbol` would complete a line.
fn winning_cell(board: &Board, symbol: Symbol) -> Option<Position> {
    board.empty_positions().into_iter().find(|&pos| {
        let mut probe = *board;
        probe
            .apply_move(symbol, pos.row(), pos.col())
            .is_ok_and(|outcome| outcome.winner() == Some(symbol))
    })
}

fn first_empty(board: &Board, cells: &[(u8, u8)]) -> Option<Position> {
    cells
        .iter()
        .filter_map(|&(row, col)| Position::new(row, col).ok())
        .find(|&pos| board.is_empty_at(pos))
}

impl<R: Rng> MoveSelector for HeuristicAi<R> {
    fn select_move(&mut self, board: &Board, me: Symbol) -> Option<Position> {
        if let Some(pos) = winning_cell(board, me) {
            trace!(?pos, "ai: completing own line");
            return Some(pos);
        }
        if let Some(pos) = winning_cell(board, me.opponent()) {
            trace!(?pos, "ai: blocking opponent");
            return Some(pos);
        }
        if let Some(pos) = first_empty(board, &[CENTER]) {
            return Some(pos);
        }
        if let Some(pos) = first_empty(board, &CORNERS) {
            return Some(pos);
        }

        board.empty_positions().choose(&mut self.rng).copied()
    }
}
