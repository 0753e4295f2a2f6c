//! The 3x3 grid and the move validator.

use std::fmt;

use thiserror::Error;

use crate::symbol::{Outcome, Symbol};

pub const ROWS: usize = 3;
pub const COLS: usize = 3;

/// Content of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(Symbol),
}

impl Cell {
    pub fn label(self) -> &'static str {
        match self {
            Cell::Empty => " ",
            Cell::Occupied(symbol) => symbol.label(),
        }
    }
}

/// Rejected move.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: u8, col: u8 },
    #[error("cell ({row}, {col}) is already occupied")]
    Occupied { row: u8, col: u8 },
}

/// A validated board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    row: u8,
    col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, MoveError> {
        if (row as usize) < ROWS && (col as usize) < COLS {
            Ok(Self { row, col })
        } else {
            Err(MoveError::OutOfBounds { row, col })
        }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn is_corner(self) -> bool {
        self.row != 1 && self.col != 1
    }

    fn on_main_diagonal(self) -> bool {
        self.row == self.col
    }

    fn on_anti_diagonal(self) -> bool {
        self.row as usize + self.col as usize == ROWS - 1
    }

    /// Row-major iteration over every cell.
    pub fn all() -> impl Iterator<Item = Position> {
        (0..ROWS as u8).flat_map(|row| (0..COLS as u8).map(move |col| Position { row, col }))
    }
}

/// Tic-tac-toe board.
///
/// Cells only ever go from `Empty` to `Occupied`; nothing clears them during a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row as usize][pos.col as usize]
    }

    pub fn is_empty_at(&self, pos: Position) -> bool {
        self.get(pos) == Cell::Empty
    }

    pub fn filled_count(&self) -> usize {
        Position::all().filter(|&p| !self.is_empty_at(p)).count()
    }

    pub fn empty_positions(&self) -> Vec<Position> {
        Position::all().filter(|&p| self.is_empty_at(p)).collect()
    }

    pub fn is_full(&self) -> bool {
        Position::all().all(|p| !self.is_empty_at(p))
    }

    /// Place `symbol` at (`row`, `col`) and classify the resulting board.
    ///
    /// Only the row, the column and (when the move sits on one) the diagonals
    /// through the new mark are inspected for a win. On error the board is
    /// left untouched.
    pub fn apply_move(&mut self, symbol: Symbol, row: u8, col: u8) -> Result<Outcome, MoveError> {
        let pos = Position::new(row, col)?;
        if !self.is_empty_at(pos) {
            return Err(MoveError::Occupied { row, col });
        }

        self.cells[pos.row as usize][pos.col as usize] = Cell::Occupied(symbol);
        Ok(self.outcome_after(symbol, pos))
    }

    /// Classify the board from scratch, looking at every line.
    pub fn outcome(&self) -> Outcome {
        for line in LINES {
            let [a, b, c] = line.map(|(row, col)| self.cells[row][col]);
            if let Cell::Occupied(symbol) = a
                && a == b
                && b == c
            {
                return Outcome::won_by(symbol);
            }
        }

        if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    fn outcome_after(&self, symbol: Symbol, pos: Position) -> Outcome {
        let mark = Cell::Occupied(symbol);
        let (r, c) = (pos.row as usize, pos.col as usize);

        let row_won = (0..COLS).all(|col| self.cells[r][col] == mark);
        let col_won = (0..ROWS).all(|row| self.cells[row][c] == mark);
        let main_won = pos.on_main_diagonal() && (0..ROWS).all(|i| self.cells[i][i] == mark);
        let anti_won =
            pos.on_anti_diagonal() && (0..ROWS).all(|i| self.cells[i][COLS - 1 - i] == mark);

        if row_won || col_won || main_won || anti_won {
            Outcome::won_by(symbol)
        } else if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }
}

const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f, "---+---+---")?;
            }
            let [a, b, c] = row.map(Cell::label);
            writeln!(f, " {a} | {b} | {c} ")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(moves: &[(Symbol, u8, u8)]) -> (Board, Outcome) {
        let mut board = Board::new();
        let mut outcome = Outcome::InProgress;
        for &(symbol, row, col) in moves {
            outcome = board.apply_move(symbol, row, col).unwrap();
        }
        (board, outcome)
    }

    #[test]
    fn empty_board_is_in_progress() {
        let board = Board::new();
        assert_eq!(board.outcome(), Outcome::InProgress);
        assert_eq!(board.filled_count(), 0);
        assert_eq!(board.empty_positions().len(), 9);
    }

    #[test]
    fn first_move_keeps_game_going() {
        let mut board = Board::new();
        assert_eq!(
            board.apply_move(Symbol::Cross, 0, 0),
            Ok(Outcome::InProgress)
        );
        assert_eq!(
            board.get(Position::new(0, 0).unwrap()),
            Cell::Occupied(Symbol::Cross)
        );
    }

    #[test]
    fn occupied_cell_is_rejected_without_change() {
        let mut board = Board::new();
        board.apply_move(Symbol::Cross, 1, 1).unwrap();
        let before = board;
        assert_eq!(
            board.apply_move(Symbol::Nought, 1, 1),
            Err(MoveError::Occupied { row: 1, col: 1 })
        );
        assert_eq!(board, before);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let mut board = Board::new();
        assert_eq!(
            board.apply_move(Symbol::Cross, 3, 0),
            Err(MoveError::OutOfBounds { row: 3, col: 0 })
        );
        assert_eq!(board.filled_count(), 0);
    }

    #[test]
    fn main_diagonal_win() {
        let (_, outcome) = play(&[
            (Symbol::Cross, 0, 0),
            (Symbol::Nought, 0, 1),
            (Symbol::Cross, 1, 1),
            (Symbol::Nought, 0, 2),
            (Symbol::Cross, 2, 2),
        ]);
        assert_eq!(outcome, Outcome::CrossWon);
    }

    #[test]
    fn anti_diagonal_win() {
        let (board, outcome) = play(&[
            (Symbol::Cross, 0, 0),
            (Symbol::Nought, 0, 2),
            (Symbol::Cross, 0, 1),
            (Symbol::Nought, 1, 1),
            (Symbol::Cross, 2, 2),
            (Symbol::Nought, 2, 0),
        ]);
        assert_eq!(outcome, Outcome::NoughtWon);
        assert_eq!(board.outcome(), Outcome::NoughtWon);
    }

    #[test]
    fn column_win() {
        let (_, outcome) = play(&[
            (Symbol::Cross, 0, 1),
            (Symbol::Nought, 0, 0),
            (Symbol::Cross, 1, 1),
            (Symbol::Nought, 2, 2),
            (Symbol::Cross, 2, 1),
        ]);
        assert_eq!(outcome, Outcome::CrossWon);
    }

    #[test]
    fn full_board_without_line_is_draw() {
        let (board, outcome) = play(&[
            (Symbol::Cross, 0, 0),
            (Symbol::Nought, 0, 1),
            (Symbol::Cross, 0, 2),
            (Symbol::Nought, 1, 1),
            (Symbol::Cross, 1, 0),
            (Symbol::Nought, 1, 2),
            (Symbol::Cross, 2, 1),
            (Symbol::Nought, 2, 0),
            (Symbol::Cross, 2, 2),
        ]);
        assert_eq!(outcome, Outcome::Draw);
        assert!(board.is_full());
        assert_eq!(board.outcome(), Outcome::Draw);
    }

    #[test]
    fn win_on_last_cell_is_not_a_draw() {
        let (board, outcome) = play(&[
            (Symbol::Cross, 0, 1),
            (Symbol::Nought, 0, 0),
            (Symbol::Cross, 0, 2),
            (Symbol::Nought, 1, 2),
            (Symbol::Cross, 1, 0),
            (Symbol::Nought, 2, 0),
            (Symbol::Cross, 2, 1),
            (Symbol::Nought, 2, 2),
            (Symbol::Cross, 1, 1),
        ]);
        assert_eq!(outcome, Outcome::CrossWon);
        assert!(board.is_full());
    }

    #[test]
    fn display_renders_grid() {
        let (board, _) = play(&[(Symbol::Cross, 0, 0), (Symbol::Nought, 2, 2)]);
        let text = board.to_string();
        assert!(text.starts_with(" X |   |   "));
        assert!(text.trim_end().ends_with("|   | O"));
    }
}
