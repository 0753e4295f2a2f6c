//! Tic-tac-toe rules shared by the server and the client.
//!
//! - [`board`]: the 3x3 grid and the move validator
//! - [`symbol`]: playable marks and game outcomes
//! - [`ai`]: fixed-priority move selection

pub mod ai;
pub mod board;
pub mod symbol;

pub use ai::{HeuristicAi, MoveSelector};
pub use board::{Board, COLS, Cell, MoveError, Position, ROWS};
pub use symbol::{Outcome, Symbol};
