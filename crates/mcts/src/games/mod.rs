//! Reference games for search validation and the arena.

pub mod tictactoe;
pub mod ultimate;

pub use tictactoe::{TicTacToe, TicTacToeAction, TicTacToeState};
pub use ultimate::{UltimateAction, UltimateState, UltimateTicTacToe};
