//! Tic-tac-toe implementation for search validation.
//!
//! Tic-tac-toe is a solved game where perfect play always results in a draw,
//! and its positions are small enough to check search decisions by hand.

use serde::{Deserialize, Serialize};
use std::fmt;
use uct_core::{BoardCell, Game, GameError, Player, Result, Scores};

/// The eight winning lines of a 3x3 grid, as row-major cell indices.
pub(crate) const LINES: [[usize; 3]; 8] = [
    [0, 1, 2], // top row
    [3, 4, 5], // middle row
    [6, 7, 8], // bottom row
    [0, 3, 6], // left column
    [1, 4, 7], // center column
    [2, 5, 8], // right column
    [0, 4, 8], // main diagonal
    [2, 4, 6], // anti-diagonal
];

/// Owner of a completed line on `cells`, if any.
pub(crate) fn line_winner(cells: &[Option<Player>; 9]) -> Option<Player> {
    for line in LINES {
        if let Some(player) = cells[line[0]] {
            if cells[line[1]] == Some(player) && cells[line[2]] == Some(player) {
                return Some(player);
            }
        }
    }
    None
}

/// Tic-tac-toe board state.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct TicTacToeState {
    /// Board: 9 cells, indexed 0-8 (row-major).
    /// ```text
    /// 0 | 1 | 2
    /// ---------
    /// 3 | 4 | 5
    /// ---------
    /// 6 | 7 | 8
    /// ```
    board: [Option<Player>; 9],

    /// Current player to move.
    current: Player,

    /// Cached winner (if any).
    winner: Option<Player>,
}

impl TicTacToeState {
    /// Create a new empty board with Red to move.
    pub fn new() -> Self {
        Self {
            board: [None; 9],
            current: Player::Red,
            winner: None,
        }
    }

    /// Get the current player to move.
    pub fn current_player(&self) -> Player {
        self.current
    }

    /// Get the winner, if any.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Get the piece at a cell, if any.
    pub fn get(&self, cell: usize) -> Option<Player> {
        self.board.get(cell).copied().flatten()
    }

    /// Check if the board is full (draw if no winner).
    fn is_full(&self) -> bool {
        self.board.iter().all(|c| c.is_some())
    }
}

impl Default for TicTacToeState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicTacToeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..3 {
            if row > 0 {
                writeln!(f, "-----------")?;
            }
            for col in 0..3 {
                if col > 0 {
                    write!(f, "|")?;
                }
                match self.board[row * 3 + col] {
                    Some(Player::Red) => write!(f, " R ")?,
                    Some(Player::Blue) => write!(f, " B ")?,
                    None => write!(f, "   ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Tic-tac-toe action (cell index 0-8).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct TicTacToeAction(pub u8);

impl TicTacToeAction {
    /// Get the row (0-2).
    pub fn row(self) -> u8 {
        self.0 / 3
    }

    /// Get the column (0-2).
    pub fn col(self) -> u8 {
        self.0 % 3
    }
}

impl BoardCell for TicTacToeAction {
    fn cell(&self) -> (u8, u8) {
        (self.row(), self.col())
    }
}

impl fmt::Display for TicTacToeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row(), self.col())
    }
}

/// Tic-tac-toe game implementation.
#[derive(Clone, Debug)]
pub struct TicTacToe;

impl TicTacToe {
    /// Build a position by playing `cells` in order from the empty board.
    ///
    /// # Errors
    /// Returns `GameError::IllegalAction` on the first illegal cell.
    pub fn play(&self, cells: &[u8]) -> Result<TicTacToeState> {
        cells.iter().try_fold(self.initial_state(), |state, &cell| {
            self.next_state(&state, TicTacToeAction(cell))
        })
    }
}

impl Game for TicTacToe {
    type State = TicTacToeState;
    type Action = TicTacToeAction;

    fn initial_state(&self) -> Self::State {
        TicTacToeState::new()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if self.is_ended(state) {
            return Vec::new();
        }
        state
            .board
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| TicTacToeAction(i as u8))
            .collect()
    }

    fn next_state(&self, state: &Self::State, action: Self::Action) -> Result<Self::State> {
        let cell = action.0 as usize;
        if self.is_ended(state) || state.board.get(cell) != Some(&None) {
            return Err(GameError::IllegalAction(format!(
                "cell {} by {}",
                action, state.current
            )));
        }

        let mut new_state = state.clone();
        new_state.board[cell] = Some(state.current);
        new_state.current = state.current.opposite();
        new_state.winner = line_winner(&new_state.board);
        Ok(new_state)
    }

    fn is_ended(&self, state: &Self::State) -> bool {
        state.winner.is_some() || state.is_full()
    }

    fn points_values(&self, state: &Self::State) -> Result<Scores> {
        match state.winner {
            Some(winner) => Ok(Scores::win(winner)),
            None if state.is_full() => Ok(Scores::draw()),
            None => Err(GameError::NotTerminal),
        }
    }

    fn current_player(&self, state: &Self::State) -> Player {
        state.current
    }
}
