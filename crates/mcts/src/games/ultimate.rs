//! Ultimate tic-tac-toe: a 3x3 grid of tic-tac-toe boards.
//!
//! Rules:
//! - a move marks one cell of one small board;
//! - the inner cell chosen decides which small board the opponent must play
//!   in next, unless that board is already won or full, in which case any
//!   open board may be played;
//! - taking three cells in a line wins a small board, and taking three small
//!   boards in a line wins the game;
//! - when no open cell remains without a winner the game is drawn.

use super::tictactoe::line_winner;
use serde::{Deserialize, Serialize};
use std::fmt;
use uct_core::{BoardCell, Game, GameError, Player, Result, Scores};

/// One move: the small board `(board_row, board_col)` and the cell
/// `(row, col)` inside it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct UltimateAction {
    pub board_row: u8,
    pub board_col: u8,
    pub row: u8,
    pub col: u8,
}

impl UltimateAction {
    pub fn new(board_row: u8, board_col: u8, row: u8, col: u8) -> Self {
        Self {
            board_row,
            board_col,
            row,
            col,
        }
    }

    fn board_index(self) -> usize {
        (self.board_row * 3 + self.board_col) as usize
    }

    fn cell_index(self) -> usize {
        (self.row * 3 + self.col) as usize
    }

    fn in_range(self) -> bool {
        self.board_row < 3 && self.board_col < 3 && self.row < 3 && self.col < 3
    }
}

impl BoardCell for UltimateAction {
    fn cell(&self) -> (u8, u8) {
        (self.row, self.col)
    }
}

impl fmt::Display for UltimateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.board_row, self.board_col, self.row, self.col
        )
    }
}

/// Ultimate tic-tac-toe position.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct UltimateState {
    /// Cells of each small board, boards and cells both row-major.
    boards: [[Option<Player>; 9]; 9],

    /// Winner of each small board.
    owners: [Option<Player>; 9],

    /// Small board the next move must be played in, if constrained.
    forced: Option<usize>,

    current: Player,
    winner: Option<Player>,
}

impl UltimateState {
    /// Create an empty position with Red to move.
    pub fn new() -> Self {
        Self {
            boards: [[None; 9]; 9],
            owners: [None; 9],
            forced: None,
            current: Player::Red,
            winner: None,
        }
    }

    /// Winner of the whole game, if any.
    pub fn winner(&self) -> Option<Player> {
        self.winner
    }

    /// Winner of the small board at `(board_row, board_col)`, if any.
    pub fn owner(&self, board_row: u8, board_col: u8) -> Option<Player> {
        self.owners[(board_row * 3 + board_col) as usize]
    }

    /// Small board the next move is restricted to, as `(board_row, board_col)`.
    pub fn forced_board(&self) -> Option<(u8, u8)> {
        self.forced.map(|b| ((b / 3) as u8, (b % 3) as u8))
    }

    fn is_open(&self, board: usize) -> bool {
        self.owners[board].is_none() && self.boards[board].iter().any(|c| c.is_none())
    }

    fn open_boards(&self) -> impl Iterator<Item = usize> + '_ {
        (0..9).filter(move |&b| self.is_open(b))
    }
}

impl Default for UltimateState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UltimateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for board_row in 0..3 {
            if board_row > 0 {
                writeln!(f, "---+---+---")?;
            }
            for row in 0..3 {
                for board_col in 0..3 {
                    if board_col > 0 {
                        write!(f, "|")?;
                    }
                    for col in 0..3 {
                        let mark = match self.boards[board_row * 3 + board_col][row * 3 + col] {
                            Some(Player::Red) => 'R',
                            Some(Player::Blue) => 'B',
                            None => '.',
                        };
                        write!(f, "{}", mark)?;
                    }
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Ultimate tic-tac-toe game implementation.
#[derive(Clone, Debug)]
pub struct UltimateTicTacToe;

impl Game for UltimateTicTacToe {
    type State = UltimateState;
    type Action = UltimateAction;

    fn initial_state(&self) -> Self::State {
        UltimateState::new()
    }

    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
        if state.winner.is_some() {
            return Vec::new();
        }

        let boards: Vec<usize> = match state.forced {
            Some(b) if state.is_open(b) => vec![b],
            _ => state.open_boards().collect(),
        };

        let mut actions = Vec::new();
        for b in boards {
            for (c, cell) in state.boards[b].iter().enumerate() {
                if cell.is_none() {
                    actions.push(UltimateAction::new(
                        (b / 3) as u8,
                        (b % 3) as u8,
                        (c / 3) as u8,
                        (c % 3) as u8,
                    ));
                }
            }
        }
        actions
    }

    fn next_state(&self, state: &Self::State, action: Self::Action) -> Result<Self::State> {
        let legal = action.in_range() && self.legal_actions(state).contains(&action);
        if !legal {
            return Err(GameError::IllegalAction(format!(
                "{} by {}",
                action, state.current
            )));
        }

        let board = action.board_index();
        let cell = action.cell_index();

        let mut new_state = state.clone();
        new_state.boards[board][cell] = Some(state.current);
        if new_state.owners[board].is_none() {
            new_state.owners[board] = line_winner(&new_state.boards[board]);
        }
        new_state.winner = line_winner(&new_state.owners);
        new_state.forced = Some(cell);
        new_state.current = state.current.opposite();
        Ok(new_state)
    }

    fn is_ended(&self, state: &Self::State) -> bool {
        state.winner.is_some() || state.open_boards().next().is_none()
    }

    fn points_values(&self, state: &Self::State) -> Result<Scores> {
        match state.winner {
            Some(winner) => Ok(Scores::win(winner)),
            None if self.is_ended(state) => Ok(Scores::draw()),
            None => Err(GameError::NotTerminal),
        }
    }

    fn current_player(&self, state: &Self::State) -> Player {
        state.current
    }
}
