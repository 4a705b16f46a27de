use crate::{Player, Result, Scores};
use std::fmt::Debug;
use std::hash::Hash;

/// A two-player, perfect-information game as seen by the search engine.
///
/// The search never looks inside states or actions. States are values:
/// `next_state` returns a fresh state and leaves its input untouched, so the
/// same state can be shared between sibling branches of a search tree.
pub trait Game: Clone + Send + Sync {
    /// The game state (e.g., a board position)
    type State: Clone + Send;

    /// A game action (e.g., placing a mark on a cell)
    type Action: Clone + Copy + Send + Eq + Hash + Debug;

    /// Returns the initial game state
    fn initial_state(&self) -> Self::State;

    /// Returns all legal actions from the given state; empty iff the game has ended
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Applies an action, returning a new state.
    ///
    /// # Errors
    /// Returns `GameError::IllegalAction` if `action` is not legal in `state`.
    fn next_state(&self, state: &Self::State, action: Self::Action) -> Result<Self::State>;

    /// Returns true if the game has ended (won or drawn)
    fn is_ended(&self, state: &Self::State) -> bool;

    /// Returns the final score of every player.
    ///
    /// A positive score means that player won.
    ///
    /// # Errors
    /// Returns `GameError::NotTerminal` if the game has not ended.
    fn points_values(&self, state: &Self::State) -> Result<Scores>;

    /// Returns the player to move in `state`
    fn current_player(&self, state: &Self::State) -> Player;
}

/// Actions that land on a cell of a 3x3 grid.
///
/// Used by rollout heuristics that prefer particular cells. For nested
/// boards this is the cell inside the board being played.
pub trait BoardCell {
    /// `(row, col)`, each in `0..3`
    fn cell(&self) -> (u8, u8);
}
