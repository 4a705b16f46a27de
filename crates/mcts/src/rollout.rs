//! Rollout policies for the simulation step.
//!
//! The `RolloutPolicy` trait picks one action per step of a playout; the
//! free function [`rollout`] drives a playout to the end of the game.
//! Policies never see the search tree:
//! - `UniformRollout` picks uniformly among legal actions
//! - `HeuristicRollout` prefers corner and centre cells some of the time

use rand::seq::SliceRandom;
use rand::Rng;
use uct_core::{BoardCell, Game, GameError, Result};

/// Corners and centre of a 3x3 grid.
pub const PREMIUM_CELLS: [(u8, u8); 5] = [(0, 0), (0, 2), (2, 0), (2, 2), (1, 1)];

/// Chooses the next action of a playout.
pub trait RolloutPolicy<G: Game> {
    /// Pick one of `legal_actions` (never empty) for `state`.
    fn choose<R: Rng + ?Sized>(
        &self,
        game: &G,
        state: &G::State,
        legal_actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action;
}

/// Play from `state` until the game ends, returning the final state.
///
/// Depends only on its arguments: the same state, policy and RNG state
/// always produce the same final state.
///
/// # Errors
/// Propagates errors from the game. Returns `GameError::NoLegalMoves` if the
/// game reports a non-terminal state without legal actions.
pub fn rollout<G, P, R>(game: &G, state: &G::State, policy: &P, rng: &mut R) -> Result<G::State>
where
    G: Game,
    P: RolloutPolicy<G> + ?Sized,
    R: Rng + ?Sized,
{
    let mut current = state.clone();

    while !game.is_ended(&current) {
        let legal_actions = game.legal_actions(&current);
        if legal_actions.is_empty() {
            return Err(GameError::NoLegalMoves);
        }

        let action = policy.choose(game, &current, &legal_actions, rng);
        current = game.next_state(&current, action)?;
    }

    Ok(current)
}

/// Uniformly random playouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformRollout;

impl<G: Game> RolloutPolicy<G> for UniformRollout {
    fn choose<R: Rng + ?Sized>(
        &self,
        _game: &G,
        _state: &G::State,
        legal_actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action {
        legal_actions[rng.gen_range(0..legal_actions.len())]
    }
}

/// Playouts that favour the corners and centre of a 3x3 grid.
///
/// With probability `preference` the first legal action landing on a
/// [`PREMIUM_CELLS`] cell is played; otherwise, or if there is no such
/// action, a uniformly random legal action.
#[derive(Clone, Copy, Debug)]
pub struct HeuristicRollout {
    preference: f64,
}

impl HeuristicRollout {
    /// Probability of looking for a premium cell used by default.
    pub const DEFAULT_PREFERENCE: f64 = 0.4;

    /// Create a heuristic policy; `preference` is clamped to `[0, 1]` and
    /// NaN means no preference.
    pub fn new(preference: f64) -> Self {
        let preference = if preference.is_nan() {
            0.0
        } else {
            preference.clamp(0.0, 1.0)
        };
        Self { preference }
    }

    /// Probability of looking for a premium cell.
    pub fn preference(&self) -> f64 {
        self.preference
    }
}

impl Default for HeuristicRollout {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PREFERENCE)
    }
}

impl<G> RolloutPolicy<G> for HeuristicRollout
where
    G: Game,
    G::Action: BoardCell,
{
    fn choose<R: Rng + ?Sized>(
        &self,
        _game: &G,
        _state: &G::State,
        legal_actions: &[G::Action],
        rng: &mut R,
    ) -> G::Action {
        if rng.gen_bool(self.preference) {
            if let Some(action) = legal_actions
                .iter()
                .find(|a| PREMIUM_CELLS.contains(&a.cell()))
            {
                return *action;
            }
        }

        *legal_actions
            .choose(rng)
            .expect("BUG: rollout policy called without legal actions")
    }
}
