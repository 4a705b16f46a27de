//! Monte Carlo Tree Search implementation.
//!
//! Each iteration runs the four classic phases:
//! 1. Selection: descend through fully expanded nodes by UCT
//! 2. Expansion: turn one untried action into a new child
//! 3. Simulation: play out to the end of the game with a rollout policy
//! 4. Backpropagation: record the outcome from the new node up to the root
//!
//! Outcomes are always scored for the player to move at the root, and the
//! same win/loss flag is recorded at every level of the path. The final
//! action is the root child with the best win rate.

use crate::{
    config::{ExpansionOrder, SearchConfig},
    node::NodeId,
    rollout::{rollout, RolloutPolicy},
    tree::Tree,
    uct,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};
use uct_core::{Game, GameError, Player};

/// Errors that can occur during a search.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The search was started from a state with no legal actions.
    #[error("No legal moves available")]
    NoLegalMoves,

    /// The game rejected a transition or a scoring request.
    #[error("Game error: {0}")]
    Game(#[from] GameError),
}

/// Statistics of one root action after a search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildStats<A> {
    pub action: A,
    pub visits: u32,
    pub wins: u32,
}

impl<A> ChildStats<A> {
    /// Empirical win rate, or `None` if the action was never visited.
    pub fn win_rate(&self) -> Option<f64> {
        if self.visits == 0 {
            None
        } else {
            Some(self.wins as f64 / self.visits as f64)
        }
    }
}

/// Result of an MCTS search.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchReport<A> {
    /// Root action with the highest win rate.
    pub best_action: A,

    /// Player the statistics are counted for (the player to move at the root).
    pub player: Player,

    /// Statistics of every expanded root action, in expansion order.
    pub children: Vec<ChildStats<A>>,

    /// Number of completed iterations.
    pub iterations: usize,

    /// Number of nodes in the tree, root included.
    pub tree_size: usize,

    /// Wall-clock time spent searching.
    pub elapsed: Duration,
}

impl<A: Copy + Eq> SearchReport<A> {
    /// Statistics of a single root action, if it was expanded.
    pub fn child(&self, action: A) -> Option<&ChildStats<A>> {
        self.children.iter().find(|c| c.action == action)
    }
}

/// Visited root action with the highest win rate.
///
/// Unvisited actions are skipped and ties keep the earliest entry.
pub fn best_action<A: Copy>(children: &[ChildStats<A>]) -> Option<A> {
    let mut best = None;
    let mut best_rate = f64::NEG_INFINITY;

    for child in children {
        if let Some(rate) = child.win_rate() {
            if best.is_none() || rate > best_rate {
                best_rate = rate;
                best = Some(child.action);
            }
        }
    }

    best
}

/// Monte Carlo Tree Search with UCT selection.
///
/// Generic over:
/// - `G`: The game being played
/// - `P`: The rollout policy used for simulations
/// - `R`: The random number generator
pub struct Mcts<G: Game, P: RolloutPolicy<G>, R: Rng> {
    config: SearchConfig,
    policy: P,
    rng: R,
    _game: PhantomData<G>,
}

impl<G, P, R> Mcts<G, P, R>
where
    G: Game,
    G::Action: Clone + Copy + Eq + Hash,
    P: RolloutPolicy<G>,
    R: Rng,
{
    /// Create a new MCTS instance.
    pub fn new(config: SearchConfig, policy: P, rng: R) -> Self {
        Self {
            config,
            policy,
            rng,
            _game: PhantomData,
        }
    }

    /// Pick the best action for the player to move in `state`.
    ///
    /// # Errors
    /// `SearchError::NoLegalMoves` if `state` has no legal actions, or any
    /// error reported by the game during the search.
    pub fn decide(&mut self, game: &G, state: &G::State) -> Result<G::Action, SearchError> {
        Ok(self.search(game, state)?.best_action)
    }

    /// Run a full search from `state`, returning the root statistics.
    pub fn search(
        &mut self,
        game: &G,
        state: &G::State,
    ) -> Result<SearchReport<G::Action>, SearchError> {
        self.search_with_tree(game, state).map(|(report, _)| report)
    }

    /// Run a full search and also return the tree it built.
    pub fn search_with_tree(
        &mut self,
        game: &G,
        state: &G::State,
    ) -> Result<(SearchReport<G::Action>, Tree<G::Action>), SearchError> {
        self.search_from(game, state, Instant::now())
    }

    /// Run a full search whose budget is counted from `started`.
    ///
    /// A time budget then ends at `started + limit` however late this search
    /// begins, though at least one iteration still runs. The reported
    /// `elapsed` is also measured from `started`.
    pub fn search_from(
        &mut self,
        game: &G,
        state: &G::State,
        started: Instant,
    ) -> Result<(SearchReport<G::Action>, Tree<G::Action>), SearchError> {
        let player = game.current_player(state);
        let mut tree = self.new_tree(game, state)?;
        let mut clock = self.config.budget.start_at(started);

        while clock.has_remaining() {
            self.iterate(game, &mut tree, state, player)?;
            clock.tick();
        }

        let children: Vec<ChildStats<G::Action>> = tree
            .root()
            .children
            .iter()
            .map(|&(action, id)| {
                let stats = &tree.get(id).stats;
                ChildStats {
                    action,
                    visits: stats.visits,
                    wins: stats.wins,
                }
            })
            .collect();

        // At least one iteration ran from a non-terminal root, so at least
        // one root child has a visit.
        let best = best_action(&children).ok_or(SearchError::NoLegalMoves)?;

        let report = SearchReport {
            best_action: best,
            player,
            children,
            iterations: clock.completed(),
            tree_size: tree.len(),
            elapsed: clock.elapsed(),
        };

        debug!(
            iterations = report.iterations,
            tree_size = report.tree_size,
            elapsed_ms = report.elapsed.as_millis() as u64,
            best_action = ?report.best_action,
            win_rate = report.child(best).and_then(|c| c.win_rate()).unwrap_or(0.0),
            "MCTS search complete"
        );

        Ok((report, tree))
    }

    /// Build the root of a fresh tree for `state`.
    ///
    /// # Errors
    /// `SearchError::NoLegalMoves` if `state` has no legal actions.
    pub fn new_tree(&self, game: &G, state: &G::State) -> Result<Tree<G::Action>, SearchError> {
        let legal_actions = game.legal_actions(state);
        if legal_actions.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }
        Ok(Tree::new(legal_actions))
    }

    /// Run one iteration: select -> expand -> simulate -> backpropagate.
    ///
    /// `root_state` must be the state the tree's root was built from and
    /// `player` the player whose wins are counted. Returns the node that
    /// received the rollout.
    pub fn iterate(
        &mut self,
        game: &G,
        tree: &mut Tree<G::Action>,
        root_state: &G::State,
        player: Player,
    ) -> Result<NodeId, SearchError> {
        let (leaf, leaf_state) = self.select(game, tree, root_state)?;

        let final_state = rollout(game, &leaf_state, &self.policy, &mut self.rng)?;
        let won = game.points_values(&final_state)?.is_win(player);

        let path_len = tree.backpropagate(leaf, won);

        trace!(
            leaf = leaf.index(),
            path_len = path_len,
            won = won,
            "MCTS iteration complete"
        );

        Ok(leaf)
    }

    /// Descend from the root by UCT until a node with untried actions (which
    /// is then expanded) or a node without children.
    ///
    /// Returns the reached node and its state, replayed from `root_state`.
    fn select(
        &mut self,
        game: &G,
        tree: &mut Tree<G::Action>,
        root_state: &G::State,
    ) -> Result<(NodeId, G::State), SearchError> {
        let mut current_id = NodeId::ROOT;
        let mut current_state = root_state.clone();

        loop {
            let node = tree.get(current_id);
            if node.is_terminal() {
                return Ok((current_id, current_state));
            }
            if !node.is_fully_expanded() {
                return self.expand(game, tree, current_id, &current_state);
            }

            let (action, child_id) = uct::select_child(tree, current_id, self.config.exploration)
                .expect("BUG: fully expanded non-terminal node has no children");
            current_state = game.next_state(&current_state, action)?;
            current_id = child_id;
        }
    }

    /// Add a child for one untried action of `node_id`.
    fn expand(
        &mut self,
        game: &G,
        tree: &mut Tree<G::Action>,
        node_id: NodeId,
        state: &G::State,
    ) -> Result<(NodeId, G::State), SearchError> {
        let untried = &tree.get(node_id).untried;
        let index = match self.config.expansion {
            ExpansionOrder::InOrder => 0,
            ExpansionOrder::Random => self.rng.gen_range(0..untried.len()),
        };
        let action = untried[index];

        let next_state = game.next_state(state, action)?;
        let legal_actions = game.legal_actions(&next_state);

        tree.get_mut(node_id).untried.remove(index);
        let child_id = tree.add_child(node_id, action, legal_actions);

        Ok((child_id, next_state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Budget;
    use crate::rollout::{HeuristicRollout, UniformRollout};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use uct_core::{Result as GameResult, Scores};

    // Simple test game: race to 5
    // Players take turns adding 1 or 2. Whoever reaches exactly 5 wins.
    // Reaching 2 leaves the opponent in a lost position.
    #[derive(Clone)]
    struct RaceToFive;

    #[derive(Clone, PartialEq, Eq, Debug)]
    struct RaceState {
        count: u8,
        current_player: Player,
    }

    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    struct RaceAction(u8); // 1 or 2

    impl Game for RaceToFive {
        type State = RaceState;
        type Action = RaceAction;

        fn initial_state(&self) -> Self::State {
            RaceState {
                count: 0,
                current_player: Player::Red,
            }
        }

        fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action> {
            if state.count >= 5 {
                Vec::new()
            } else {
                let mut actions = vec![RaceAction(1)];
                if state.count + 2 <= 5 {
                    actions.push(RaceAction(2));
                }
                actions
            }
        }

        fn next_state(&self, state: &Self::State, action: Self::Action) -> GameResult<Self::State> {
            if !self.legal_actions(state).contains(&action) {
                return Err(GameError::IllegalAction(format!("{:?}", action)));
            }
            Ok(RaceState {
                count: state.count + action.0,
                current_player: state.current_player.opposite(),
            })
        }

        fn is_ended(&self, state: &Self::State) -> bool {
            state.count >= 5
        }

        fn points_values(&self, state: &Self::State) -> GameResult<Scores> {
            if state.count >= 5 {
                // Player who just moved reached 5 and wins
                Ok(Scores::win(state.current_player.opposite()))
            } else {
                Err(GameError::NotTerminal)
            }
        }

        fn current_player(&self, state: &Self::State) -> Player {
            state.current_player
        }
    }

    fn mcts(iterations: usize, seed: u64) -> Mcts<RaceToFive, UniformRollout, ChaCha8Rng> {
        Mcts::new(
            SearchConfig::with_iterations(iterations),
            UniformRollout,
            ChaCha8Rng::seed_from_u64(seed),
        )
    }

    #[test]
    fn test_mcts_basic() {
        let game = RaceToFive;
        let state = game.initial_state();

        let report = mcts(100, 42).search(&game, &state).unwrap();

        assert!([RaceAction(1), RaceAction(2)].contains(&report.best_action));
        assert_eq!(report.iterations, 100);
        assert_eq!(report.player, Player::Red);
        assert_eq!(report.children.len(), 2);

        // Every iteration passes through exactly one root child
        let total_visits: u32 = report.children.iter().map(|c| c.visits).sum();
        assert_eq!(total_visits, 100);
    }

    #[test]
    fn test_mcts_finds_winning_move() {
        let game = RaceToFive;
        // At 3, adding 2 wins immediately; adding 1 hands the win to the opponent
        let state = RaceState {
            count: 3,
            current_player: Player::Blue,
        };

        let action = mcts(50, 7).decide(&game, &state).unwrap();
        assert_eq!(action, RaceAction(2));
    }

    #[test]
    fn test_mcts_deterministic() {
        let game = RaceToFive;
        let state = game.initial_state();

        let result1 = mcts(50, 12345).search(&game, &state).unwrap();
        let result2 = mcts(50, 12345).search(&game, &state).unwrap();

        assert_eq!(result1.best_action, result2.best_action);
        assert_eq!(result1.children, result2.children);
    }

    #[test]
    fn test_terminal_state_is_rejected() {
        let game = RaceToFive;
        let state = RaceState {
            count: 5,
            current_player: Player::Red,
        };

        let result = mcts(10, 1).decide(&game, &state);
        assert!(matches!(result, Err(SearchError::NoLegalMoves)));
    }

    #[test]
    fn test_zero_iterations_runs_one() {
        let game = RaceToFive;
        let report = mcts(0, 1).search(&game, &game.initial_state()).unwrap();
        assert_eq!(report.iterations, 1);
        assert_eq!(report.best_action, RaceAction(1)); // first expanded in order
    }

    #[test]
    fn test_time_budget_completes() {
        let game = RaceToFive;
        let config = SearchConfig::with_time_limit(Duration::from_millis(5));
        let mut mcts = Mcts::new(config, UniformRollout, ChaCha8Rng::seed_from_u64(3));

        let report = mcts.search(&game, &game.initial_state()).unwrap();
        assert!(report.iterations >= 1);
    }

    #[test]
    fn test_in_order_expansion() {
        let game = RaceToFive;
        let state = game.initial_state();
        let mut mcts = mcts(1, 0);
        let mut tree = mcts.new_tree(&game, &state).unwrap();

        let first = mcts.iterate(&game, &mut tree, &state, Player::Red).unwrap();
        let second = mcts.iterate(&game, &mut tree, &state, Player::Red).unwrap();

        assert_eq!(tree.get(first).action, Some(RaceAction(1)));
        assert_eq!(tree.get(second).action, Some(RaceAction(2)));
        assert!(tree.root().untried.is_empty());
    }

    #[test]
    fn test_random_expansion_tries_every_root_action() {
        let game = RaceToFive;
        let state = game.initial_state();
        let config = SearchConfig::modified().budget(Budget::Iterations(2));
        let mut mcts = Mcts::new(config, UniformRollout, ChaCha8Rng::seed_from_u64(9));

        let report = mcts.search(&game, &state).unwrap();
        assert_eq!(report.children.len(), 2);
        assert!(report.children.iter().all(|c| c.visits == 1));
    }

    #[test]
    fn test_illegal_transition_surfaces() {
        // A game whose legal actions lie about what next_state accepts
        #[derive(Clone)]
        struct Broken;

        impl Game for Broken {
            type State = u8;
            type Action = u8;

            fn initial_state(&self) -> u8 {
                0
            }
            fn legal_actions(&self, _state: &u8) -> Vec<u8> {
                vec![1]
            }
            fn next_state(&self, _state: &u8, action: u8) -> GameResult<u8> {
                Err(GameError::IllegalAction(action.to_string()))
            }
            fn is_ended(&self, _state: &u8) -> bool {
                false
            }
            fn points_values(&self, _state: &u8) -> GameResult<Scores> {
                Err(GameError::NotTerminal)
            }
            fn current_player(&self, _state: &u8) -> Player {
                Player::Red
            }
        }

        let mut mcts = Mcts::new(
            SearchConfig::with_iterations(10),
            UniformRollout,
            ChaCha8Rng::seed_from_u64(0),
        );
        let result = mcts.decide(&Broken, &0);
        assert!(matches!(
            result,
            Err(SearchError::Game(GameError::IllegalAction(_)))
        ));
    }

    #[test]
    fn test_terminal_child_is_revisited_without_expansion() {
        let game = RaceToFive;
        // Blue's only move reaches 5 and wins
        let state = RaceState {
            count: 4,
            current_player: Player::Blue,
        };
        let (report, tree) = mcts(5, 2).search_with_tree(&game, &state).unwrap();

        assert_eq!(tree.len(), 2);
        let child = tree.root().child(RaceAction(1)).unwrap();
        assert!(tree.get(child).is_terminal());
        assert_eq!(tree.get(child).stats.visits, 5);
        assert_eq!(tree.get(child).stats.wins, 5);
        assert_eq!(report.best_action, RaceAction(1));
    }

    #[test]
    fn test_heuristic_policy_plugs_in() {
        use crate::games::TicTacToe;

        let game = TicTacToe;
        let state = game.play(&[0, 3, 1, 4]).unwrap();
        let mut mcts = Mcts::new(
            SearchConfig::with_iterations(200),
            HeuristicRollout::default(),
            ChaCha8Rng::seed_from_u64(4),
        );

        // Red completes the top row
        let action = mcts.decide(&game, &state).unwrap();
        assert_eq!(action.0, 2);
    }

    fn stats<A>(action: A, visits: u32, wins: u32) -> ChildStats<A> {
        ChildStats {
            action,
            visits,
            wins,
        }
    }

    #[test]
    fn test_best_action_skips_unvisited_and_keeps_first_tie() {
        let children = vec![stats('a', 0, 0), stats('b', 4, 2), stats('c', 2, 1)];
        assert_eq!(best_action(&children), Some('b'));

        let unvisited = vec![stats('a', 0, 0)];
        assert_eq!(best_action(&unvisited), None);
    }

    #[test]
    fn test_best_action_zero_win_rates() {
        let children = vec![stats(1, 3, 0), stats(2, 5, 0)];
        assert_eq!(best_action(&children), Some(1));
    }
}
