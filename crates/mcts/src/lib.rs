//! Monte Carlo Tree Search with UCT selection.
//!
//! This crate provides a generic MCTS implementation that can be used with
//! any game implementing the `uct_core::Game` trait.
//!
//! # Features
//!
//! - **Generic**: Works with any `Game` implementation
//! - **UCT Selection**: Unvisited children first, then win rate plus an
//!   exploration bonus
//! - **Pluggable Rollouts**: Uniform random playouts, or a heuristic that
//!   prefers corner and centre cells
//! - **Budgets**: Fixed iteration counts or wall-clock deadlines
//! - **Root Parallelism**: Independent trees on a rayon pool, merged at the root
//!
//! # Example
//!
//! ```
//! use uct_mcts::{games::TicTacToe, Mcts, SearchConfig, UniformRollout};
//! use uct_core::Game;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let game = TicTacToe;
//! let state = game.initial_state();
//!
//! let config = SearchConfig::with_iterations(500);
//! let rng = ChaCha8Rng::seed_from_u64(42);
//! let mut mcts = Mcts::new(config, UniformRollout, rng);
//!
//! let report = mcts.search(&game, &state).expect("non-terminal state");
//! println!("Best action: {}", report.best_action);
//! println!("Iterations: {}", report.iterations);
//! ```

pub mod config;
pub mod games;
pub mod node;
pub mod parallel;
pub mod rollout;
pub mod search;
pub mod tree;
mod uct;

pub use config::{Budget, ExpansionOrder, SearchConfig};
pub use parallel::search_root_parallel;
pub use rollout::{rollout, HeuristicRollout, RolloutPolicy, UniformRollout};
pub use search::{ChildStats, Mcts, SearchError, SearchReport};
pub use uct::uct_score;
