//! Move-choosing bots for arena matches.

use clap::ValueEnum;
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uct_core::{BoardCell, Game};
use uct_mcts::{Budget, HeuristicRollout, Mcts, SearchConfig, SearchError, UniformRollout};

/// The kinds of bot that can sit at the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotKind {
    /// Uniformly random legal moves.
    Random,
    /// UCT with in-order expansion and uniform rollouts.
    Vanilla,
    /// UCT with random expansion, a time budget and heuristic rollouts.
    Modified,
}

impl BotKind {
    /// Search configuration for this kind, with an optional budget override.
    ///
    /// Random bots never search; they get the default configuration.
    pub fn config(self, budget: Option<Budget>) -> SearchConfig {
        let config = match self {
            BotKind::Random => SearchConfig::default(),
            BotKind::Vanilla => SearchConfig::vanilla(),
            BotKind::Modified => SearchConfig::modified(),
        };
        match budget {
            Some(budget) => config.budget(budget),
            None => config,
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BotKind::Random => write!(f, "random"),
            BotKind::Vanilla => write!(f, "vanilla"),
            BotKind::Modified => write!(f, "modified"),
        }
    }
}

/// A bot with its own seeded random stream.
pub struct Bot {
    kind: BotKind,
    config: SearchConfig,
    rng: ChaCha8Rng,
}

impl Bot {
    pub fn new(kind: BotKind, budget: Option<Budget>, seed: u64) -> Self {
        Self {
            kind,
            config: kind.config(budget),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn kind(&self) -> BotKind {
        self.kind
    }

    /// Choose a move for the player to move in `state`.
    ///
    /// # Errors
    /// `SearchError::NoLegalMoves` if `state` has no legal actions, or any
    /// error the game reports during a search.
    pub fn choose<G>(&mut self, game: &G, state: &G::State) -> Result<G::Action, SearchError>
    where
        G: Game,
        G::Action: BoardCell,
    {
        match self.kind {
            BotKind::Random => game
                .legal_actions(state)
                .choose(&mut self.rng)
                .copied()
                .ok_or(SearchError::NoLegalMoves),
            BotKind::Vanilla => {
                let mut mcts = Mcts::new(self.config.clone(), UniformRollout, &mut self.rng);
                mcts.decide(game, state)
            }
            BotKind::Modified => {
                let policy = HeuristicRollout::default();
                let mut mcts = Mcts::new(self.config.clone(), policy, &mut self.rng);
                mcts.decide(game, state)
            }
        }
    }
}
