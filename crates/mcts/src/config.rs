//! MCTS configuration parameters.
//!
//! These parameters control the behavior of the Monte Carlo Tree Search algorithm.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default UCT exploration constant.
pub const DEFAULT_EXPLORATION: f64 = 2.0;

/// How much work a single search may do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    /// Run exactly this many iterations (at least one).
    Iterations(usize),

    /// Keep iterating until this much wall-clock time has passed.
    /// At least one iteration always runs.
    Time(Duration),
}

impl Budget {
    /// Start tracking this budget from now.
    pub fn start(self) -> BudgetClock {
        self.start_at(Instant::now())
    }

    /// Track this budget from `started`, which may lie in the past.
    ///
    /// Searches that share one wall-clock deadline all start from the same
    /// instant.
    pub fn start_at(self, started: Instant) -> BudgetClock {
        BudgetClock {
            budget: self,
            started,
            completed: 0,
        }
    }
}

/// Running state of a [`Budget`] during one search.
#[derive(Clone, Debug)]
pub struct BudgetClock {
    budget: Budget,
    started: Instant,
    completed: usize,
}

impl BudgetClock {
    /// True while another iteration may start.
    ///
    /// The first call always returns true, so a search never ends without
    /// having completed a full iteration, even if the deadline has already
    /// passed.
    pub fn has_remaining(&self) -> bool {
        if self.completed == 0 {
            return true;
        }
        match self.budget {
            Budget::Iterations(n) => self.completed < n,
            Budget::Time(limit) => self.started.elapsed() < limit,
        }
    }

    /// Mark one iteration as finished.
    pub fn tick(&mut self) {
        self.completed += 1;
    }

    /// Iterations completed so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Time since the clock's start instant.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Which untried action an expansion picks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpansionOrder {
    /// The first remaining action, in the order the game listed them.
    InOrder,

    /// A uniformly random remaining action, drawn from the search RNG.
    Random,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Iteration or wall-clock limit of one search.
    pub budget: Budget,

    /// UCT exploration constant `C` in
    /// `wins / visits + C * sqrt(ln(parent_visits) / visits)`.
    pub exploration: f64,

    /// Order in which untried actions are expanded.
    pub expansion: ExpansionOrder,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            budget: Budget::Iterations(1000),
            exploration: DEFAULT_EXPLORATION,
            expansion: ExpansionOrder::InOrder,
        }
    }
}

impl SearchConfig {
    /// Create a config that runs a fixed number of iterations.
    pub fn with_iterations(iterations: usize) -> Self {
        Self {
            budget: Budget::Iterations(iterations),
            ..Default::default()
        }
    }

    /// Create a config bounded by wall-clock time.
    pub fn with_time_limit(limit: Duration) -> Self {
        Self {
            budget: Budget::Time(limit),
            ..Default::default()
        }
    }

    /// 1000 iterations, expanding actions in order. Pairs with uniform rollouts.
    pub fn vanilla() -> Self {
        Self::default()
    }

    /// 200 ms per decision, expanding actions at random. Pairs with the
    /// cell-preferring heuristic rollout.
    pub fn modified() -> Self {
        Self {
            budget: Budget::Time(Duration::from_millis(200)),
            exploration: DEFAULT_EXPLORATION,
            expansion: ExpansionOrder::Random,
        }
    }

    /// Replace the budget, keeping everything else.
    pub fn budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }
}
