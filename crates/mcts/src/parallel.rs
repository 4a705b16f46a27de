//! Root-parallel search.
//!
//! Every worker grows its own tree from its own copy of the root state with
//! its own seeded RNG, so workers share nothing mutable. All workers count
//! their budget from the same start instant, so a wall-clock budget is one
//! shared deadline. Root statistics are summed per action once all workers
//! have finished, and the best action is chosen by win rate exactly as in a
//! single search.

use crate::{
    config::SearchConfig,
    rollout::RolloutPolicy,
    search::{best_action, ChildStats, Mcts, SearchError, SearchReport},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use uct_core::Game;

/// Search `state` with `workers` independent trees and merge their roots.
///
/// Worker `i` uses `ChaCha8Rng::seed_from_u64(seed + i)`, so the result is
/// reproducible for a fixed seed and an iteration budget. A wall-clock
/// budget is a single deadline shared by all workers: a worker scheduled
/// after it has passed still completes one iteration, then stops.
///
/// # Errors
/// The first error reported by any worker.
pub fn search_root_parallel<G, P>(
    game: &G,
    state: &G::State,
    config: &SearchConfig,
    policy: &P,
    seed: u64,
    workers: usize,
) -> Result<SearchReport<G::Action>, SearchError>
where
    G: Game,
    G::State: Sync,
    P: RolloutPolicy<G> + Clone + Send + Sync,
{
    let workers = workers.max(1);
    let started = Instant::now();

    let reports: Vec<SearchReport<G::Action>> = (0..workers)
        .into_par_iter()
        .map(|i| {
            let rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            let mut mcts = Mcts::new(config.clone(), policy.clone(), rng);
            mcts.search_from(game, state, started)
                .map(|(report, _)| report)
        })
        .collect::<Result<_, _>>()?;

    let report = merge_reports(reports)?;

    debug!(
        workers = workers,
        iterations = report.iterations,
        tree_size = report.tree_size,
        best_action = ?report.best_action,
        "Root-parallel search complete"
    );

    Ok(report)
}

/// Sum per-action root statistics of several searches of the same state.
fn merge_reports<A>(reports: Vec<SearchReport<A>>) -> Result<SearchReport<A>, SearchError>
where
    A: Copy + Eq + std::hash::Hash,
{
    let mut children: Vec<ChildStats<A>> = Vec::new();
    let mut index: HashMap<A, usize> = HashMap::new();
    let mut iterations = 0;
    let mut tree_size = 0;
    let mut elapsed = Duration::ZERO;
    let mut player = None;

    for report in reports {
        player.get_or_insert(report.player);
        iterations += report.iterations;
        tree_size += report.tree_size;
        elapsed = elapsed.max(report.elapsed);

        for child in report.children {
            match index.get(&child.action) {
                Some(&i) => {
                    children[i].visits += child.visits;
                    children[i].wins += child.wins;
                }
                None => {
                    index.insert(child.action, children.len());
                    children.push(child);
                }
            }
        }
    }

    let best = best_action(&children).ok_or(SearchError::NoLegalMoves)?;
    let player = player.ok_or(SearchError::NoLegalMoves)?;

    Ok(SearchReport {
        best_action: best,
        player,
        children,
        iterations,
        tree_size,
        elapsed,
    })
}
