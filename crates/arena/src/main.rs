//! Matches between UCT bots, and single searches for inspection.
//!
//! `match` plays a series of games between two bots in parallel, swapping
//! colours every other game, and reports the score. `think` runs one search
//! from the opening position and prints the root statistics.

mod bots;

use anyhow::{Context, Result};
use bots::{Bot, BotKind};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uct_core::{BoardCell, Game, Player};
use uct_mcts::{
    games::{TicTacToe, UltimateTicTacToe},
    search_root_parallel, Budget, HeuristicRollout, Mcts, SearchReport, UniformRollout,
};

/// UCT arena: pit search bots against each other.
#[derive(Parser)]
#[command(name = "uct-arena")]
#[command(about = "Play UCT bots against each other and inspect their searches")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a series of games between two bots.
    Match {
        /// Bot playing Red in even-numbered games.
        #[arg(long, value_enum, default_value = "vanilla")]
        red: BotKind,

        /// Bot playing Blue in even-numbered games.
        #[arg(long, value_enum, default_value = "modified")]
        blue: BotKind,

        /// Number of games to play.
        #[arg(short, long, default_value = "10")]
        games: usize,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Search the opening position once and print the root statistics.
    Think {
        /// Bot whose search settings are used.
        #[arg(long, value_enum, default_value = "vanilla")]
        bot: BotKind,

        /// Number of independent trees searched in parallel.
        #[arg(short, long, default_value = "1")]
        workers: usize,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Game to play.
    #[arg(long, value_enum, default_value = "ultimate")]
    game: GameKind,

    /// Fixed number of iterations per decision (overrides the bot preset).
    #[arg(short, long, conflicts_with = "millis")]
    iterations: Option<usize>,

    /// Milliseconds per decision (overrides the bot preset).
    #[arg(short, long)]
    millis: Option<u64>,

    /// Random seed for reproducibility.
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

impl CommonArgs {
    fn budget(&self) -> Option<Budget> {
        match (self.iterations, self.millis) {
            (Some(n), _) => Some(Budget::Iterations(n)),
            (None, Some(ms)) => Some(Budget::Time(Duration::from_millis(ms))),
            (None, None) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
enum GameKind {
    Ultimate,
    Tictactoe,
}

/// Outcome of a single game.
#[derive(Serialize, Debug)]
struct GameRecord {
    index: usize,
    seed: u64,
    red: BotKind,
    blue: BotKind,
    winner: Option<Player>,
    moves: usize,
}

impl GameRecord {
    /// Bot that won, if any.
    fn winning_bot(&self) -> Option<BotKind> {
        self.winner.map(|p| match p {
            Player::Red => self.red,
            Player::Blue => self.blue,
        })
    }
}

/// Score of a whole match.
///
/// `first` is the bot given as `--red`, `second` the bot given as `--blue`.
#[derive(Serialize, Debug)]
struct MatchSummary {
    game: GameKind,
    first: BotKind,
    second: BotKind,
    first_wins: usize,
    second_wins: usize,
    red_wins: usize,
    blue_wins: usize,
    draws: usize,
    elapsed_ms: u64,
    records: Vec<GameRecord>,
}

impl MatchSummary {
    fn new(
        game: GameKind,
        first: BotKind,
        second: BotKind,
        records: Vec<GameRecord>,
        elapsed: Duration,
    ) -> Self {
        let mut summary = Self {
            game,
            first,
            second,
            first_wins: 0,
            second_wins: 0,
            red_wins: 0,
            blue_wins: 0,
            draws: 0,
            elapsed_ms: elapsed.as_millis() as u64,
            records: Vec::new(),
        };

        for record in &records {
            match record.winner {
                Some(Player::Red) => summary.red_wins += 1,
                Some(Player::Blue) => summary.blue_wins += 1,
                None => summary.draws += 1,
            }
            // Game i seats `first` as Red when i is even
            let first_seat = if record.index % 2 == 0 {
                Player::Red
            } else {
                Player::Blue
            };
            match record.winner {
                Some(p) if p == first_seat => summary.first_wins += 1,
                Some(_) => summary.second_wins += 1,
                None => {}
            }
        }

        summary.records = records;
        summary
    }

    fn print(&self) {
        let total = self.records.len().max(1) as f64;
        let pct = |n: usize| n as f64 / total * 100.0;

        let row = |label: &str, n: usize| println!("{:<24} {} ({:.1}%)", label, n, pct(n));
        let games = self.records.len();

        println!("\n================================================");
        println!("FINAL RESULTS ({:?}, {} games)", self.game, games);
        println!("================================================");
        row(&format!("{} (first) wins:", self.first), self.first_wins);
        row(&format!("{} (second) wins:", self.second), self.second_wins);
        row("Draws:", self.draws);
        println!("------------------------------------------------");
        println!("Red wins: {}, Blue wins: {}", self.red_wins, self.blue_wins);
        println!("Completed in {:.2}s", self.elapsed_ms as f64 / 1000.0);
    }
}

/// Play one game between `red` and `blue` from the initial position.
fn play_game<G>(
    game: &G,
    index: usize,
    red: BotKind,
    blue: BotKind,
    budget: Option<Budget>,
    seed: u64,
) -> Result<GameRecord>
where
    G: Game,
    G::Action: BoardCell,
{
    let mut red_bot = Bot::new(red, budget, seed);
    let mut blue_bot = Bot::new(blue, budget, seed.wrapping_add(1));

    let mut state = game.initial_state();
    let mut moves = 0;

    while !game.is_ended(&state) {
        let player = game.current_player(&state);
        let bot = match player {
            Player::Red => &mut red_bot,
            Player::Blue => &mut blue_bot,
        };

        let kind = bot.kind();

        let action = bot
            .choose(game, &state)
            .with_context(|| format!("game {index}: {kind} bot failed at move {moves}"))?;
        state = game
            .next_state(&state, action)
            .with_context(|| format!("game {index}: {kind} bot chose {action:?}"))?;
        moves += 1;
    }

    let winner = game
        .points_values(&state)
        .with_context(|| format!("game {}: no score for the final position", index))?
        .winner();

    debug!(index, seed, %red, %blue, ?winner, moves, "Game finished");

    Ok(GameRecord {
        index,
        seed,
        red,
        blue,
        winner,
        moves,
    })
}

/// Play `games` games in parallel, swapping colours every other game.
fn play_match<G>(
    game: &G,
    first: BotKind,
    second: BotKind,
    games: usize,
    common: &CommonArgs,
) -> Result<MatchSummary>
where
    G: Game,
    G::Action: BoardCell,
{
    let budget = common.budget();
    let start = Instant::now();

    let records: Vec<GameRecord> = (0..games)
        .into_par_iter()
        .map(|i| {
            let game_seed = common.seed.wrapping_add(i as u64 * 1000);
            let (red, blue) = if i % 2 == 0 {
                (first, second)
            } else {
                (second, first)
            };
            play_game(game, i, red, blue, budget, game_seed)
        })
        .collect::<Result<_>>()?;

    for record in &records {
        info!(
            game = record.index,
            red = %record.red,
            blue = %record.blue,
            winner = ?record.winning_bot(),
            moves = record.moves,
            "Result"
        );
    }

    let elapsed = start.elapsed();
    Ok(MatchSummary::new(common.game, first, second, records, elapsed))
}

/// Run the match command.
fn cmd_match(red: BotKind, blue: BotKind, games: usize, common: CommonArgs) -> Result<()> {
    info!(game = ?common.game, %red, %blue, games, seed = common.seed, "Starting match");

    let summary = match common.game {
        GameKind::Ultimate => play_match(&UltimateTicTacToe, red, blue, games, &common)?,
        GameKind::Tictactoe => play_match(&TicTacToe, red, blue, games, &common)?,
    };

    if common.json {
        let json =
            serde_json::to_string_pretty(&summary).context("Failed to serialize match summary")?;
        println!("{}", json);
    } else {
        summary.print();
    }

    Ok(())
}

/// Search the initial position of `game` once.
fn think<G>(
    game: &G,
    bot: BotKind,
    workers: usize,
    common: &CommonArgs,
) -> Result<SearchReport<G::Action>>
where
    G: Game,
    G::Action: BoardCell,
    G::State: Sync,
{
    let config = bot.config(common.budget());
    let state = game.initial_state();

    let rng = ChaCha8Rng::seed_from_u64(common.seed);
    let heuristic = HeuristicRollout::default();

    let report = match (bot, workers) {
        (BotKind::Random, _) => anyhow::bail!("the random bot does not search"),
        (BotKind::Vanilla, 1) => Mcts::new(config, UniformRollout, rng).search(game, &state)?,
        (BotKind::Modified, 1) => Mcts::new(config, heuristic, rng).search(game, &state)?,
        (BotKind::Vanilla, n) => {
            search_root_parallel(game, &state, &config, &UniformRollout, common.seed, n)?
        }
        (BotKind::Modified, n) => {
            search_root_parallel(game, &state, &config, &heuristic, common.seed, n)?
        }
    };

    Ok(report)
}

fn print_report<A: Display>(report: &SearchReport<A>) {
    println!("Player to move: {}", report.player);
    println!(
        "Iterations: {}, tree size: {}, elapsed: {:.2}s",
        report.iterations,
        report.tree_size,
        report.elapsed.as_secs_f64()
    );
    println!("------------------------------------------------");
    for child in &report.children {
        println!(
            "{:<24} visits: {:>7}  win rate: {:.3}",
            child.action.to_string(),
            child.visits,
            child.win_rate().unwrap_or(0.0)
        );
    }
    println!("------------------------------------------------");
    println!("Best action: {}", report.best_action);
}

/// Run the think command.
fn cmd_think(bot: BotKind, workers: usize, common: CommonArgs) -> Result<()> {
    info!(game = ?common.game, %bot, workers, seed = common.seed, "Thinking");

    let json = common.json;
    match common.game {
        GameKind::Ultimate => emit(&think(&UltimateTicTacToe, bot, workers, &common)?, json),
        GameKind::Tictactoe => emit(&think(&TicTacToe, bot, workers, &common)?, json),
    }
}

fn emit<A: Display + Serialize>(report: &SearchReport<A>, json: bool) -> Result<()> {
    if json {
        let json =
            serde_json::to_string_pretty(report).context("Failed to serialize search report")?;
        println!("{}", json);
    } else {
        print_report(report);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Match {
            red,
            blue,
            games,
            common,
        } => cmd_match(red, blue, games, common),

        Commands::Think {
            bot,
            workers,
            common,
        } => cmd_think(bot, workers, common),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common(game: GameKind, iterations: usize) -> CommonArgs {
        CommonArgs {
            game,
            iterations: Some(iterations),
            millis: None,
            seed: 42,
            json: false,
        }
    }

    #[test]
    fn test_budget_override() {
        let mut args = common(GameKind::Tictactoe, 30);
        assert_eq!(args.budget(), Some(Budget::Iterations(30)));

        args.iterations = None;
        args.millis = Some(15);
        assert_eq!(args.budget(), Some(Budget::Time(Duration::from_millis(15))));

        args.millis = None;
        assert_eq!(args.budget(), None);
    }

    #[test]
    fn test_play_game_reaches_the_end() {
        let record = play_game(
            &TicTacToe,
            0,
            BotKind::Vanilla,
            BotKind::Random,
            Some(Budget::Iterations(50)),
            7,
        )
        .unwrap();

        assert!(record.moves >= 5 && record.moves <= 9);
        assert_eq!(record.red, BotKind::Vanilla);
    }

    #[test]
    fn test_match_swaps_colours() {
        let args = common(GameKind::Tictactoe, 20);
        let (first, second) = (BotKind::Vanilla, BotKind::Random);
        let summary = play_match(&TicTacToe, first, second, 4, &args).unwrap();

        assert_eq!(summary.records.len(), 4);
        for record in &summary.records {
            let expected = if record.index % 2 == 0 {
                (BotKind::Vanilla, BotKind::Random)
            } else {
                (BotKind::Random, BotKind::Vanilla)
            };
            assert_eq!((record.red, record.blue), expected);
        }
        assert_eq!(summary.red_wins + summary.blue_wins + summary.draws, 4);
        assert_eq!(summary.first_wins + summary.second_wins + summary.draws, 4);
    }

    #[test]
    fn test_match_is_reproducible() {
        let args = common(GameKind::Ultimate, 10);
        let (first, second) = (BotKind::Vanilla, BotKind::Modified);
        let run = || {
            play_match(&UltimateTicTacToe, first, second, 2, &args)
                .unwrap()
                .records
                .into_iter()
                .map(|r| (r.winner, r.moves))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_summary_counts() {
        let record = |index: usize, winner| {
            let (red, blue) = if index % 2 == 0 {
                (BotKind::Vanilla, BotKind::Random)
            } else {
                (BotKind::Random, BotKind::Vanilla)
            };
            GameRecord {
                index,
                seed: 0,
                red,
                blue,
                winner,
                moves: 9,
            }
        };
        let records = vec![
            record(0, Some(Player::Red)),
            record(1, Some(Player::Blue)),
            record(2, None),
            record(3, Some(Player::Red)),
        ];

        let summary = MatchSummary::new(
            GameKind::Tictactoe,
            BotKind::Vanilla,
            BotKind::Random,
            records,
            Duration::ZERO,
        );
        assert_eq!(summary.first_wins, 2);
        assert_eq!(summary.second_wins, 1);
        assert_eq!(summary.red_wins, 2);
        assert_eq!(summary.blue_wins, 1);
        assert_eq!(summary.draws, 1);
        assert_eq!(summary.records[3].winning_bot(), Some(BotKind::Random));
    }

    #[test]
    fn test_think_reports_every_opening_move() {
        let args = common(GameKind::Tictactoe, 100);
        let report = think(&TicTacToe, BotKind::Vanilla, 1, &args).unwrap();
        assert_eq!(report.children.len(), 9);
        assert_eq!(report.iterations, 100);

        let parallel = think(&TicTacToe, BotKind::Modified, 3, &args).unwrap();
        assert_eq!(parallel.iterations, 300);

        assert!(think(&TicTacToe, BotKind::Random, 1, &args).is_err());
    }
}
