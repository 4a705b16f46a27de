//! UCT Core - game abstraction for the search engine
//!
//! This crate provides the `Game` trait through which the search engine
//! talks to a game-rules engine, plus the small shared vocabulary both sides
//! use.
//!
//! # Types
//!
//! - [`Game`] - Trait for game implementations
//! - [`BoardCell`] - Positional convention for actions on a 3x3 grid
//! - [`Player`] - The two player identities
//! - [`Scores`] - Final score per player

mod error;
mod game;
mod types;

pub use error::{GameError, Result};
pub use game::{BoardCell, Game};
pub use types::{Player, Scores};
