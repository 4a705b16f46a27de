use thiserror::Error;

/// Errors reported by a game-rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Illegal action: {0}")]
    IllegalAction(String),

    #[error("Game is not terminal")]
    NotTerminal,

    #[error("No legal moves available")]
    NoLegalMoves,
}

/// Convenience Result type for game operations
pub type Result<T> = std::result::Result<T, GameError>;
