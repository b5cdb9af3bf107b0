//! Game error types.

use thiserror::Error;

/// Game operation errors
#[derive(Debug, Error)]
pub enum GameError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Caller's external subject is unknown
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Game does not exist or is soft-deleted
    #[error("Game {0} not found")]
    GameNotFound(i64),

    /// Game card does not exist, is soft-deleted, or does not match the
    /// acting player in the required state
    #[error("Game card {0} not found")]
    CardNotFound(i64),

    /// Caller is not a participant of the game
    #[error("Not a participant of game {0}")]
    NotParticipant(i64),

    /// Caller lacks the required relationship to the card
    #[error("Game card {0} is not yours to act on")]
    NotYourCard(i64),

    /// Skip quota exhausted
    #[error("No skips left")]
    NoSkipsLeft,

    /// Operation attempted from a state that does not permit it
    #[error("Invalid card state: expected a card in {expected} state")]
    InvalidState { expected: &'static str },
}

impl GameError {
    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database errors are sanitized so SQL detail never reaches a caller.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
