use thiserror::Error;

use crate::db::RepositoryError;
use crate::models::{SessionStatus, WordError};

/// Every way a round operation can be rejected.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Guess must be a {expected}-letter word (letters only): {source}")]
    InvalidGuessFormat {
        expected: usize,
        #[source]
        source: WordError,
    },

    #[error("Game not found or access denied.")]
    NotFound,

    #[error("Game already concluded with a {status}.")]
    AlreadyConcluded { status: SessionStatus },

    #[error("You have reached your daily limit of {limit} words. Better luck tomorrow!")]
    DailyLimitReached { limit: usize },

    #[error("No words configured in the word pool.")]
    EmptyPool,

    #[error("Max guesses reached. Game Over.")]
    GuessLimitExceeded,

    /// Another guess for the same session was stored first
    #[error("Another guess for this game was submitted at the same time. Please retry.")]
    Conflict,

    #[error("Storage error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for GameError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => GameError::Conflict,
            other => GameError::Repository(other),
        }
    }
}

impl GameError {
    /// True for errors caused by server state rather than the request
    pub fn is_server_error(&self) -> bool {
        matches!(self, GameError::EmptyPool | GameError::Repository(_))
    }
}
