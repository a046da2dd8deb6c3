pub mod game;
pub mod report;
pub mod user;
pub mod word;

pub use game::{
    // Domain types
    GameSession, Guess, LetterColor, LetterFeedback, SessionStatus,
    // Database rows
    GameRow, GuessRow,
};
pub use report::{DailyReport, PlayerTotals, UserDayStats};
pub use user::{Role, User};
pub use word::{Word, WordError};

/// A stored string that matches no enum variant
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
