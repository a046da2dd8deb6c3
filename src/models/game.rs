use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use super::{UnknownVariant, Word};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Win,
    Loss,
}

impl SessionStatus {
    pub fn is_concluded(self) -> bool {
        !matches!(self, SessionStatus::InProgress)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Win => "win",
            SessionStatus::Loss => "loss",
        }
    }
}

impl TryFrom<String> for SessionStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "in_progress" => Ok(SessionStatus::InProgress),
            "win" => Ok(SessionStatus::Win),
            "loss" => Ok(SessionStatus::Loss),
            _ => Err(UnknownVariant {
                kind: "session status",
                value,
            }),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterColor {
    /// Right letter, right position
    Green,
    /// Letter present elsewhere in the target
    Orange,
    /// Letter absent, or all its occurrences already credited
    Grey,
}

/// Feedback for one letter, serialized compactly as `{"l": "E", "c": "orange"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LetterFeedback {
    #[serde(rename = "l")]
    pub letter: char,
    #[serde(rename = "c")]
    pub color: LetterColor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    /// 1-based position within the owning session
    pub sequence_number: u32,
    pub word: Word,
    pub feedback: Vec<LetterFeedback>,
}

/// One played round. Owns its guesses; never deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    pub id: Uuid,
    pub owner_id: i64,
    pub target_word: Word,
    pub status: SessionStatus,
    pub played_date: NaiveDate,
    pub guesses: Vec<Guess>,
}

impl GameSession {
    pub fn new(owner_id: i64, target_word: Word, played_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            target_word,
            status: SessionStatus::InProgress,
            played_date,
            guesses: Vec::new(),
        }
    }
}

// Database rows

#[derive(Debug, Clone, FromRow)]
pub struct GameRow {
    pub game_id: Uuid,
    pub user_id: i64,
    pub target_word: String,
    pub date_played: NaiveDate,
    #[sqlx(try_from = "String")]
    pub status: SessionStatus,
}

#[derive(Debug, Clone, FromRow)]
pub struct GuessRow {
    pub id: i32,
    pub game_id: Uuid,
    pub guess_word: String,
    pub guess_number: i32,
    pub feedback: serde_json::Value,
}
