use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Activity summary for one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    pub date: NaiveDate,
    pub unique_players: i64,
    pub total_wins: i64,
}

/// One user's rounds on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserDayStats {
    pub date: NaiveDate,
    pub words_tried: i64,
    pub correct_guesses: i64,
}

/// Lifetime totals for a player, used by the all-users report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PlayerTotals {
    pub username: String,
    pub total_words_tried: i64,
    pub total_wins: i64,
}
