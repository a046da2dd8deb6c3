use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    DailyReport, GameRow, GameSession, Guess, GuessRow, LetterFeedback, PlayerTotals,
    SessionStatus, User, UserDayStats, Word,
};

#[cfg(test)]
pub mod memory;
pub mod queries;

pub async fn create_pool(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write
    #[error("conflicting write: {0}")]
    Conflict(String),

    /// Stored data that does not decode into a valid entity
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl RepositoryError {
    /// Turn unique violations into `Conflict`; pass everything else through
    fn from_write(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepositoryError::Conflict(what.to_string())
            }
            _ => RepositoryError::Database(err),
        }
    }
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Storage for users, rounds, guesses and the word pool.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn get_user(&self, user_id: i64) -> RepoResult<Option<User>>;

    /// Case-insensitive lookup
    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Create a player account; `Conflict` if the username is taken
    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User>;

    async fn count_sessions_by_user_and_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepoResult<usize>;

    async fn create_session(&self, session: &GameSession) -> RepoResult<()>;

    /// Load a session with its guesses in sequence order
    async fn get_session(&self, session_id: Uuid) -> RepoResult<Option<GameSession>>;

    /// Store `guess` and set the session status atomically.
    /// `Conflict` if that sequence number is already taken.
    async fn append_guess(
        &self,
        session_id: Uuid,
        guess: &Guess,
        status: SessionStatus,
    ) -> RepoResult<()>;

    async fn update_session_status(&self, session_id: Uuid, status: SessionStatus)
        -> RepoResult<()>;

    async fn list_word_pool(&self) -> RepoResult<Vec<Word>>;

    async fn count_words(&self) -> RepoResult<usize>;

    /// Word at a stable zero-based position in the pool
    async fn word_at(&self, index: usize) -> RepoResult<Option<Word>>;

    /// Add words, skipping duplicates; returns how many were new
    async fn insert_words(&self, words: &[Word]) -> RepoResult<usize>;

    async fn daily_report(&self, date: NaiveDate) -> RepoResult<DailyReport>;

    /// Per-day rounds for one user, newest first
    async fn user_daily_stats(&self, user_id: i64) -> RepoResult<Vec<UserDayStats>>;

    /// Totals for every player account, including ones with no rounds
    async fn all_player_stats(&self) -> RepoResult<Vec<PlayerTotals>>;
}

/// Postgres-backed repository
pub struct PgRepository {
    pool: PgPool,
    word_length: usize,
}

impl PgRepository {
    pub fn new(pool: PgPool, word_length: usize) -> Self {
        Self { pool, word_length }
    }

    fn parse_word(&self, raw: &str) -> RepoResult<Word> {
        Word::parse(raw, self.word_length)
            .map_err(|e| RepositoryError::Corrupt(format!("stored word {:?}: {}", raw, e)))
    }

    fn guess_from_row(&self, row: GuessRow) -> RepoResult<Guess> {
        let feedback: Vec<LetterFeedback> = serde_json::from_value(row.feedback).map_err(|e| {
            tracing::error!("Failed to deserialize feedback for game {}: {}", row.game_id, e);
            RepositoryError::Corrupt(format!("feedback of guess {}: {}", row.id, e))
        })?;
        let sequence_number = u32::try_from(row.guess_number).map_err(|_| {
            RepositoryError::Corrupt(format!("guess number {}", row.guess_number))
        })?;

        Ok(Guess {
            sequence_number,
            word: self.parse_word(&row.guess_word)?,
            feedback,
        })
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn get_user(&self, user_id: i64) -> RepoResult<Option<User>> {
        Ok(queries::get_user(&self.pool, user_id).await?)
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(queries::find_user_by_username(&self.pool, username).await?)
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        queries::create_user(&self.pool, username, password_hash)
            .await
            .map_err(|e| RepositoryError::from_write(e, "username already exists"))
    }

    async fn count_sessions_by_user_and_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepoResult<usize> {
        let count = queries::count_games_by_user_and_date(&self.pool, user_id, date).await?;
        Ok(count.max(0) as usize)
    }

    async fn create_session(&self, session: &GameSession) -> RepoResult<()> {
        queries::create_game(
            &self.pool,
            session.id,
            session.owner_id,
            session.target_word.as_str(),
            session.played_date,
        )
        .await
        .map_err(|e| RepositoryError::from_write(e, "game id already exists"))?;
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> RepoResult<Option<GameSession>> {
        let Some(GameRow {
            game_id,
            user_id,
            target_word,
            date_played,
            status,
            ..
        }) = queries::get_game(&self.pool, session_id).await?
        else {
            return Ok(None);
        };

        let guesses = queries::get_guesses(&self.pool, game_id)
            .await?
            .into_iter()
            .map(|row| self.guess_from_row(row))
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Some(GameSession {
            id: game_id,
            owner_id: user_id,
            target_word: self.parse_word(&target_word)?,
            status,
            played_date: date_played,
            guesses,
        }))
    }

    async fn append_guess(
        &self,
        session_id: Uuid,
        guess: &Guess,
        status: SessionStatus,
    ) -> RepoResult<()> {
        let feedback = serde_json::to_value(&guess.feedback)
            .map_err(|e| RepositoryError::Corrupt(format!("Failed to serialize feedback: {}", e)))?;

        queries::insert_guess_with_status(
            &self.pool,
            session_id,
            guess.word.as_str(),
            guess.sequence_number as i32,
            feedback,
            status,
        )
        .await
        .map_err(|e| {
            RepositoryError::from_write(
                e,
                &format!("guess {} already recorded", guess.sequence_number),
            )
        })
    }

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
    ) -> RepoResult<()> {
        Ok(queries::update_game_status(&self.pool, session_id, status).await?)
    }

    async fn list_word_pool(&self) -> RepoResult<Vec<Word>> {
        queries::list_words(&self.pool)
            .await?
            .iter()
            .map(|w| self.parse_word(w))
            .collect()
    }

    async fn count_words(&self) -> RepoResult<usize> {
        let count = queries::count_words(&self.pool).await?;
        Ok(count.max(0) as usize)
    }

    async fn word_at(&self, index: usize) -> RepoResult<Option<Word>> {
        queries::word_at_offset(&self.pool, index as i64)
            .await?
            .map(|w| self.parse_word(&w))
            .transpose()
    }

    async fn insert_words(&self, words: &[Word]) -> RepoResult<usize> {
        let raw: Vec<String> = words.iter().map(|w| w.as_str().to_string()).collect();
        let inserted = queries::insert_words(&self.pool, &raw).await?;
        Ok(inserted as usize)
    }

    async fn daily_report(&self, date: NaiveDate) -> RepoResult<DailyReport> {
        let (unique_players, total_wins) = queries::daily_counts(&self.pool, date).await?;
        Ok(DailyReport {
            date,
            unique_players,
            total_wins,
        })
    }

    async fn user_daily_stats(&self, user_id: i64) -> RepoResult<Vec<UserDayStats>> {
        Ok(queries::user_daily_stats(&self.pool, user_id).await?)
    }

    async fn all_player_stats(&self) -> RepoResult<Vec<PlayerTotals>> {
        Ok(queries::all_player_totals(&self.pool).await?)
    }
}
