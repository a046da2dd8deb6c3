use chrono::NaiveDate;
use sqlx::{PgPool, Result};
use uuid::Uuid;

use crate::models::{GameRow, GuessRow, PlayerTotals, SessionStatus, User, UserDayStats};

// User queries
pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Case-insensitive username lookup
pub async fn find_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(username) = LOWER($1) LIMIT 1")
        .bind(username)
        .fetch_optional(pool)
        .await
}

/// Insert a new player. Fails with a unique violation if the name is taken.
pub async fn create_user(pool: &PgPool, username: &str, password_hash: &str) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password_hash, role)
        VALUES ($1, $2, 'player')
        RETURNING *
        "#,
    )
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await
}

// Game queries
pub async fn count_games_by_user_and_date(
    pool: &PgPool,
    user_id: i64,
    date: NaiveDate,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM games WHERE user_id = $1 AND date_played = $2",
    )
    .bind(user_id)
    .bind(date)
    .fetch_one(pool)
    .await
}

pub async fn create_game(
    pool: &PgPool,
    game_id: Uuid,
    user_id: i64,
    target_word: &str,
    date_played: NaiveDate,
) -> Result<GameRow> {
    sqlx::query_as::<_, GameRow>(
        r#"
        INSERT INTO games (game_id, user_id, target_word, date_played, status)
        VALUES ($1, $2, $3, $4, 'in_progress')
        RETURNING game_id, user_id, target_word, date_played, status
        "#,
    )
    .bind(game_id)
    .bind(user_id)
    .bind(target_word)
    .bind(date_played)
    .fetch_one(pool)
    .await
}

pub async fn get_game(pool: &PgPool, game_id: Uuid) -> Result<Option<GameRow>> {
    sqlx::query_as::<_, GameRow>(
        "SELECT game_id, user_id, target_word, date_played, status FROM games WHERE game_id = $1",
    )
    .bind(game_id)
    .fetch_optional(pool)
    .await
}

pub async fn update_game_status(pool: &PgPool, game_id: Uuid, status: SessionStatus) -> Result<()> {
    sqlx::query("UPDATE games SET status = $1 WHERE game_id = $2")
        .bind(status.as_str())
        .bind(game_id)
        .execute(pool)
        .await?;
    Ok(())
}

// Guess queries
pub async fn get_guesses(pool: &PgPool, game_id: Uuid) -> Result<Vec<GuessRow>> {
    sqlx::query_as::<_, GuessRow>(
        r#"
        SELECT id, game_id, guess_word, guess_number, feedback
        FROM guesses
        WHERE game_id = $1
        ORDER BY guess_number
        "#,
    )
    .bind(game_id)
    .fetch_all(pool)
    .await
}

/// Store a guess and the resulting game status in one transaction.
///
/// The (game_id, guess_number) unique constraint rejects a second writer
/// that read the same guess count.
pub async fn insert_guess_with_status(
    pool: &PgPool,
    game_id: Uuid,
    guess_word: &str,
    guess_number: i32,
    feedback: serde_json::Value,
    status: SessionStatus,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO guesses (game_id, guess_word, guess_number, feedback)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(game_id)
    .bind(guess_word)
    .bind(guess_number)
    .bind(feedback)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE games SET status = $1 WHERE game_id = $2")
        .bind(status.as_str())
        .bind(game_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

// Word pool queries
pub async fn list_words(pool: &PgPool) -> Result<Vec<String>> {
    sqlx::query_scalar::<_, String>("SELECT word FROM word_list ORDER BY id")
        .fetch_all(pool)
        .await
}

pub async fn count_words(pool: &PgPool) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM word_list")
        .fetch_one(pool)
        .await
}

pub async fn word_at_offset(pool: &PgPool, offset: i64) -> Result<Option<String>> {
    sqlx::query_scalar::<_, String>("SELECT word FROM word_list ORDER BY id OFFSET $1 LIMIT 1")
        .bind(offset)
        .fetch_optional(pool)
        .await
}

/// Add words to the pool, skipping ones already present.
/// Returns how many were new.
pub async fn insert_words(pool: &PgPool, words: &[String]) -> Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO word_list (word)
        SELECT * FROM UNNEST($1::VARCHAR[])
        ON CONFLICT (word) DO NOTHING
        "#,
    )
    .bind(words)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

// Report queries
pub async fn daily_counts(pool: &PgPool, date: NaiveDate) -> Result<(i64, i64)> {
    sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COUNT(DISTINCT user_id) AS unique_players,
            COUNT(*) FILTER (WHERE status = 'win') AS total_wins
        FROM games
        WHERE date_played = $1
        "#,
    )
    .bind(date)
    .fetch_one(pool)
    .await
}

pub async fn user_daily_stats(pool: &PgPool, user_id: i64) -> Result<Vec<UserDayStats>> {
    sqlx::query_as::<_, UserDayStats>(
        r#"
        SELECT
            date_played AS date,
            COUNT(*) AS words_tried,
            COUNT(*) FILTER (WHERE status = 'win') AS correct_guesses
        FROM games
        WHERE user_id = $1
        GROUP BY date_played
        ORDER BY date_played DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn all_player_totals(pool: &PgPool) -> Result<Vec<PlayerTotals>> {
    sqlx::query_as::<_, PlayerTotals>(
        r#"
        SELECT
            u.username,
            COUNT(g.game_id) AS total_words_tried,
            COUNT(g.game_id) FILTER (WHERE g.status = 'win') AS total_wins
        FROM users u
        LEFT JOIN games g ON g.user_id = u.user_id
        WHERE u.role = 'player'
        GROUP BY u.user_id, u.username
        ORDER BY u.username
        "#,
    )
    .fetch_all(pool)
    .await
}
