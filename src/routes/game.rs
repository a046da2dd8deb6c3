use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{api_error, ApiError, JsonBody, PathParam};
use crate::{
    auth::AuthenticatedUser,
    game::GameError,
    models::{LetterFeedback, SessionStatus},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct GuessRequest {
    pub game_id: Uuid,
    #[serde(default)]
    pub guess: String,
}

impl GuessRequest {
    /// Shape checks only; word rules are enforced by the game session
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.guess.trim().is_empty() {
            return Err(api_error(StatusCode::BAD_REQUEST, "Guess is required."));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StartGameResponse {
    pub message: String,
    pub game_id: Uuid,
    pub guesses_remaining: usize,
    pub words_left_today: usize,
    pub status: SessionStatus,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    pub message: String,
    pub guess_number: u32,
    pub feedback: Vec<LetterFeedback>,
    pub game_status: SessionStatus,
    pub guesses_remaining: usize,
    /// Null until the round concludes
    pub target_word: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GuessView {
    pub guess_number: u32,
    pub word: String,
    pub feedback: Vec<LetterFeedback>,
}

#[derive(Debug, Serialize)]
pub struct GameView {
    pub game_id: Uuid,
    pub status: SessionStatus,
    pub date_played: NaiveDate,
    pub guesses: Vec<GuessView>,
    pub guesses_remaining: usize,
    pub target_word: Option<String>,
}

pub fn game_error_response(err: GameError) -> ApiError {
    let status = match &err {
        GameError::InvalidGuessFormat { .. }
        | GameError::AlreadyConcluded { .. }
        | GameError::GuessLimitExceeded => StatusCode::BAD_REQUEST,
        GameError::NotFound => StatusCode::NOT_FOUND,
        GameError::DailyLimitReached { .. } => StatusCode::FORBIDDEN,
        GameError::Conflict => StatusCode::CONFLICT,
        GameError::EmptyPool => StatusCode::INTERNAL_SERVER_ERROR,
        GameError::Repository(e) => {
            tracing::error!("Repository failure during game operation: {}", e);
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error: could not complete the request.",
            );
        }
    };
    api_error(status, err.to_string())
}

/// Start a new round, subject to the daily limit
pub async fn start_game(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StartGameResponse>, ApiError> {
    let today = Utc::now().date_naive();
    let round = state
        .coordinator
        .start_round(user.user_id, today)
        .await
        .map_err(game_error_response)?;

    Ok(Json(StartGameResponse {
        message: "Game started.".to_string(),
        game_id: round.session_id,
        guesses_remaining: round.guesses_remaining,
        words_left_today: round.words_left_today,
        status: round.status,
    }))
}

/// Submit one guess for an owned round
pub async fn submit_guess(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<GuessRequest>,
) -> Result<Json<GuessResponse>, ApiError> {
    payload.validate()?;

    let result = state
        .coordinator
        .submit_guess(payload.game_id, user.user_id, &payload.guess)
        .await
        .map_err(game_error_response)?;

    Ok(Json(GuessResponse {
        message: result.message(),
        guess_number: result.sequence_number,
        feedback: result.feedback,
        game_status: result.new_status,
        guesses_remaining: result.guesses_remaining,
        target_word: result.revealed_target.map(|w| w.to_string()),
    }))
}

/// Current state of an owned round; the target stays hidden while in progress
pub async fn get_game(
    user: AuthenticatedUser,
    State(state): State<Arc<AppState>>,
    PathParam(game_id): PathParam<Uuid>,
) -> Result<Json<GameView>, ApiError> {
    let session = state
        .coordinator
        .get_round(game_id, user.user_id)
        .await
        .map_err(game_error_response)?;

    let guesses_remaining = session.guesses_remaining(state.coordinator.rules());
    let target_word = session
        .status
        .is_concluded()
        .then(|| session.target_word.to_string());

    Ok(Json(GameView {
        game_id: session.id,
        status: session.status,
        date_played: session.played_date,
        guesses: session
            .guesses
            .into_iter()
            .map(|g| GuessView {
                guess_number: g.sequence_number,
                word: g.word.to_string(),
                feedback: g.feedback,
            })
            .collect(),
        guesses_remaining,
        target_word,
    }))
}
