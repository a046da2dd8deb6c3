use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{api_error, ApiError, PathParam};
use crate::{
    auth::AdminUser,
    db::RepositoryError,
    models::{DailyReport, PlayerTotals, UserDayStats, Word},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserReportResponse {
    pub username: String,
    pub user_id: i64,
    pub report: Vec<UserDayStats>,
}

#[derive(Debug, Serialize)]
pub struct AllUsersReportResponse {
    pub report: Vec<PlayerTotals>,
}

#[derive(Debug, Serialize)]
pub struct WordPoolResponse {
    pub count: usize,
    pub words: Vec<Word>,
}

fn repository_failure(err: RepositoryError) -> ApiError {
    tracing::error!("Database error building report: {}", err);
    api_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Database error: could not build report.",
    )
}

/// Parse a `YYYY-MM-DD` report date
pub fn parse_report_date(raw: Option<&str>) -> Result<NaiveDate, ApiError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty()).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Date parameter (YYYY-MM-DD) is required.",
        )
    })?;

    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "Invalid date format. Use YYYY-MM-DD.",
        )
    })
}

/// Players and wins on one day
pub async fn daily_report(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyReportQuery>,
) -> Result<Json<DailyReport>, ApiError> {
    let date = parse_report_date(query.date.as_deref())?;
    tracing::debug!("Admin {} requested daily report for {}", admin.username, date);

    let report = state
        .repository
        .daily_report(date)
        .await
        .map_err(repository_failure)?;

    Ok(Json(report))
}

/// Per-day history for one user, looked up case-insensitively
pub async fn user_report(
    AdminUser(admin): AdminUser,
    State(state): State<Arc<AppState>>,
    PathParam(username): PathParam<String>,
) -> Result<Json<UserReportResponse>, ApiError> {
    tracing::debug!("Admin {} requested report for user {}", admin.username, username);

    let user = state
        .repository
        .find_user_by_username(&username)
        .await
        .map_err(repository_failure)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("User \"{}\" not found.", username),
            )
        })?;

    let report = state
        .repository
        .user_daily_stats(user.user_id)
        .await
        .map_err(repository_failure)?;

    Ok(Json(UserReportResponse {
        username,
        user_id: user.user_id,
        report,
    }))
}

/// Lifetime totals for every player
pub async fn all_users_report(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AllUsersReportResponse>, ApiError> {
    let report = state
        .repository
        .all_player_stats()
        .await
        .map_err(repository_failure)?;

    Ok(Json(AllUsersReportResponse { report }))
}

/// The configured target words
pub async fn word_pool(
    AdminUser(_): AdminUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<WordPoolResponse>, ApiError> {
    let words = state
        .repository
        .list_word_pool()
        .await
        .map_err(repository_failure)?;

    Ok(Json(WordPoolResponse {
        count: words.len(),
        words,
    }))
}
