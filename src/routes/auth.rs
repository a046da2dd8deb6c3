use crate::{
    auth::{self, AuthFailure},
    models::Role,
    AppState,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{api_error, ApiError, JsonBody, MessageResponse};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    /// JWT for backend API authentication
    pub access_token: String,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

fn auth_failure_response(err: AuthFailure) -> ApiError {
    let status = match &err {
        AuthFailure::MissingCredentials
        | AuthFailure::UsernameTooShort { .. }
        | AuthFailure::WeakPassword { .. } => StatusCode::BAD_REQUEST,
        AuthFailure::UsernameTaken => StatusCode::CONFLICT,
        AuthFailure::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AuthFailure::Hashing(_) | AuthFailure::Repository(_) => {
            tracing::error!("Authentication backend failure: {}", err);
            return api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error: could not process credentials.",
            );
        }
    };
    api_error(status, err.to_string())
}

/// Create a player account
pub async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    state
        .authenticator
        .register(payload.username.trim(), &payload.password)
        .await
        .map_err(auth_failure_response)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Registration successful. Please log in.".to_string(),
        }),
    ))
}

/// Check credentials and issue a JWT
pub async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(payload): JsonBody<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .authenticator
        .verify(payload.username.trim(), &payload.password)
        .await
        .map_err(|e| {
            if matches!(e, AuthFailure::InvalidCredentials) {
                tracing::warn!("Failed login attempt for username {:?}", payload.username);
            }
            auth_failure_response(e)
        })?;

    let access_token = auth::generate_token(
        &user,
        &state.config.security.jwt_secret,
        state.config.security.token_ttl_hours,
    )
    .map_err(|e| {
        tracing::error!("Failed to generate JWT token: {}", e);
        api_error(StatusCode::INTERNAL_SERVER_ERROR, "Server error: could not issue token.")
    })?;

    tracing::info!("User logged in: {} ({})", user.username, user.user_id);

    Ok(Json(LoginResponse {
        message: "Login successful.".to_string(),
        access_token,
        username: user.username,
        role: user.role,
    }))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout(user: auth::AuthenticatedUser) -> Json<MessageResponse> {
    tracing::info!("Logging out user: {} ({})", user.username, user.user_id);
    Json(MessageResponse {
        message: "Logged out successfully.".to_string(),
    })
}

/// Get current user info from database
pub async fn get_current_user(
    user: auth::AuthenticatedUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<UserResponse>, ApiError> {
    tracing::debug!(
        "Getting user info for authenticated user: {} ({})",
        user.username,
        user.user_id
    );

    let db_user = state
        .repository
        .get_user(user.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Database error fetching user: {}", e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error: could not load user.",
            )
        })?
        .ok_or_else(|| {
            tracing::warn!("User not found in database: {}", user.user_id);
            api_error(StatusCode::NOT_FOUND, "User not found.")
        })?;

    Ok(Json(UserResponse {
        user_id: db_user.user_id,
        username: db_user.username,
        role: db_user.role,
    }))
}
