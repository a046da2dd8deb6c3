use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, StatusCode},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{Role, User};
use crate::routes::{api_error, ApiError};
use crate::AppState;

pub mod password;

pub use password::{AuthFailure, Authenticator, PasswordAuthenticator};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // User ID
    pub username: String, // Username
    pub role: Role,       // Player or admin
    pub exp: usize,       // Expiration time
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// An authenticated user whose stored account currently has the admin role
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

fn unauthorized() -> ApiError {
    api_error(StatusCode::UNAUTHORIZED, "Unauthorized access. Please log in.")
}

fn forbidden() -> ApiError {
    api_error(StatusCode::FORBIDDEN, "Access denied. Admin privileges required.")
}

/// Extractor for authenticated users from JWT tokens
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let app_state = Arc::<AppState>::from_ref(state);

        // Try to extract token from Authorization header first
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(String::from)
            // If no Authorization header, try query parameter
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| {
                        serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok()
                    })
                    .and_then(|params| {
                        params
                            .iter()
                            .find(|(k, _)| k == "token")
                            .map(|(_, v)| v.clone())
                    })
            });

        async move {
            let token = token.ok_or_else(unauthorized)?;
            verify_token(&token, &app_state.config.security.jwt_secret).map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                unauthorized()
            })
        }
    }
}

/// Extractor that additionally requires the admin role.
///
/// The role is re-read from storage on every request, so a demoted admin
/// loses access before their token expires.
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;
        let app_state = Arc::<AppState>::from_ref(state);

        let stored = app_state
            .repository
            .get_user(user.user_id)
            .await
            .map_err(|e| {
                tracing::error!("Database error checking admin role: {}", e);
                api_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error: could not verify privileges.",
                )
            })?
            .ok_or_else(|| {
                tracing::warn!("Token for missing user {} presented", user.user_id);
                unauthorized()
            })?;

        if !stored.is_admin() {
            tracing::warn!(
                "Non-admin user {} ({}) denied admin access",
                user.username,
                user.user_id
            );
            return Err(forbidden());
        }

        Ok(AdminUser(AuthenticatedUser {
            role: stored.role,
            ..user
        }))
    }
}

/// Generate a JWT token for a user
pub fn generate_token(
    user: &User,
    jwt_secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(ttl_hours))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user.user_id.to_string(),
        username: user.username.clone(),
        role: user.role,
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
}

/// Validate a JWT token and return the user it was issued to
pub fn verify_token(token: &str, jwt_secret: &str) -> anyhow::Result<AuthenticatedUser> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )?;

    let user_id = token_data.claims.sub.parse::<i64>()?;

    Ok(AuthenticatedUser {
        user_id,
        username: token_data.claims.username,
        role: token_data.claims.role,
    })
}
