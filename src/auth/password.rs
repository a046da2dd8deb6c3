//! Account registration and credential checks.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use thiserror::Error;

use crate::config::GameRules;
use crate::db::{Repository, RepositoryError};
use crate::models::User;

/// Special characters a password must include at least one of
pub const PASSWORD_SPECIAL_CHARS: &[char] = &['$', '%', '*', '@'];

#[derive(Debug, Error)]
pub enum AuthFailure {
    #[error("Username and password are required.")]
    MissingCredentials,

    #[error("Username must be at least {min} letters.")]
    UsernameTooShort { min: usize },

    #[error("Password is too weak. It must be at least {min} characters, contain letters, numbers, and one of: $, %, *, @.")]
    WeakPassword { min: usize },

    #[error("Username already exists.")]
    UsernameTaken,

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("storage error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AuthFailure {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict(_) => AuthFailure::UsernameTaken,
            other => AuthFailure::Repository(other),
        }
    }
}

/// Credential storage and verification, kept behind a trait so the HTTP
/// layer never touches hashes.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Create a player account after checking the username and password rules
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthFailure>;

    /// Return the user whose credentials match
    async fn verify(&self, username: &str, password: &str) -> Result<User, AuthFailure>;
}

pub fn is_valid_username(username: &str, rules: &GameRules) -> bool {
    username.chars().count() >= rules.min_username_length
}

/// At least `min_password_length` characters with a letter, a digit and one
/// of `PASSWORD_SPECIAL_CHARS`.
pub fn is_valid_password(password: &str, rules: &GameRules) -> bool {
    password.chars().count() >= rules.min_password_length
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(&c))
}

pub fn hash_password(password: &str) -> Result<String, AuthFailure> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthFailure::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Argon2-backed authenticator over the repository
pub struct PasswordAuthenticator {
    repo: Arc<dyn Repository>,
    rules: GameRules,
}

impl PasswordAuthenticator {
    pub fn new(repo: Arc<dyn Repository>, rules: GameRules) -> Self {
        Self { repo, rules }
    }
}

#[async_trait]
impl Authenticator for PasswordAuthenticator {
    async fn register(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthFailure::MissingCredentials);
        }
        if !is_valid_username(username, &self.rules) {
            return Err(AuthFailure::UsernameTooShort {
                min: self.rules.min_username_length,
            });
        }
        if !is_valid_password(password, &self.rules) {
            return Err(AuthFailure::WeakPassword {
                min: self.rules.min_password_length,
            });
        }
        if self.repo.find_user_by_username(username).await?.is_some() {
            return Err(AuthFailure::UsernameTaken);
        }

        // Argon2 is CPU-bound; run it on the blocking pool
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthFailure::Hashing(e.to_string()))??;

        let user = self.repo.create_user(username, &password_hash).await?;
        tracing::info!("Registered user {} ({})", user.username, user.user_id);
        Ok(user)
    }

    async fn verify(&self, username: &str, password: &str) -> Result<User, AuthFailure> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthFailure::MissingCredentials);
        }
        let Some(user) = self.repo.find_user_by_username(username).await? else {
            return Err(AuthFailure::InvalidCredentials);
        };

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AuthFailure::Hashing(e.to_string()))?;

        if matches {
            Ok(user)
        } else {
            Err(AuthFailure::InvalidCredentials)
        }
    }
}
