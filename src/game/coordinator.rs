use std::hash::Hash;
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{DailyLimiter, GameError, GuessResult, WordSelector};
use crate::config::GameRules;
use crate::db::Repository;
use crate::models::{GameSession, SessionStatus, Word};

type LockMap<K> = DashMap<K, Arc<Mutex<()>>>;

/// Returned by `start_round`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundStarted {
    pub session_id: Uuid,
    pub guesses_remaining: usize,
    pub words_left_today: usize,
    pub status: SessionStatus,
}

/// Entry point for starting rounds and submitting guesses.
///
/// Guesses on one session are serialized through a per-session lock, and
/// starts for one user through a per-user lock, so the guess count and the
/// daily count are never read stale by a concurrent request in this process.
pub struct SessionCoordinator {
    repo: Arc<dyn Repository>,
    rules: GameRules,
    limiter: DailyLimiter,
    session_locks: LockMap<Uuid>,
    user_locks: LockMap<i64>,
}

impl SessionCoordinator {
    pub fn new(repo: Arc<dyn Repository>, rules: GameRules) -> Self {
        let limiter = DailyLimiter::new(rules.max_words_per_day);
        Self {
            repo,
            rules,
            limiter,
            session_locks: DashMap::new(),
            user_locks: DashMap::new(),
        }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub async fn start_round(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<RoundStarted, GameError> {
        let lock = lock_for(&self.user_locks, user_id);
        let result = {
            let _guard = lock.lock().await;
            self.start_round_locked(user_id, today).await
        };
        release(&self.user_locks, user_id);
        result
    }

    async fn start_round_locked(
        &self,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<RoundStarted, GameError> {
        self.limiter.check(self.repo.as_ref(), user_id, today).await?;
        let target = WordSelector::pick(self.repo.as_ref()).await?;

        let session = GameSession::new(user_id, target, today);
        self.repo.create_session(&session).await?;
        let played = self
            .repo
            .count_sessions_by_user_and_date(user_id, today)
            .await?;

        tracing::info!("User {} started game {}", user_id, session.id);

        Ok(RoundStarted {
            session_id: session.id,
            guesses_remaining: self.rules.max_guesses_per_word,
            words_left_today: self.limiter.remaining(played),
            status: session.status,
        })
    }

    pub async fn submit_guess(
        &self,
        session_id: Uuid,
        user_id: i64,
        raw_guess: &str,
    ) -> Result<GuessResult, GameError> {
        let lock = lock_for(&self.session_locks, session_id);
        let result = {
            let _guard = lock.lock().await;
            self.submit_guess_locked(session_id, user_id, raw_guess).await
        };
        release(&self.session_locks, session_id);
        result
    }

    async fn submit_guess_locked(
        &self,
        session_id: Uuid,
        user_id: i64,
        raw_guess: &str,
    ) -> Result<GuessResult, GameError> {
        let mut session = self.load_owned(session_id, user_id).await?;
        let status_before = session.status;
        let guess = Word::normalize(raw_guess);

        match session.apply_guess(&guess, &self.rules) {
            Ok(result) => {
                let recorded = session
                    .guesses
                    .last()
                    .expect("apply_guess appends a guess on success");
                self.repo
                    .append_guess(session.id, recorded, result.new_status)
                    .await?;

                if result.new_status.is_concluded() {
                    tracing::info!(
                        "Game {} concluded with a {} after {} guesses",
                        session.id,
                        result.new_status,
                        result.sequence_number
                    );
                }
                Ok(result)
            }
            Err(GameError::GuessLimitExceeded) => {
                if session.status != status_before {
                    self.repo
                        .update_session_status(session.id, session.status)
                        .await?;
                }
                tracing::warn!(
                    "Game {} had exhausted its guesses while still in progress; marked as loss",
                    session.id
                );
                Err(GameError::GuessLimitExceeded)
            }
            Err(e) => Err(e),
        }
    }

    /// Load a session for display; only its owner may see it
    pub async fn get_round(&self, session_id: Uuid, user_id: i64) -> Result<GameSession, GameError> {
        self.load_owned(session_id, user_id).await
    }

    async fn load_owned(&self, session_id: Uuid, user_id: i64) -> Result<GameSession, GameError> {
        match self.repo.get_session(session_id).await? {
            Some(session) if session.owner_id == user_id => Ok(session),
            Some(_) => {
                tracing::warn!(
                    "User {} tried to access game {} owned by another user",
                    user_id,
                    session_id
                );
                Err(GameError::NotFound)
            }
            None => Err(GameError::NotFound),
        }
    }
}

fn lock_for<K: Eq + Hash + Copy>(map: &LockMap<K>, key: K) -> Arc<Mutex<()>> {
    map.entry(key)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

/// Drop the map's lock once no other request holds or awaits it.
/// Must be called while the caller still owns its clone.
fn release<K: Eq + Hash + Copy>(map: &LockMap<K>, key: K) {
    map.remove_if(&key, |_, lock| Arc::strong_count(lock) <= 2);
}
