//! In-process `Repository` used by tests. Mirrors the Postgres constraints
//! the game logic depends on: case-insensitively unique usernames, unique
//! pool words and unique (game, guess number) pairs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use super::{RepoResult, Repository, RepositoryError};
use crate::models::{
    DailyReport, GameSession, Guess, PlayerTotals, Role, SessionStatus, User, UserDayStats, Word,
};

#[derive(Default)]
struct Store {
    users: Vec<User>,
    sessions: HashMap<Uuid, GameSession>,
    words: Vec<Word>,
}

#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    /// Promote an existing user; admin accounts are provisioned out of band
    pub fn set_role(&self, user_id: i64, role: Role) {
        if let Some(user) = self.store().users.iter_mut().find(|u| u.user_id == user_id) {
            user.role = role;
        }
    }

    /// Overwrite a stored session, bypassing the normal write paths
    pub fn put_session(&self, session: GameSession) {
        self.store().sessions.insert(session.id, session);
    }
}

fn missing_session(session_id: Uuid) -> RepositoryError {
    RepositoryError::Corrupt(format!("no game {}", session_id))
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, user_id: i64) -> RepoResult<Option<User>> {
        Ok(self.store().users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let wanted = username.to_lowercase();
        Ok(self
            .store()
            .users
            .iter()
            .find(|u| u.username.to_lowercase() == wanted)
            .cloned())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> RepoResult<User> {
        let mut store = self.store();
        let lowered = username.to_lowercase();
        if store.users.iter().any(|u| u.username.to_lowercase() == lowered) {
            return Err(RepositoryError::Conflict("username already exists".to_string()));
        }
        let user = User {
            user_id: store.users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role: Role::Player,
            date_registered: Utc::now(),
        };
        store.users.push(user.clone());
        Ok(user)
    }

    async fn count_sessions_by_user_and_date(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> RepoResult<usize> {
        Ok(self
            .store()
            .sessions
            .values()
            .filter(|s| s.owner_id == user_id && s.played_date == date)
            .count())
    }

    async fn create_session(&self, session: &GameSession) -> RepoResult<()> {
        let mut store = self.store();
        if store.sessions.contains_key(&session.id) {
            return Err(RepositoryError::Conflict("game id already exists".to_string()));
        }
        store.sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, session_id: Uuid) -> RepoResult<Option<GameSession>> {
        Ok(self.store().sessions.get(&session_id).cloned())
    }

    async fn append_guess(
        &self,
        session_id: Uuid,
        guess: &Guess,
        status: SessionStatus,
    ) -> RepoResult<()> {
        let mut store = self.store();
        let session = store
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| missing_session(session_id))?;

        if session
            .guesses
            .iter()
            .any(|g| g.sequence_number == guess.sequence_number)
        {
            return Err(RepositoryError::Conflict(format!(
                "guess {} already recorded",
                guess.sequence_number
            )));
        }

        session.guesses.push(guess.clone());
        session.guesses.sort_by_key(|g| g.sequence_number);
        session.status = status;
        Ok(())
    }

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
    ) -> RepoResult<()> {
        let mut store = self.store();
        let session = store
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| missing_session(session_id))?;
        session.status = status;
        Ok(())
    }

    async fn list_word_pool(&self) -> RepoResult<Vec<Word>> {
        Ok(self.store().words.clone())
    }

    async fn count_words(&self) -> RepoResult<usize> {
        Ok(self.store().words.len())
    }

    async fn word_at(&self, index: usize) -> RepoResult<Option<Word>> {
        Ok(self.store().words.get(index).cloned())
    }

    async fn insert_words(&self, words: &[Word]) -> RepoResult<usize> {
        let mut store = self.store();
        let mut inserted = 0;
        for word in words {
            if !store.words.contains(word) {
                store.words.push(word.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn daily_report(&self, date: NaiveDate) -> RepoResult<DailyReport> {
        let store = self.store();
        let played: Vec<&GameSession> = store
            .sessions
            .values()
            .filter(|s| s.played_date == date)
            .collect();

        let mut players: Vec<i64> = played.iter().map(|s| s.owner_id).collect();
        players.sort_unstable();
        players.dedup();

        Ok(DailyReport {
            date,
            unique_players: players.len() as i64,
            total_wins: played
                .iter()
                .filter(|s| s.status == SessionStatus::Win)
                .count() as i64,
        })
    }

    async fn user_daily_stats(&self, user_id: i64) -> RepoResult<Vec<UserDayStats>> {
        let store = self.store();
        let mut by_day: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
        for session in store.sessions.values().filter(|s| s.owner_id == user_id) {
            let entry = by_day.entry(session.played_date).or_default();
            entry.0 += 1;
            if session.status == SessionStatus::Win {
                entry.1 += 1;
            }
        }

        Ok(by_day
            .into_iter()
            .rev()
            .map(|(date, (words_tried, correct_guesses))| UserDayStats {
                date,
                words_tried,
                correct_guesses,
            })
            .collect())
    }

    async fn all_player_stats(&self) -> RepoResult<Vec<PlayerTotals>> {
        let store = self.store();
        let mut totals: Vec<PlayerTotals> = store
            .users
            .iter()
            .filter(|u| u.role == Role::Player)
            .map(|u| {
                let owned = store.sessions.values().filter(|s| s.owner_id == u.user_id);
                let (tried, wins) = owned.fold((0, 0), |(tried, wins), s| {
                    (tried + 1, wins + i64::from(s.status == SessionStatus::Win))
                });
                PlayerTotals {
                    username: u.username.clone(),
                    total_words_tried: tried,
                    total_wins: wins,
                }
            })
            .collect();
        totals.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(totals)
    }
}
