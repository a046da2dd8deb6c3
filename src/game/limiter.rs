use chrono::NaiveDate;

use super::GameError;
use crate::db::{Repository, RepositoryError};

/// Gate on how many rounds a user may start per calendar day.
///
/// Counts every session started that day, whatever its status.
pub struct DailyLimiter {
    max_words_per_day: usize,
}

impl DailyLimiter {
    pub fn new(max_words_per_day: usize) -> Self {
        Self { max_words_per_day }
    }

    pub fn allows(&self, played_today: usize) -> bool {
        played_today < self.max_words_per_day
    }

    pub async fn can_start(
        &self,
        repo: &dyn Repository,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<bool, RepositoryError> {
        let played = repo.count_sessions_by_user_and_date(user_id, today).await?;
        Ok(self.allows(played))
    }

    /// `can_start` as a guard: fails with `DailyLimitReached` when blocked
    pub async fn check(
        &self,
        repo: &dyn Repository,
        user_id: i64,
        today: NaiveDate,
    ) -> Result<(), GameError> {
        if self.can_start(repo, user_id, today).await? {
            return Ok(());
        }
        tracing::debug!(
            "User {} blocked by daily limit of {}",
            user_id,
            self.max_words_per_day
        );
        Err(GameError::DailyLimitReached {
            limit: self.max_words_per_day,
        })
    }

    /// Rounds left today once `played_today` sessions exist
    pub fn remaining(&self, played_today: usize) -> usize {
        self.max_words_per_day.saturating_sub(played_today)
    }
}
