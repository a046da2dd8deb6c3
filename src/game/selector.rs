use rand::Rng;

use super::GameError;
use crate::db::Repository;
use crate::models::Word;

/// Picks target words uniformly at random from the stored pool.
pub struct WordSelector;

impl WordSelector {
    /// Pick without loading the pool: count, then fetch one word at a
    /// random offset.
    pub async fn pick(repo: &dyn Repository) -> Result<Word, GameError> {
        let size = repo.count_words().await?;
        let idx = Self::draw_index(size, &mut rand::rng()).inspect_err(|_| {
            tracing::error!("Word pool is empty; cannot start a round");
        })?;
        // The pool may shrink between the two queries
        repo.word_at(idx).await?.ok_or(GameError::EmptyPool)
    }

    fn draw_index<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<usize, GameError> {
        if size == 0 {
            return Err(GameError::EmptyPool);
        }
        Ok(rng.random_range(0..size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::InMemoryRepository;
    use rand::{rngs::StdRng, SeedableRng};
    use std::collections::HashSet;

    fn pool(words: &[&str]) -> Vec<Word> {
        words.iter().map(|w| Word::parse(w, 5).unwrap()).collect()
    }

    #[test]
    fn test_draw_from_empty_pool_fails() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            WordSelector::draw_index(0, &mut rng),
            Err(GameError::EmptyPool)
        ));
    }

    #[test]
    fn test_draw_reaches_every_index() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: HashSet<usize> = (0..200)
            .map(|_| WordSelector::draw_index(4, &mut rng).unwrap())
            .collect();
        assert_eq!(seen, (0..4).collect());
    }

    #[tokio::test]
    async fn test_pick_from_empty_repository_fails() {
        let repo = InMemoryRepository::new();
        assert!(matches!(
            WordSelector::pick(&repo).await,
            Err(GameError::EmptyPool)
        ));
    }

    #[tokio::test]
    async fn test_pick_returns_pool_member() {
        let repo = InMemoryRepository::new();
        let words = pool(&["CRANE", "SLATE", "SPEED"]);
        repo.insert_words(&words).await.unwrap();

        for _ in 0..50 {
            let picked = WordSelector::pick(&repo).await.unwrap();
            assert!(words.contains(&picked));
        }
    }
}
