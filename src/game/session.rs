use serde::Serialize;

use super::{FeedbackEngine, GameError};
use crate::config::GameRules;
use crate::models::{GameSession, Guess, LetterFeedback, SessionStatus, Word};

/// Outcome of one accepted guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuessResult {
    pub feedback: Vec<LetterFeedback>,
    pub new_status: SessionStatus,
    pub sequence_number: u32,
    pub guesses_remaining: usize,
    /// Present only in the response that concludes the round
    pub revealed_target: Option<Word>,
}

impl GuessResult {
    pub fn message(&self) -> String {
        match (self.new_status, &self.revealed_target) {
            (SessionStatus::Win, _) => "Congratulations! You guessed the word!".to_string(),
            (SessionStatus::Loss, Some(target)) => {
                format!("Better luck next time. The word was {}.", target)
            }
            _ => "Keep guessing.".to_string(),
        }
    }
}

impl GameSession {
    pub fn guesses_remaining(&self, rules: &GameRules) -> usize {
        rules.max_guesses_per_word.saturating_sub(self.guesses.len())
    }

    /// Apply one normalized guess, advancing the state machine.
    ///
    /// Guards run in a fixed order: concluded, format, guess limit. The limit
    /// guard moves the session to `Loss` before rejecting, so the caller must
    /// persist the status even on that error.
    pub fn apply_guess(&mut self, raw: &str, rules: &GameRules) -> Result<GuessResult, GameError> {
        if self.status.is_concluded() {
            return Err(GameError::AlreadyConcluded {
                status: self.status,
            });
        }

        let word = Word::parse(raw, rules.word_length).map_err(|source| {
            GameError::InvalidGuessFormat {
                expected: rules.word_length,
                source,
            }
        })?;

        if self.guesses.len() >= rules.max_guesses_per_word {
            self.status = SessionStatus::Loss;
            return Err(GameError::GuessLimitExceeded);
        }

        let feedback =
            FeedbackEngine::new(rules.word_length).compare(self.target_word.as_str(), word.as_str());

        let sequence_number = self.guesses.len() as u32 + 1;
        let is_win = word == self.target_word;
        self.guesses.push(Guess {
            sequence_number,
            word,
            feedback: feedback.clone(),
        });

        let revealed_target = if is_win {
            self.status = SessionStatus::Win;
            Some(self.target_word.clone())
        } else if self.guesses.len() == rules.max_guesses_per_word {
            self.status = SessionStatus::Loss;
            Some(self.target_word.clone())
        } else {
            None
        };

        Ok(GuessResult {
            feedback,
            new_status: self.status,
            sequence_number,
            guesses_remaining: self.guesses_remaining(rules),
            revealed_target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LetterColor, WordError};
    use chrono::NaiveDate;

    fn session(target: &str) -> GameSession {
        GameSession::new(
            1,
            Word::parse(target, 5).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        )
    }

    #[test]
    fn test_correct_guess_wins_and_reveals() {
        let rules = GameRules::default();
        let mut game = session("CRANE");

        let result = game.apply_guess("CRANE", &rules).unwrap();

        assert_eq!(result.new_status, SessionStatus::Win);
        assert_eq!(result.sequence_number, 1);
        assert_eq!(result.guesses_remaining, 4);
        assert_eq!(result.revealed_target.as_ref().map(Word::as_str), Some("CRANE"));
        assert!(result.feedback.iter().all(|f| f.color == LetterColor::Green));
        assert_eq!(game.status, SessionStatus::Win);
        assert_eq!(result.message(), "Congratulations! You guessed the word!");
    }

    #[test]
    fn test_wrong_guess_keeps_playing_without_reveal() {
        let rules = GameRules::default();
        let mut game = session("SPEED");

        let result = game.apply_guess("ERASE", &rules).unwrap();

        assert_eq!(result.new_status, SessionStatus::InProgress);
        assert_eq!(result.guesses_remaining, 4);
        assert!(result.revealed_target.is_none());
        assert_eq!(result.message(), "Keep guessing.");
    }

    #[test]
    fn test_loss_exactly_on_last_guess() {
        let rules = GameRules::default();
        let mut game = session("CRANE");

        for n in 1..rules.max_guesses_per_word {
            let result = game.apply_guess("FOLKS", &rules).unwrap();
            assert_eq!(result.new_status, SessionStatus::InProgress, "guess {}", n);
            assert!(result.revealed_target.is_none());
        }

        let last = game.apply_guess("FOLKS", &rules).unwrap();
        assert_eq!(last.new_status, SessionStatus::Loss);
        assert_eq!(last.sequence_number, 5);
        assert_eq!(last.guesses_remaining, 0);
        assert_eq!(last.revealed_target.as_ref().map(Word::as_str), Some("CRANE"));
        assert_eq!(last.message(), "Better luck next time. The word was CRANE.");
    }

    #[test]
    fn test_win_on_last_guess_is_a_win() {
        let rules = GameRules::default();
        let mut game = session("CRANE");
        for _ in 1..rules.max_guesses_per_word {
            game.apply_guess("FOLKS", &rules).unwrap();
        }
        let last = game.apply_guess("CRANE", &rules).unwrap();
        assert_eq!(last.new_status, SessionStatus::Win);
    }

    #[test]
    fn test_concluded_session_rejects_and_never_changes() {
        let rules = GameRules::default();
        let mut game = session("CRANE");
        game.apply_guess("CRANE", &rules).unwrap();
        let snapshot = game.clone();

        for guess in ["SLATE", "CRANE", "BAD!!", ""] {
            match game.apply_guess(guess, &rules) {
                Err(GameError::AlreadyConcluded { status }) => {
                    assert_eq!(status, SessionStatus::Win)
                }
                other => panic!("expected AlreadyConcluded, got {:?}", other),
            }
        }
        assert_eq!(game, snapshot);
    }

    #[test]
    fn test_invalid_format_rejected_without_state_change() {
        let rules = GameRules::default();
        let mut game = session("ABBEY");

        match game.apply_guess("BABY*", &rules) {
            Err(GameError::InvalidGuessFormat { expected, source }) => {
                assert_eq!(expected, 5);
                assert_eq!(source, WordError::NonAlphabetic);
            }
            other => panic!("expected InvalidGuessFormat, got {:?}", other),
        }
        assert!(matches!(
            game.apply_guess("ABBEYS", &rules),
            Err(GameError::InvalidGuessFormat { .. })
        ));
        assert!(game.guesses.is_empty());
        assert_eq!(game.status, SessionStatus::InProgress);
    }

    #[test]
    fn test_limit_guard_forces_loss_when_status_lagged() {
        let rules = GameRules::default();
        let mut game = session("CRANE");
        for _ in 0..rules.max_guesses_per_word {
            game.apply_guess("FOLKS", &rules).unwrap();
        }
        // Simulate a stored status that never caught up with the guess count
        game.status = SessionStatus::InProgress;

        assert!(matches!(
            game.apply_guess("CRANE", &rules),
            Err(GameError::GuessLimitExceeded)
        ));
        assert_eq!(game.status, SessionStatus::Loss);
        assert_eq!(game.guesses.len(), rules.max_guesses_per_word);

        // Repeated calls keep reporting the loss
        assert!(matches!(
            game.apply_guess("CRANE", &rules),
            Err(GameError::AlreadyConcluded {
                status: SessionStatus::Loss
            })
        ));
    }

    #[test]
    fn test_format_checked_before_limit_on_lagging_session() {
        let rules = GameRules::default();
        let mut game = session("CRANE");
        for _ in 0..rules.max_guesses_per_word {
            game.apply_guess("FOLKS", &rules).unwrap();
        }
        game.status = SessionStatus::InProgress;

        assert!(matches!(
            game.apply_guess("CRAN3", &rules),
            Err(GameError::InvalidGuessFormat { .. })
        ));
        // A malformed guess never trips the limit guard
        assert_eq!(game.status, SessionStatus::InProgress);
        assert_eq!(game.guesses.len(), rules.max_guesses_per_word);
    }

    #[test]
    fn test_sequence_numbers_are_contiguous() {
        let rules = GameRules::default();
        let mut game = session("CRANE");
        for guess in ["FOLKS", "BLIMP", "SLATE"] {
            game.apply_guess(guess, &rules).unwrap();
        }
        let numbers: Vec<u32> = game.guesses.iter().map(|g| g.sequence_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(game.guesses_remaining(&rules), 2);
    }
}
