use std::collections::HashMap;

use crate::models::{LetterColor, LetterFeedback};

/// Compares guesses against a target word and colors each letter.
pub struct FeedbackEngine {
    word_length: usize,
}

impl FeedbackEngine {
    pub fn new(word_length: usize) -> Self {
        Self { word_length }
    }

    /// Color every letter of `guess` against `target`.
    ///
    /// Returns an empty vector when either word has the wrong length; that is
    /// the signal for invalid input, not an error.
    ///
    /// Rules:
    /// - Exact position matches are Green and are credited first
    /// - Remaining letters are Orange while the target still has an
    ///   uncredited occurrence of that letter, otherwise Grey
    pub fn compare(&self, target: &str, guess: &str) -> Vec<LetterFeedback> {
        let target: Vec<char> = target.chars().collect();
        let guess: Vec<char> = guess.chars().collect();

        if target.len() != self.word_length || guess.len() != self.word_length {
            return Vec::new();
        }

        let mut remaining: HashMap<char, usize> = HashMap::new();
        for &letter in &target {
            *remaining.entry(letter).or_insert(0) += 1;
        }

        let mut colors = vec![LetterColor::Grey; self.word_length];

        // Greens first, so duplicates are never over-credited
        for (i, (&g, &t)) in guess.iter().zip(target.iter()).enumerate() {
            if g == t {
                colors[i] = LetterColor::Green;
                if let Some(count) = remaining.get_mut(&g) {
                    *count -= 1;
                }
            }
        }

        for (i, &g) in guess.iter().enumerate() {
            if colors[i] == LetterColor::Green {
                continue;
            }
            if let Some(count) = remaining.get_mut(&g) {
                if *count > 0 {
                    colors[i] = LetterColor::Orange;
                    *count -= 1;
                }
            }
        }

        guess
            .into_iter()
            .zip(colors)
            .map(|(letter, color)| LetterFeedback { letter, color })
            .collect()
    }
}
