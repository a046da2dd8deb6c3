use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    #[error("word must be exactly {expected} letters, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("word must contain only letters A-Z")]
    NonAlphabetic,
}

/// A pool or guess word: fixed length, ASCII uppercase letters only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Validate `raw` as a word of `length` letters.
    ///
    /// No case folding happens here; callers normalize first.
    pub fn parse(raw: &str, length: usize) -> Result<Self, WordError> {
        let actual = raw.chars().count();
        if actual != length {
            return Err(WordError::WrongLength {
                expected: length,
                actual,
            });
        }
        if !raw.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(WordError::NonAlphabetic);
        }
        Ok(Self(raw.to_string()))
    }

    /// Uppercase user input before validation. Whitespace is kept, so a
    /// padded guess fails validation.
    pub fn normalize(raw: &str) -> String {
        raw.to_uppercase()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
