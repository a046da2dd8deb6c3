use anyhow::Result;
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;

use crate::models::Word;

/// Candidate target words read from a newline-separated file
pub struct WordList {
    words: Vec<Word>,
}

impl WordList {
    /// Load a word list, keeping only valid words of `word_length` letters
    pub async fn load<P: AsRef<Path>>(path: P, word_length: usize) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let list = Self::parse(&content, word_length);

        tracing::info!("Loaded {} words from word list", list.len());

        Ok(list)
    }

    /// Parse file contents; blank lines and `#` comments are skipped,
    /// invalid entries are dropped, duplicates collapse.
    pub fn parse(content: &str, word_length: usize) -> Self {
        let mut skipped = 0;
        let unique: BTreeSet<Word> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match Word::parse(&Word::normalize(line), word_length) {
                Ok(word) => Some(word),
                Err(_) => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            tracing::warn!("Skipped {} invalid entries in word list", skipped);
        }

        Self {
            words: unique.into_iter().collect(),
        }
    }

    /// Create an empty word list
    pub fn empty() -> Self {
        Self { words: Vec::new() }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_word_list() {
        let list = WordList::empty();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_parse_filters_and_normalizes() {
        let content = "crane\nSLATE\n  speed  \n\n# comment\nabc\nbaby*\ntoolong\nCrane\n";
        let list = WordList::parse(content, 5);

        let words: Vec<&str> = list.words().iter().map(Word::as_str).collect();
        assert_eq!(words, vec!["CRANE", "SLATE", "SPEED"]);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "abbey\nerase\nspeed").unwrap();

        let list = WordList::load(file.path(), 5).await.unwrap();
        assert_eq!(list.len(), 3);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        assert!(WordList::load("/nonexistent/words.txt", 5).await.is_err());
    }
}
