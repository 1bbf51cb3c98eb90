use crate::{Error, Result};
use std::collections::HashSet;

/// Split text into space-delimited words, borrowing from the input.
/// Runs of spaces are skipped; no other character is treated as a separator.
pub fn split_into_words(text: &str) -> impl Iterator<Item = &str> {
    text.split(' ').filter(|word| !word.is_empty())
}

/// A word is valid when it holds no control character (code point below 0x20).
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}

/// Immutable set of words excluded from indexing and query matching.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: HashSet<Box<str>>,
}

impl StopWords {
    /// Build from any collection of words. Empty entries are dropped and
    /// duplicates collapse; a word with a control character is rejected.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HashSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(Error::InvalidStopWord(word.to_string()));
            }
            set.insert(Box::from(word));
        }
        Ok(Self { words: set })
    }

    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(|w| &**w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_space_runs() {
        let words: Vec<&str> = split_into_words("  funny  pet and   nasty rat ").collect();
        assert_eq!(words, vec!["funny", "pet", "and", "nasty", "rat"]);
    }

    #[test]
    fn empty_text_has_no_words() {
        assert_eq!(split_into_words("").count(), 0);
        assert_eq!(split_into_words("     ").count(), 0);
    }

    #[test]
    fn control_characters_are_invalid() {
        assert!(is_valid_word("cat"));
        assert!(is_valid_word("ёжик"));
        assert!(!is_valid_word("ca\u{12}t"));
        assert!(!is_valid_word("tab\tbed"));
    }

    #[test]
    fn stop_words_drop_empty_and_duplicates() {
        let stop = StopWords::new(["in", "", "the", "in"]).unwrap();
        assert_eq!(stop.len(), 2);
        assert!(stop.contains("in"));
        assert!(stop.contains("the"));
        assert!(!stop.contains(""));
    }

    #[test]
    fn invalid_stop_word_is_rejected() {
        let err = StopWords::from_text("in t\u{1}he").unwrap_err();
        assert_eq!(err, Error::InvalidStopWord("t\u{1}he".into()));
    }
}
