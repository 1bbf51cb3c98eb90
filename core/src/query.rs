use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use crate::{Error, ExecutionMode, Result};

/// A parsed query. Words borrow from the raw query text.
///
/// Sequential parsing yields sorted, de-duplicated words. Parallel parsing
/// keeps them in query order with repeats; callers that need set semantics
/// call [`Query::dedup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus_words: Vec<&'q str>,
    pub minus_words: Vec<&'q str>,
}

impl<'q> Query<'q> {
    pub fn dedup(&mut self) {
        dedup_words(&mut self.plus_words);
        dedup_words(&mut self.minus_words);
    }

    pub fn is_empty(&self) -> bool {
        self.plus_words.is_empty() && self.minus_words.is_empty()
    }
}

fn dedup_words(words: &mut Vec<&str>) {
    words.sort_unstable();
    words.dedup();
}

#[derive(Debug, PartialEq, Eq)]
enum QueryWord<'q> {
    Plus(&'q str),
    Minus(&'q str),
    Stop,
}

fn parse_query_word<'q>(token: &'q str, stop_words: &StopWords) -> Result<QueryWord<'q>> {
    let (word, is_minus) = match token.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (token, false),
    };
    if word.is_empty() || word.starts_with('-') {
        return Err(Error::InvalidQueryToken(token.to_string()));
    }
    if !is_valid_word(word) {
        return Err(Error::InvalidWord(word.to_string()));
    }
    Ok(if stop_words.contains(word) {
        QueryWord::Stop
    } else if is_minus {
        QueryWord::Minus(word)
    } else {
        QueryWord::Plus(word)
    })
}

/// Classify every token of `text` as a plus, minus or stop word.
/// The first malformed token aborts the whole parse.
pub fn parse_query<'q>(text: &'q str, stop_words: &StopWords, mode: ExecutionMode) -> Result<Query<'q>> {
    let mut query = Query::default();
    for token in split_into_words(text) {
        match parse_query_word(token, stop_words)? {
            QueryWord::Plus(word) => query.plus_words.push(word),
            QueryWord::Minus(word) => query.minus_words.push(word),
            QueryWord::Stop => {}
        }
    }
    if mode == ExecutionMode::Sequential {
        query.dedup();
    }
    Ok(query)
}
