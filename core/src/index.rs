use crate::tokenizer::{is_valid_word, split_into_words, StopWords};
use crate::{DocId, Error, ExecutionMode, Result, SearchOptions, Status, TermId};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Per-document metadata. Created on add, dropped on remove, never updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocMeta {
    pub rating: i32,
    pub status: Status,
}

/// Truncating mean of the ratings; 0 when there are none.
pub fn compute_average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}

/// Inverted index and document store.
///
/// Every indexed word is interned once in `dictionary`/`terms`; postings in
/// both directions and the word-set groups refer to it by [`TermId`].
/// Words are never evicted from the dictionary: a term whose postings became
/// empty behaves exactly like an unknown word.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    pub(crate) stop_words: StopWords,
    pub(crate) options: SearchOptions,
    pub(crate) dictionary: HashMap<Box<str>, TermId>,
    pub(crate) terms: Vec<Box<str>>,
    /// term -> doc -> term frequency, indexed by `TermId`
    pub(crate) postings: Vec<BTreeMap<DocId, f64>>,
    /// doc -> term -> term frequency
    pub(crate) doc_terms: BTreeMap<DocId, BTreeMap<TermId, f64>>,
    pub(crate) docs: BTreeMap<DocId, DocMeta>,
    /// sorted distinct terms -> docs with exactly that word set
    pub(crate) word_sets: HashMap<Vec<TermId>, BTreeSet<DocId>>,
}

impl InvertedIndex {
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::with_stop_words(StopWords::new(stop_words)?))
    }

    /// Stop words given as one space-separated string.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Ok(Self::with_stop_words(StopWords::from_text(text)?))
    }

    pub fn with_stop_words(stop_words: StopWords) -> Self {
        Self::with_options(stop_words, SearchOptions::default())
    }

    pub fn with_options(stop_words: StopWords, options: SearchOptions) -> Self {
        Self { stop_words, options, ..Self::default() }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn stop_words(&self) -> impl Iterator<Item = &str> {
        self.stop_words.iter()
    }

    /// Validate every word before dropping stop words so that a rejected
    /// document never touches the index.
    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(Error::InvalidWord(word.to_string()));
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }
        Ok(words)
    }

    fn intern(&mut self, word: &str) -> TermId {
        if let Some(&id) = self.dictionary.get(word) {
            return id;
        }
        let id = self.terms.len() as TermId;
        let word: Box<str> = Box::from(word);
        self.terms.push(word.clone());
        self.dictionary.insert(word, id);
        self.postings.push(BTreeMap::new());
        id
    }

    /// Index a document.
    ///
    /// A document that holds only stop words is accepted: it gets metadata,
    /// an id and a word-set group keyed by the empty set, but no postings.
    pub fn add(&mut self, id: DocId, text: &str, status: Status, ratings: &[i32]) -> Result<()> {
        if id < 0 || self.docs.contains_key(&id) {
            tracing::debug!(id, "rejected document id");
            return Err(Error::InvalidDocumentId(id));
        }
        let words = self.split_into_words_no_stop(text)?;

        let mut freqs: BTreeMap<TermId, f64> = BTreeMap::new();
        if !words.is_empty() {
            let inv_word_count = 1.0 / words.len() as f64;
            for word in &words {
                let term = self.intern(word);
                *freqs.entry(term).or_insert(0.0) += inv_word_count;
            }
        }
        for (&term, &tf) in &freqs {
            self.postings[term as usize].insert(id, tf);
        }
        self.word_sets.entry(freqs.keys().copied().collect()).or_default().insert(id);
        self.doc_terms.insert(id, freqs);
        self.docs.insert(id, DocMeta { rating: compute_average_rating(ratings), status });

        tracing::debug!(id, words = words.len(), ?status, "document added");
        Ok(())
    }

    pub fn remove(&mut self, id: DocId) -> Result<()> {
        self.remove_with(ExecutionMode::Sequential, id)
    }

    /// Remove a document from both posting directions, its word-set group and
    /// the document store. In parallel mode each of the document's terms is
    /// cleaned up on its own rayon task.
    pub fn remove_with(&mut self, mode: ExecutionMode, id: DocId) -> Result<()> {
        let freqs = self.doc_terms.remove(&id).ok_or(Error::UnknownDocumentId(id))?;
        let terms: Vec<TermId> = freqs.into_keys().collect();

        match mode {
            ExecutionMode::Sequential => {
                for &term in &terms {
                    self.postings[term as usize].remove(&id);
                }
            }
            ExecutionMode::Parallel => {
                disjoint_postings_mut(&mut self.postings, &terms)
                    .into_par_iter()
                    .for_each(|docs| {
                        docs.remove(&id);
                    });
            }
        }

        if let Some(group) = self.word_sets.get_mut(&terms) {
            group.remove(&id);
            if group.is_empty() {
                self.word_sets.remove(&terms);
            }
        }
        self.docs.remove(&id);

        tracing::debug!(id, terms = terms.len(), ?mode, "document removed");
        Ok(())
    }

    /// Every document sharing its distinct word set with a lower id.
    pub fn duplicates(&self) -> BTreeSet<DocId> {
        self.word_sets
            .values()
            .filter(|group| group.len() > 1)
            .flat_map(|group| group.iter().skip(1).copied())
            .collect()
    }

    /// Term frequencies of one document; empty for an unknown id.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> {
        self.doc_terms
            .get(&id)
            .map(|freqs| freqs.iter().map(|(&term, &tf)| (&*self.terms[term as usize], tf)).collect())
            .unwrap_or_default()
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.docs.contains_key(&id)
    }

    pub fn meta(&self, id: DocId) -> Option<DocMeta> {
        self.docs.get(&id).copied()
    }

    pub fn status(&self, id: DocId) -> Option<Status> {
        self.docs.get(&id).map(|meta| meta.status)
    }

    pub fn rating(&self, id: DocId) -> Option<i32> {
        self.docs.get(&id).map(|meta| meta.rating)
    }

    /// Live document ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.docs.keys().copied()
    }

    /// Term id of a word that currently has postings.
    pub(crate) fn live_term(&self, word: &str) -> Option<TermId> {
        self.dictionary
            .get(word)
            .copied()
            .filter(|&term| !self.postings[term as usize].is_empty())
    }

    /// `ln(N / df)`. The term must have postings.
    pub(crate) fn inverse_document_freq(&self, term: TermId) -> f64 {
        (self.docs.len() as f64 / self.postings[term as usize].len() as f64).ln()
    }

    /// IDF of a word, or `None` when no document contains it.
    pub fn inverse_document_frequency(&self, word: &str) -> Option<f64> {
        self.live_term(word).map(|term| self.inverse_document_freq(term))
    }
}

impl<'a> IntoIterator for &'a InvertedIndex {
    type Item = DocId;
    type IntoIter = std::iter::Copied<std::collections::btree_map::Keys<'a, DocId, DocMeta>>;

    fn into_iter(self) -> Self::IntoIter {
        self.docs.keys().copied()
    }
}

/// Borrow the postings of `terms` mutably all at once. `terms` must be sorted
/// ascending and free of repeats, which holds for keys of a `BTreeMap`.
fn disjoint_postings_mut<'p>(
    postings: &'p mut [BTreeMap<DocId, f64>],
    terms: &[TermId],
) -> Vec<&'p mut BTreeMap<DocId, f64>> {
    let mut out = Vec::with_capacity(terms.len());
    let mut rest = postings;
    let mut offset = 0usize;
    for &term in terms {
        let (_, tail) = std::mem::take(&mut rest).split_at_mut(term as usize - offset);
        if let Some((target, tail)) = tail.split_first_mut() {
            out.push(target);
            rest = tail;
        }
        offset = term as usize + 1;
    }
    out
}
