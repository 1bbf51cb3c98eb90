use crate::accumulator::ConcurrentMap;
use crate::query::{parse_query, Query};
use crate::{DocId, Document, Error, ExecutionMode, InvertedIndex, Result, Status};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

impl InvertedIndex {
    /// Top documents with [`Status::Active`], ranked sequentially.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status(raw_query, Status::Active)
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: Status) -> Result<Vec<Document>> {
        self.find_top_documents_by(raw_query, move |_, doc_status, _| doc_status == status)
    }

    pub fn find_top_documents_by<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, Status, i32) -> bool + Sync,
    {
        self.find_top_documents_with(ExecutionMode::Sequential, raw_query, predicate)
    }

    /// Rank documents by TF-IDF relevance.
    ///
    /// Plus words add `tf * idf` for every document accepted by `predicate`;
    /// a document holding any minus word is dropped whatever the predicate
    /// says. Hits are ordered by relevance descending, near-equal relevance
    /// (within `relevance_epsilon`) by rating descending, and cut to
    /// `max_results`. Both modes return the same hits in the same order.
    pub fn find_top_documents_with<P>(&self, mode: ExecutionMode, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, Status, i32) -> bool + Sync,
    {
        // repeated plus words must not add relevance twice, so both modes
        // rank against a de-duplicated query
        let query = parse_query(raw_query, &self.stop_words, ExecutionMode::Sequential)?;
        let mut matched = match mode {
            ExecutionMode::Sequential => self.find_all_documents(&query, &predicate),
            ExecutionMode::Parallel => self.par_find_all_documents(&query, &predicate),
        };
        sort_by_rank(&mut matched, self.options.relevance_epsilon, mode);
        matched.truncate(self.options.max_results);
        Ok(matched)
    }

    fn find_all_documents<P>(&self, query: &Query<'_>, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, Status, i32) -> bool,
    {
        let mut relevance: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(term) = self.live_term(word) else { continue };
            let idf = self.inverse_document_freq(term);
            for (&id, &tf) in &self.postings[term as usize] {
                let Some(meta) = self.docs.get(&id) else { continue };
                if predicate(id, meta.status, meta.rating) {
                    *relevance.entry(id).or_insert(0.0) += tf * idf;
                }
            }
        }

        for word in &query.minus_words {
            let Some(term) = self.live_term(word) else { continue };
            for id in self.postings[term as usize].keys() {
                relevance.remove(id);
            }
        }

        relevance
            .into_iter()
            .filter_map(|(id, rel)| self.docs.get(&id).map(|meta| Document::new(id, rel, meta.rating)))
            .collect()
    }

    fn par_find_all_documents<P>(&self, query: &Query<'_>, predicate: &P) -> Vec<Document>
    where
        P: Fn(DocId, Status, i32) -> bool + Sync,
    {
        let accumulator: ConcurrentMap<DocId, f64> = ConcurrentMap::new(self.options.accumulator_shards);
        query.plus_words.par_iter().for_each(|word| {
            let Some(term) = self.live_term(word) else { return };
            let idf = self.inverse_document_freq(term);
            for (&id, &tf) in &self.postings[term as usize] {
                let Some(meta) = self.docs.get(&id) else { continue };
                if predicate(id, meta.status, meta.rating) {
                    accumulator.increment(id, tf * idf);
                }
            }
        });
        let mut relevance = accumulator.into_ordinary_map();

        let excluded: Vec<DocId> = query
            .minus_words
            .par_iter()
            .filter_map(|word| self.live_term(word))
            .flat_map_iter(|term| self.postings[term as usize].keys().copied())
            .collect();
        for id in excluded {
            relevance.remove(&id);
        }

        relevance
            .into_par_iter()
            .filter_map(|(id, rel)| self.docs.get(&id).map(|meta| Document::new(id, rel, meta.rating)))
            .collect()
    }

    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<(Vec<&str>, Status)> {
        self.match_document_with(ExecutionMode::Sequential, raw_query, id)
    }

    /// Plus words of the query found in document `id`, sorted and unique, or
    /// nothing at all when the document holds a minus word.
    ///
    /// Unlike ranking, a query without plus words is an error here.
    pub fn match_document_with(&self, mode: ExecutionMode, raw_query: &str, id: DocId) -> Result<(Vec<&str>, Status)> {
        let query = parse_query(raw_query, &self.stop_words, mode)?;
        if query.plus_words.is_empty() {
            return Err(Error::EmptyPlusWords);
        }
        let (Some(terms), Some(meta)) = (self.doc_terms.get(&id), self.docs.get(&id)) else {
            return Err(Error::UnknownDocumentId(id));
        };

        // resolve to the index's own copy of the word
        let in_document = |word: &&str| -> Option<&str> {
            let (interned, term) = self.dictionary.get_key_value(*word)?;
            terms.contains_key(term).then_some(&**interned)
        };

        let matched = match mode {
            ExecutionMode::Sequential => {
                if query.minus_words.iter().any(|w| in_document(w).is_some()) {
                    Vec::new()
                } else {
                    query.plus_words.iter().filter_map(in_document).collect()
                }
            }
            ExecutionMode::Parallel => {
                if query.minus_words.par_iter().any(|w| in_document(w).is_some()) {
                    Vec::new()
                } else {
                    let mut words: Vec<&str> = query.plus_words.par_iter().filter_map(in_document).collect();
                    words.par_sort_unstable();
                    words.dedup();
                    words
                }
            }
        };
        Ok((matched, meta.status))
    }
}

/// Relevance descending, then neighbours within `epsilon` of each other
/// re-ordered by rating descending and id ascending. The second pass is an
/// insertion sort that only moves a hit past near-tied neighbours, so no
/// comparator has to be a total order over epsilon.
fn sort_by_rank(docs: &mut [Document], epsilon: f64, mode: ExecutionMode) {
    let by_relevance = |a: &Document, b: &Document| -> Ordering {
        b.relevance.total_cmp(&a.relevance).then_with(|| a.id.cmp(&b.id))
    };
    match mode {
        ExecutionMode::Sequential => docs.sort_unstable_by(by_relevance),
        ExecutionMode::Parallel => docs.par_sort_unstable_by(by_relevance),
    }

    let outranks = |a: &Document, b: &Document| {
        (a.relevance - b.relevance).abs() < epsilon && (b.rating, a.id) < (a.rating, b.id)
    };
    for i in 1..docs.len() {
        let mut j = i;
        while j > 0 && outranks(&docs[j], &docs[j - 1]) {
            docs.swap(j, j - 1);
            j -= 1;
        }
    }
}
