//! Sliding-window statistics over search requests.

use crate::{DocId, Document, InvertedIndex, Result, Status};
use std::collections::VecDeque;
use std::ops::Deref;

/// One slot per minute of a day.
pub const MINUTES_IN_DAY: usize = 1440;

/// Wraps an index and counts, over the last `capacity` requests, how many
/// returned no documents.
///
/// `I` is any shared handle to the index (`&InvertedIndex`,
/// `Arc<InvertedIndex>`). The window only reads through it; adding or removing
/// documents requires exclusive access to the index, so it cannot race with
/// requests issued here.
#[derive(Debug, Clone)]
pub struct RequestStats<I> {
    index: I,
    window: VecDeque<bool>,
    capacity: usize,
    empty_requests: usize,
}

impl<I> RequestStats<I>
where
    I: Deref<Target = InvertedIndex>,
{
    pub fn new(index: I) -> Self {
        Self::with_capacity(index, MINUTES_IN_DAY)
    }

    /// A zero capacity is bumped to one.
    pub fn with_capacity(index: I, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            index,
            window: VecDeque::with_capacity(capacity),
            capacity,
            empty_requests: 0,
        }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let found = self.index.find_top_documents(raw_query)?;
        self.record_request(found.is_empty());
        Ok(found)
    }

    pub fn add_find_request_by_status(&mut self, raw_query: &str, status: Status) -> Result<Vec<Document>> {
        let found = self.index.find_top_documents_by_status(raw_query, status)?;
        self.record_request(found.is_empty());
        Ok(found)
    }

    pub fn add_find_request_with<P>(&mut self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, Status, i32) -> bool + Sync,
    {
        let found = self.index.find_top_documents_by(raw_query, predicate)?;
        self.record_request(found.is_empty());
        Ok(found)
    }

    /// Push one request outcome, evicting the oldest once the window is full.
    pub fn record_request(&mut self, was_empty: bool) {
        if self.window.len() == self.capacity && self.window.pop_front() == Some(true) {
            self.empty_requests -= 1;
        }
        self.window.push_back(was_empty);
        if was_empty {
            self.empty_requests += 1;
        }
    }

    pub fn empty_count(&self) -> usize {
        self.empty_requests
    }

    /// Requests currently in the window.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn index() -> InvertedIndex {
        let mut idx = InvertedIndex::from_stop_words_text("and in at").unwrap();
        idx.add(1, "curly cat curly tail", Status::Active, &[7, 2, 7]).unwrap();
        idx.add(2, "curly dog and fancy collar", Status::Active, &[1, 2, 3]).unwrap();
        idx.add(3, "big cat fancy collar ", Status::Active, &[1, 2, 8]).unwrap();
        idx.add(4, "big dog sparrow Eugene", Status::Active, &[1, 3, 2]).unwrap();
        idx.add(5, "big dog sparrow Vasiliy", Status::Active, &[1, 1, 1]).unwrap();
        idx
    }

    #[test]
    fn counts_empty_requests_over_a_day() {
        let idx = index();
        let mut stats = RequestStats::new(&idx);
        for _ in 0..1439 {
            assert!(stats.add_find_request("empty request").unwrap().is_empty());
        }
        assert_eq!(stats.empty_count(), 1439);
        // still 1439 empty: the window just filled up
        assert_eq!(stats.add_find_request("curly dog").unwrap().len(), 4);
        assert_eq!(stats.empty_count(), 1439);
        assert_eq!(stats.len(), MINUTES_IN_DAY);
        // the first empty request is evicted
        stats.add_find_request("big collar").unwrap();
        assert_eq!(stats.empty_count(), 1438);
        stats.add_find_request("sparrow").unwrap();
        assert_eq!(stats.empty_count(), 1437);
    }

    #[test]
    fn full_window_of_empty_requests() {
        let idx = index();
        let mut stats = RequestStats::new(&idx);
        for _ in 0..MINUTES_IN_DAY {
            stats.record_request(true);
        }
        assert_eq!(stats.empty_count(), 1440);
        stats.record_request(false);
        assert_eq!(stats.empty_count(), 1439);
        stats.record_request(true);
        assert_eq!(stats.empty_count(), 1439);
        stats.record_request(false);
        assert_eq!(stats.empty_count(), 1438);
        assert_eq!(stats.len(), MINUTES_IN_DAY);
    }

    #[test]
    fn non_empty_requests_never_count() {
        let mut stats = RequestStats::with_capacity(Arc::new(index()), 3);
        for _ in 0..10 {
            stats.record_request(false);
        }
        assert_eq!(stats.empty_count(), 0);
        stats.record_request(true);
        stats.record_request(true);
        stats.record_request(false);
        assert_eq!(stats.empty_count(), 2);
        stats.record_request(false);
        stats.record_request(false);
        assert_eq!(stats.empty_count(), 0);
        assert_eq!(stats.len(), 3);
        assert_eq!(stats.capacity(), 3);
        assert_eq!(stats.index().document_count(), 5);
    }

    #[test]
    fn status_and_predicate_requests_are_recorded() {
        let idx = index();
        let mut stats = RequestStats::with_capacity(&idx, 10);
        assert!(stats.add_find_request_by_status("curly", Status::Banned).unwrap().is_empty());
        let found = stats.add_find_request_with("curly", |id, _, _| id == 1).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(stats.empty_count(), 1);
        assert_eq!(stats.len(), 2);
    }

    #[test]
    fn failed_request_is_not_recorded() {
        let idx = index();
        let mut stats = RequestStats::new(&idx);
        assert!(stats.add_find_request("cat -").is_err());
        assert!(stats.is_empty());
        assert_eq!(stats.empty_count(), 0);
    }
}
