//! In-memory document search: an inverted index with TF-IDF ranking, exact
//! document matching, duplicate detection and request statistics.
//!
//! Ranking and matching run either sequentially or data-parallel on the rayon
//! pool, selected with [`ExecutionMode`]. Structural mutation (`add`/`remove`)
//! takes `&mut self`, so it is always serialized with respect to readers; any
//! number of threads may rank against a shared `&InvertedIndex` or
//! `Arc<InvertedIndex>` at the same time.

pub mod accumulator;
pub mod batch;
pub mod dedup;
mod error;
pub mod index;
pub mod query;
mod search;
pub mod stats;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

pub use accumulator::ConcurrentMap;
pub use batch::{process_queries, process_queries_joined};
pub use dedup::remove_duplicates;
pub use error::{Error, Result};
pub use index::{compute_average_rating, DocMeta, InvertedIndex};
pub use stats::{RequestStats, MINUTES_IN_DAY};

pub type TermId = u32;
pub type DocId = i32;

/// Number of documents returned by a top-documents search.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
/// Relevance values closer than this are ranked by rating instead.
pub const RELEVANCE_EPSILON: f64 = 1e-6;
/// Shards used by the relevance accumulator in parallel ranking.
pub const DEFAULT_SHARD_COUNT: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Active,
    Irrelevant,
    Banned,
    Removed,
}

/// A single ranked hit. Produced per query, never stored in the index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl Document {
    pub fn new(id: DocId, relevance: f64, rating: i32) -> Self {
        Self { id, relevance, rating }
    }
}

/// How a ranking, matching or removal call spreads its work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOptions {
    pub max_results: usize,
    pub relevance_epsilon: f64,
    pub accumulator_shards: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULT_DOCUMENT_COUNT,
            relevance_epsilon: RELEVANCE_EPSILON,
            accumulator_shards: DEFAULT_SHARD_COUNT,
        }
    }
}
