use crate::DocId;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the index. None of them leave the index partially mutated.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Negative id, or an id that is already indexed.
    #[error("invalid document id: {0}")]
    InvalidDocumentId(DocId),
    #[error("unknown document id: {0}")]
    UnknownDocumentId(DocId),
    /// The word contains a control character.
    #[error("word {0:?} is invalid")]
    InvalidWord(String),
    /// A bare `-` or a doubled `--word` in a query.
    #[error("query word {0:?} is invalid")]
    InvalidQueryToken(String),
    #[error("query has no plus words")]
    EmptyPlusWords,
    #[error("stop word {0:?} is invalid")]
    InvalidStopWord(String),
}
