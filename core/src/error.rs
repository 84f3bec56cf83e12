//! Error types for search-core.

use crate::DocumentId;
use thiserror::Error;

/// Broad classification of a [`SearchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an argument the engine cannot accept.
    InvalidArgument,
    /// The caller referred to a document that is not indexed.
    OutOfRange,
}

/// Errors reported by the engine and its wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// Document ids must be non-negative.
    #[error("invalid document id {0}")]
    NegativeDocumentId(DocumentId),
    /// A document with this id is already indexed.
    #[error("document {0} is already indexed")]
    DuplicateDocumentId(DocumentId),
    /// A word (or the whole query) contains a control character.
    #[error("word {0:?} contains control characters")]
    InvalidWord(String),
    /// A stop word contains a control character.
    #[error("stop word {0:?} contains control characters")]
    InvalidStopWord(String),
    /// A bare `-` or a word starting with `--`.
    #[error("malformed minus word {0:?}")]
    MalformedMinusWord(String),
    /// A query word was empty.
    #[error("query word is empty")]
    EmptyQueryWord,
    /// MatchDocument was asked about an id that is not indexed.
    #[error("no document with id {0}")]
    DocumentNotFound(DocumentId),
}

impl SearchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::DocumentNotFound(_) => ErrorKind::OutOfRange,
            _ => ErrorKind::InvalidArgument,
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
