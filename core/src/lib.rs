//! In-memory TF-IDF document search.
//!
//! [`SearchServer`] owns the inverted index. Ranking, matching, duplicate removal,
//! the sliding request window and batch querying are layered on top of it.

pub mod batch;
pub mod concurrent_map;
pub mod dedup;
pub mod document;
pub mod error;
pub mod index;
pub mod ingest;
pub mod policy;
pub mod query;
pub mod request_queue;
pub mod search;
pub mod timing;
pub mod tokenizer;

pub use batch::{process_queries, process_queries_joined};
pub use concurrent_map::ConcurrentMap;
pub use dedup::remove_duplicates;
pub use document::{Document, DocumentId, DocumentStatus};
pub use error::{ErrorKind, Result, SearchError};
pub use index::SearchServer;
pub use policy::ExecutionPolicy;
pub use request_queue::{RequestQueue, RequestWindow};
pub use search::DocumentFilter;
pub use timing::LogDuration;

/// Upper bound on the number of documents a ranked query returns.
pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;

/// Relevances closer than this are treated as equal when sorting.
pub const RELEVANCE_EPSILON: f64 = 1e-6;

/// Number of requests the request log remembers (one per minute of a day).
pub const REQUEST_WINDOW: usize = 1440;
