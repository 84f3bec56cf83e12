//! Ranking (`find_top_documents*`) and the match/explain operation.

use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use crate::concurrent_map::ConcurrentMap;
use crate::document::{Document, DocumentId, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::{Posting, SearchServer};
use crate::policy::ExecutionPolicy;
use crate::query::Query;
use crate::tokenizer::is_valid_word;
use crate::{MAX_RESULT_DOCUMENT_COUNT, RELEVANCE_EPSILON};

/// Decides which documents may be ranked.
pub trait DocumentFilter: Sync {
    fn accept(&self, document_id: DocumentId, status: DocumentStatus, rating: i32) -> bool;
}

impl<F> DocumentFilter for F
where
    F: Fn(DocumentId, DocumentStatus, i32) -> bool + Sync,
{
    fn accept(&self, document_id: DocumentId, status: DocumentStatus, rating: i32) -> bool {
        self(document_id, status, rating)
    }
}

impl DocumentFilter for DocumentStatus {
    fn accept(&self, _: DocumentId, status: DocumentStatus, _: i32) -> bool {
        status == *self
    }
}

impl SearchServer {
    /// Top documents with status ACTUAL, evaluated sequentially.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, status)
    }

    /// Rank documents accepted by `filter` against `raw_query`.
    ///
    /// At most [`MAX_RESULT_DOCUMENT_COUNT`] documents come back, by descending relevance;
    /// relevances within [`RELEVANCE_EPSILON`] are ordered by descending rating. The
    /// output does not depend on `policy`.
    pub fn find_top_documents_with<P: DocumentFilter>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: P,
    ) -> Result<Vec<Document>> {
        if !is_valid_word(raw_query) {
            return Err(SearchError::InvalidWord(raw_query.to_string()));
        }
        let query = self.parse_query(raw_query)?;
        let relevance = match policy {
            ExecutionPolicy::Sequential => self.find_all_documents(&query, &filter),
            ExecutionPolicy::Parallel { .. } => self.find_all_documents_parallel(&query, &filter, policy.workers()),
        };

        let mut matched: Vec<Document> = relevance
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.documents.get(&id).map(|data| Document::new(id, relevance, data.rating))
            })
            .collect();
        let total = matched.len();
        sort_by_relevance(&mut matched);
        matched.truncate(MAX_RESULT_DOCUMENT_COUNT);
        debug!(query = raw_query, total, returned = matched.len(), parallel = policy.is_parallel(), "ranked query");
        Ok(matched)
    }

    fn find_all_documents<P: DocumentFilter>(&self, query: &Query<'_>, filter: &P) -> BTreeMap<DocumentId, f64> {
        let mut document_to_relevance: BTreeMap<DocumentId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(posting) = self.posting(word) else { continue };
            let idf = self.inverse_document_freq(posting);
            for (&id, &term_freq) in posting {
                if self.accepts(filter, id) {
                    *document_to_relevance.entry(id).or_insert(0.0) += term_freq * idf;
                }
            }
        }
        for word in &query.minus_words {
            let Some(posting) = self.posting(word) else { continue };
            for id in posting.keys() {
                document_to_relevance.remove(id);
            }
        }
        document_to_relevance
    }

    /// One task per accumulator shard. Each task walks the plus words in query order and
    /// scores only the documents its shard owns, so every document receives its
    /// contributions in the same order as the sequential path.
    fn find_all_documents_parallel<P: DocumentFilter>(
        &self,
        query: &Query<'_>,
        filter: &P,
        workers: usize,
    ) -> BTreeMap<DocumentId, f64> {
        let document_to_relevance: ConcurrentMap<DocumentId, f64> = ConcurrentMap::new(workers);
        let postings: Vec<(&Posting, f64)> = query
            .plus_words
            .iter()
            .filter_map(|word| self.posting(word))
            .map(|posting| (posting, self.inverse_document_freq(posting)))
            .collect();

        (0..document_to_relevance.shard_count()).into_par_iter().for_each(|shard| {
            for (posting, idf) in &postings {
                for (&id, &term_freq) in posting.iter() {
                    if document_to_relevance.shard_of(&id) == shard && self.accepts(filter, id) {
                        *document_to_relevance.entry(id) += term_freq * idf;
                    }
                }
            }
        });

        query.minus_words.par_iter().for_each(|word| {
            if let Some(posting) = self.posting(word) {
                for id in posting.keys() {
                    document_to_relevance.erase(id);
                }
            }
        });

        document_to_relevance.build_ordinary_map()
    }

    fn accepts<P: DocumentFilter>(&self, filter: &P, id: DocumentId) -> bool {
        self.documents
            .get(&id)
            .is_some_and(|data| filter.accept(id, data.status, data.rating))
    }

    pub fn match_document(&self, raw_query: &str, document_id: DocumentId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, document_id)
    }

    /// Plus words of the query found in the document, sorted, plus the document status.
    ///
    /// A minus word present in the document empties the word list.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        document_id: DocumentId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let (Some(word_freqs), Some(data)) =
            (self.document_to_word_freqs.get(&document_id), self.documents.get(&document_id))
        else {
            return Err(SearchError::DocumentNotFound(document_id));
        };
        let status = data.status;
        let term_in_document = |word: &str| {
            self.terms.get(word).filter(|id| word_freqs.contains_key(id))
        };

        match policy {
            ExecutionPolicy::Sequential => {
                let query = self.parse_query_sorted(raw_query)?;
                if query.minus_words.iter().any(|w| term_in_document(*w).is_some()) {
                    return Ok((Vec::new(), status));
                }
                let matched = query
                    .plus_words
                    .iter()
                    .filter_map(|w| term_in_document(*w))
                    .map(|id| self.terms.resolve(id))
                    .collect();
                Ok((matched, status))
            }
            ExecutionPolicy::Parallel { .. } => {
                let query = self.parse_query(raw_query)?;
                if query.minus_words.par_iter().any(|w| term_in_document(*w).is_some()) {
                    return Ok((Vec::new(), status));
                }
                let mut matched: Vec<&str> = query
                    .plus_words
                    .par_iter()
                    .filter_map(|w| term_in_document(*w))
                    .map(|id| self.terms.resolve(id))
                    .collect();
                matched.sort_unstable();
                matched.dedup();
                Ok((matched, status))
            }
        }
    }
}

/// Descending relevance; a run of relevances each within [`RELEVANCE_EPSILON`] of its
/// neighbour counts as one tie and is ordered by descending rating.
///
/// Ties chain: with relevances `1.0`, `1.0 - 0.9e-6` and `1.0 - 1.8e-6` all three form one
/// tie even though the outer pair differs by more than the epsilon, so the highest rating
/// comes first.
pub(crate) fn sort_by_relevance(documents: &mut [Document]) {
    documents.sort_by(|lhs, rhs| rhs.relevance.total_cmp(&lhs.relevance));
    let mut start = 0;
    while start < documents.len() {
        let mut end = start + 1;
        while end < documents.len()
            && documents[end - 1].relevance - documents[end].relevance < RELEVANCE_EPSILON
        {
            end += 1;
        }
        documents[start..end].sort_by(|lhs, rhs| rhs.rating.cmp(&lhs.rating));
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> SearchServer {
        let mut server = SearchServer::from_stop_words_text("and in on").unwrap();
        server.add_document(0, "white cat and fancy collar", DocumentStatus::Actual, &[8, -3]).unwrap();
        server.add_document(1, "fluffy cat fluffy tail", DocumentStatus::Actual, &[7, 2, 7]).unwrap();
        server.add_document(2, "groomed dog expressive eyes", DocumentStatus::Actual, &[5, -12, 2, 1]).unwrap();
        server.add_document(3, "groomed starling eugene", DocumentStatus::Banned, &[9]).unwrap();
        server
    }

    #[test]
    fn ranks_by_tf_idf() {
        let server = server();
        let found = server.find_top_documents("fluffy groomed cat").unwrap();
        let ids: Vec<_> = found.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
        let expected = 0.5 * (4.0f64).ln() + 0.25 * (2.0f64).ln();
        assert!((found[0].relevance - expected).abs() < 1e-12);
        assert_eq!(found[0].rating, 5);
    }

    #[test]
    fn status_and_predicate_filters() {
        let server = server();
        let banned = server.find_top_documents_by_status("groomed", DocumentStatus::Banned).unwrap();
        assert_eq!(banned.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3]);
        let even = server
            .find_top_documents_with(ExecutionPolicy::Sequential, "cat groomed", |id: DocumentId, _: DocumentStatus, _: i32| id % 2 == 0)
            .unwrap();
        assert_eq!(even.iter().map(|d| d.id).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn minus_words_exclude_regardless_of_filter() {
        let server = server();
        let found = server.find_top_documents("cat -tail").unwrap();
        assert_eq!(found.iter().map(|d| d.id).collect::<Vec<_>>(), vec![0]);
        let none = server.find_top_documents("cat -cat").unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn rejects_control_characters_in_query() {
        assert!(server().find_top_documents("cat\ndog").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let server = server();
        for query in ["fluffy groomed cat", "cat -collar", "eyes dog tail fluffy", "missing"] {
            let seq = server.find_top_documents_with(ExecutionPolicy::Sequential, query, |_: DocumentId, _: DocumentStatus, _: i32| true).unwrap();
            for workers in [1, 2, 3, 8] {
                let par = server
                    .find_top_documents_with(ExecutionPolicy::Parallel { workers }, query, |_: DocumentId, _: DocumentStatus, _: i32| true)
                    .unwrap();
                assert_eq!(seq, par, "query {query:?} with {workers} workers");
            }
        }
    }

    #[test]
    fn match_reports_plus_words_and_status() {
        let server = server();
        let (words, status) = server.match_document("tail fluffy cat dog", 1).unwrap();
        assert_eq!(words, vec!["cat", "fluffy", "tail"]);
        assert_eq!(status, DocumentStatus::Actual);
        let (words, status) = server.match_document("fluffy -tail", 1).unwrap();
        assert!(words.is_empty());
        assert_eq!(status, DocumentStatus::Actual);
        let (par, _) = server
            .match_document_with(ExecutionPolicy::parallel(), "tail fluffy cat dog fluffy", 1)
            .unwrap();
        assert_eq!(par, vec!["cat", "fluffy", "tail"]);
    }

    #[test]
    fn parallel_match_honours_minus_words() {
        let server = server();
        let seq = server.match_document_with(ExecutionPolicy::Sequential, "fluffy -tail", 1).unwrap();
        let par = server.match_document_with(ExecutionPolicy::parallel(), "fluffy -tail", 1).unwrap();
        assert_eq!(par, (Vec::<&str>::new(), DocumentStatus::Actual));
        assert_eq!(par, seq);
        let (words, status) = server
            .match_document_with(ExecutionPolicy::Parallel { workers: 2 }, "cat -collar", 0)
            .unwrap();
        assert!(words.is_empty());
        assert_eq!(status, DocumentStatus::Actual);
    }

    #[test]
    fn match_unknown_document_is_out_of_range() {
        let server = server();
        assert_eq!(server.match_document("cat", 42).unwrap_err(), SearchError::DocumentNotFound(42));
        assert_eq!(
            server.match_document("cat", -1).unwrap_err().kind(),
            crate::error::ErrorKind::OutOfRange
        );
    }

    #[test]
    fn ties_break_on_rating() {
        let mut docs = vec![
            Document::new(1, 0.5, 1),
            Document::new(2, 0.9, 0),
            Document::new(3, 0.5 + 1e-8, 7),
            Document::new(4, 0.1, 9),
        ];
        sort_by_relevance(&mut docs);
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![2, 3, 1, 4]);
    }

    #[test]
    fn chained_ties_form_one_group() {
        let mut docs = vec![
            Document::new(1, 1.0, 0),
            Document::new(2, 1.0 - 0.9e-6, 5),
            Document::new(3, 1.0 - 1.8e-6, 10),
        ];
        sort_by_relevance(&mut docs);
        assert_eq!(docs.iter().map(|d| d.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
