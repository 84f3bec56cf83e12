//! The inverted index.
//!
//! Every distinct word is interned once in a [`TermArena`] and referred to by its
//! [`TermId`] from both lookup directions: word -> document -> frequency for ranking,
//! document -> word -> frequency for matching and duplicate detection.

use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

use crate::document::{compute_average_rating, DocumentData, DocumentId, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::policy::ExecutionPolicy;
use crate::tokenizer::{check_document_word, is_valid_word, make_unique_non_empty_strings, split_into_words};

pub type TermId = u32;

/// Documents containing one term, with the term's frequency in each.
pub(crate) type Posting = BTreeMap<DocumentId, f64>;

/// Interned words. Ids are dense and never reused.
#[derive(Debug, Default)]
pub(crate) struct TermArena {
    ids: HashMap<Arc<str>, TermId>,
    terms: Vec<Arc<str>>,
}

impl TermArena {
    fn intern(&mut self, word: &str) -> TermId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let id = self.terms.len() as TermId;
        let term: Arc<str> = Arc::from(word);
        self.terms.push(Arc::clone(&term));
        self.ids.insert(term, id);
        id
    }

    pub(crate) fn get(&self, word: &str) -> Option<TermId> {
        self.ids.get(word).copied()
    }

    pub(crate) fn resolve(&self, id: TermId) -> &str {
        &self.terms[id as usize]
    }

    fn len(&self) -> usize {
        self.terms.len()
    }
}

#[derive(Debug, Default)]
pub struct SearchServer {
    stop_words: BTreeSet<String>,
    pub(crate) terms: TermArena,
    /// Indexed by `TermId`. A term whose posting is empty is not in the index.
    pub(crate) word_to_document_freqs: Vec<Posting>,
    pub(crate) document_to_word_freqs: BTreeMap<DocumentId, BTreeMap<TermId, f64>>,
    pub(crate) documents: BTreeMap<DocumentId, DocumentData>,
    document_ids: BTreeSet<DocumentId>,
}

impl SearchServer {
    /// Build an engine from a collection of stop words. Empty strings are ignored.
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = make_unique_non_empty_strings(stop_words);
        if let Some(bad) = stop_words.iter().find(|w| !is_valid_word(w)) {
            return Err(SearchError::InvalidStopWord(bad.clone()));
        }
        Ok(Self { stop_words, ..Self::default() })
    }

    /// Build an engine from space-separated stop words.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn add_document(
        &mut self,
        document_id: DocumentId,
        document: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        if document_id < 0 {
            return Err(SearchError::NegativeDocumentId(document_id));
        }
        if self.documents.contains_key(&document_id) {
            return Err(SearchError::DuplicateDocumentId(document_id));
        }
        let words = self.split_into_words_no_stop(document)?;

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for &word in &words {
            *counts.entry(word).or_insert(0) += 1;
        }
        let total = words.len() as f64;
        let mut word_freqs = BTreeMap::new();
        for (word, count) in counts {
            let term_id = self.terms.intern(word);
            if self.word_to_document_freqs.len() < self.terms.len() {
                self.word_to_document_freqs.resize_with(self.terms.len(), Posting::new);
            }
            let freq = count as f64 / total;
            self.word_to_document_freqs[term_id as usize].insert(document_id, freq);
            word_freqs.insert(term_id, freq);
        }

        debug!(document_id, words = words.len(), distinct = word_freqs.len(), "indexed document");
        self.document_to_word_freqs.insert(document_id, word_freqs);
        self.documents.insert(
            document_id,
            DocumentData { rating: compute_average_rating(ratings), status },
        );
        self.document_ids.insert(document_id);
        Ok(())
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Term frequencies of one document; empty if the id is not indexed.
    pub fn word_frequencies(&self, document_id: DocumentId) -> BTreeMap<&str, f64> {
        self.document_to_word_freqs
            .get(&document_id)
            .map(|freqs| {
                freqs.iter().map(|(&id, &freq)| (self.terms.resolve(id), freq)).collect()
            })
            .unwrap_or_default()
    }

    pub fn remove_document(&mut self, document_id: DocumentId) {
        self.remove_document_with(ExecutionPolicy::Sequential, document_id);
    }

    /// Remove a document; unknown ids are ignored.
    ///
    /// In parallel mode each of the document's own terms is cleared by one task, so no
    /// two tasks ever touch the same posting.
    pub fn remove_document_with(&mut self, policy: ExecutionPolicy, document_id: DocumentId) {
        if self.documents.remove(&document_id).is_none() {
            return;
        }
        let word_freqs = self.document_to_word_freqs.remove(&document_id).unwrap_or_default();
        match policy {
            ExecutionPolicy::Sequential => {
                for term_id in word_freqs.keys() {
                    if let Some(posting) = self.word_to_document_freqs.get_mut(*term_id as usize) {
                        posting.remove(&document_id);
                    }
                }
            }
            ExecutionPolicy::Parallel { .. } => {
                disjoint_postings(&mut self.word_to_document_freqs, word_freqs.keys().copied())
                    .into_par_iter()
                    .for_each(|posting| {
                        posting.remove(&document_id);
                    });
            }
        }
        self.document_ids.remove(&document_id);
        debug!(document_id, terms = word_freqs.len(), "removed document");
    }

    /// Indexed ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.document_ids.iter().copied()
    }

    pub fn stop_words(&self) -> impl Iterator<Item = &str> {
        self.stop_words.iter().map(String::as_str)
    }

    pub(crate) fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// The posting of a word, if the word occurs in at least one document.
    pub(crate) fn posting(&self, word: &str) -> Option<&Posting> {
        let id = self.terms.get(word)?;
        self.word_to_document_freqs.get(id as usize).filter(|p| !p.is_empty())
    }

    pub(crate) fn inverse_document_freq(&self, posting: &Posting) -> f64 {
        (self.document_count() as f64 / posting.len() as f64).ln()
    }

    fn split_into_words_no_stop<'t>(&self, text: &'t str) -> Result<Vec<&'t str>> {
        let mut words = Vec::new();
        for word in split_into_words(text) {
            check_document_word(word)?;
            if !self.is_stop_word(word) {
                words.push(word);
            }
        }
        Ok(words)
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocumentId;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, DocumentId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids.iter().copied()
    }
}

/// Carve out one mutable posting per id. `ids` must be strictly ascending.
fn disjoint_postings<'a>(
    mut postings: &'a mut [Posting],
    ids: impl Iterator<Item = TermId>,
) -> Vec<&'a mut Posting> {
    let mut out = Vec::new();
    let mut base = 0usize;
    for id in ids {
        let index = id as usize;
        let rest = std::mem::take(&mut postings);
        let Some((posting, tail)) = rest.get_mut(index - base..).and_then(|s| s.split_first_mut())
        else {
            break;
        };
        out.push(posting);
        postings = tail;
        base = index + 1;
    }
    out
}
