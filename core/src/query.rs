//! Query parsing: plus words, minus words, stop words.

use crate::error::{Result, SearchError};
use crate::index::SearchServer;
use crate::tokenizer::{is_valid_word, split_into_words};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWord<'q> {
    pub data: &'q str,
    pub is_minus: bool,
    pub is_stop: bool,
}

/// A parsed query. Both lists are free of stop words and duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus_words: Vec<&'q str>,
    pub minus_words: Vec<&'q str>,
}

impl SearchServer {
    pub fn parse_query_word<'q>(&self, text: &'q str) -> Result<QueryWord<'q>> {
        if text.is_empty() {
            return Err(SearchError::EmptyQueryWord);
        }
        let (word, is_minus) = match text.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (text, false),
        };
        if word.is_empty() || word.starts_with('-') {
            return Err(SearchError::MalformedMinusWord(text.to_string()));
        }
        if !is_valid_word(word) {
            return Err(SearchError::InvalidWord(text.to_string()));
        }
        Ok(QueryWord { data: word, is_minus, is_stop: self.is_stop_word(word) })
    }

    /// Parse a query, keeping each word's first position.
    pub fn parse_query<'q>(&self, text: &'q str) -> Result<Query<'q>> {
        let mut query = Query::default();
        for token in split_into_words(text) {
            let word = self.parse_query_word(token)?;
            if word.is_stop {
                continue;
            }
            let list = if word.is_minus { &mut query.minus_words } else { &mut query.plus_words };
            if !list.contains(&word.data) {
                list.push(word.data);
            }
        }
        Ok(query)
    }

    /// Parse a query with both word lists sorted.
    pub fn parse_query_sorted<'q>(&self, text: &'q str) -> Result<Query<'q>> {
        let mut query = self.parse_query(text)?;
        query.plus_words.sort_unstable();
        query.minus_words.sort_unstable();
        Ok(query)
    }
}
