use crate::error::{Result, SearchError};
use std::collections::BTreeSet;

/// Split text into words on spaces. Runs of spaces never produce empty words.
///
/// Only the space character separates words; any other control character stays
/// inside its word so that validation can reject it.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|w| !w.is_empty()).collect()
}

/// A word is valid when it holds no characters below U+0020.
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| c < ' ')
}

/// A document word is rejected if it is a bare `-` or starts with `--`.
pub fn check_document_word(word: &str) -> Result<()> {
    if !is_valid_word(word) {
        return Err(SearchError::InvalidWord(word.to_string()));
    }
    if word == "-" || word.starts_with("--") {
        return Err(SearchError::MalformedMinusWord(word.to_string()));
    }
    Ok(())
}

/// Collect the non-empty strings of a container into an ordered, de-duplicated set.
pub fn make_unique_non_empty_strings<I, S>(strings: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    strings
        .into_iter()
        .filter(|s| !s.as_ref().is_empty())
        .map(|s| s.as_ref().to_string())
        .collect()
}
