use std::collections::{BTreeSet, HashSet};
use tracing::info;

use crate::document::DocumentId;
use crate::index::SearchServer;

/// Remove every document whose set of words equals that of a lower-id document.
///
/// Frequencies, ratings and statuses are ignored. Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocumentId> {
    let mut duplicates = Vec::new();
    {
        let mut seen: HashSet<BTreeSet<&str>> = HashSet::new();
        for document_id in server.iter() {
            let words = server.word_frequencies(document_id).into_keys().collect();
            if !seen.insert(words) {
                duplicates.push(document_id);
            }
        }
    }

    for &document_id in &duplicates {
        info!(document_id, "found duplicate document");
        server.remove_document(document_id);
    }
    duplicates
}
