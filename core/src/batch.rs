//! Fan a list of queries out over the rayon pool.

use rayon::prelude::*;

use crate::document::Document;
use crate::error::Result;
use crate::index::SearchServer;
use crate::timing::LogDuration;

/// Rank every query with the default filter; one result list per query, in input order.
///
/// The first failing query aborts the batch.
pub fn process_queries<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Vec<Document>>>
where
    S: AsRef<str> + Sync,
{
    let _timer = LogDuration::new("process_queries");
    queries
        .par_iter()
        .map(|query| server.find_top_documents(query.as_ref()))
        .collect()
}

/// Like [`process_queries`], flattened into one sequence.
pub fn process_queries_joined<S>(server: &SearchServer, queries: &[S]) -> Result<Vec<Document>>
where
    S: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}
