//! Sliding window over the most recent ranked requests.

use std::collections::VecDeque;

use crate::document::{Document, DocumentStatus};
use crate::error::Result;
use crate::index::SearchServer;
use crate::policy::ExecutionPolicy;
use crate::search::DocumentFilter;
use crate::REQUEST_WINDOW;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub request_text: String,
    pub results_found_count: usize,
}

/// The bookkeeping half of [`RequestQueue`]: remembers the last `window` requests and
/// keeps a running count of those that found nothing.
#[derive(Debug, Clone)]
pub struct RequestWindow {
    requests: VecDeque<QueryResult>,
    no_result_requests: usize,
    time: u64,
    window: usize,
}

impl Default for RequestWindow {
    fn default() -> Self {
        Self::new(REQUEST_WINDOW)
    }
}

impl RequestWindow {
    pub fn new(window: usize) -> Self {
        Self { requests: VecDeque::with_capacity(window.min(REQUEST_WINDOW)), no_result_requests: 0, time: 0, window }
    }

    /// Advance the clock by one tick and record a request. A zero-sized window keeps nothing.
    pub fn record(&mut self, request_text: &str, results_found_count: usize) {
        self.time += 1;
        if self.window == 0 {
            return;
        }
        if self.time > self.window as u64 {
            if let Some(oldest) = self.requests.pop_front() {
                if oldest.results_found_count == 0 {
                    self.no_result_requests -= 1;
                }
            }
        }
        if results_found_count == 0 {
            self.no_result_requests += 1;
        }
        self.requests.push_back(QueryResult { request_text: request_text.to_string(), results_found_count });
    }

    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Ticks elapsed since creation.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn requests(&self) -> impl Iterator<Item = &QueryResult> {
        self.requests.iter()
    }
}

/// Forwards ranked queries to a [`SearchServer`] and logs them in a [`RequestWindow`].
///
/// A request that fails is not recorded and does not advance the clock.
pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    window: RequestWindow,
}

impl<'a> RequestQueue<'a> {
    pub fn new(server: &'a SearchServer) -> Self {
        Self::with_window(server, REQUEST_WINDOW)
    }

    pub fn with_window(server: &'a SearchServer, window: usize) -> Self {
        Self { server, window: RequestWindow::new(window) }
    }

    pub fn add_find_request_with<P: DocumentFilter>(&mut self, raw_query: &str, filter: P) -> Result<Vec<Document>> {
        let result = self.server.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, filter)?;
        self.window.record(raw_query, result.len());
        Ok(result)
    }

    pub fn add_find_request_by_status(&mut self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.add_find_request_with(raw_query, status)
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        self.add_find_request_with(raw_query, DocumentStatus::Actual)
    }

    pub fn no_result_requests(&self) -> usize {
        self.window.no_result_requests()
    }

    pub fn window(&self) -> &RequestWindow {
        &self.window
    }
}
