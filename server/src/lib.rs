use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use parking_lot::{Mutex, RwLock};
use search_core::ingest::InputDocument;
use search_core::{
    process_queries, process_queries_joined, remove_duplicates, Document, DocumentId, DocumentStatus, ErrorKind,
    ExecutionPolicy, RequestWindow, SearchError, SearchServer,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Defaults to ACTUAL.
    #[serde(default)]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<Document>,
}

#[derive(Deserialize)]
pub struct MatchParams {
    pub q: String,
    pub doc_id: DocumentId,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize, Default)]
pub struct RemoveParams {
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<String>,
    #[serde(default)]
    pub joined: bool,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum BatchResponse {
    PerQuery(Vec<Vec<Document>>),
    Joined(Vec<Document>),
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub document_count: usize,
    pub no_result_requests: usize,
    pub window_len: usize,
}

/// The engine is mutated only under the write lock; every read holds the read lock.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<SearchServer>>,
    pub requests: Arc<Mutex<RequestWindow>>,
}

impl AppState {
    pub fn new(server: SearchServer, window: usize) -> Self {
        Self {
            engine: Arc::new(RwLock::new(server)),
            requests: Arc::new(Mutex::new(RequestWindow::new(window))),
        }
    }
}

pub struct ApiError(SearchError);

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::OutOfRange => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub fn build_app(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/match", get(match_handler))
        .route("/documents", post(add_document_handler))
        .route("/documents/:doc_id", delete(remove_document_handler))
        .route("/documents/:doc_id/words", get(words_handler))
        .route("/dedup", post(dedup_handler))
        .route("/batch", post(batch_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn policy(parallel: bool) -> ExecutionPolicy {
    if parallel {
        ExecutionPolicy::parallel()
    } else {
        ExecutionPolicy::Sequential
    }
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let status = params.status.unwrap_or_default();
    let results = state.engine.read().find_top_documents_with(policy(params.parallel), &params.q, status)?;
    state.requests.lock().record(&params.q, results.len());
    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, hits = results.len(), "search");
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), results }))
}

pub async fn match_handler(
    State(state): State<AppState>,
    Query(params): Query<MatchParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = state.engine.read();
    let (words, status) = engine.match_document_with(policy(params.parallel), &params.q, params.doc_id)?;
    Ok(Json(serde_json::json!({ "document_id": params.doc_id, "words": words, "status": status })))
}

pub async fn add_document_handler(
    State(state): State<AppState>,
    Json(doc): Json<InputDocument>,
) -> Result<StatusCode, ApiError> {
    state.engine.write().add_document(doc.id, &doc.text, doc.status, &doc.ratings)?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_document_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocumentId>,
    Query(params): Query<RemoveParams>,
) -> StatusCode {
    state.engine.write().remove_document_with(policy(params.parallel), doc_id);
    StatusCode::NO_CONTENT
}

pub async fn words_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocumentId>,
) -> Json<BTreeMap<String, f64>> {
    let engine = state.engine.read();
    let freqs = engine.word_frequencies(doc_id).into_iter().map(|(w, f)| (w.to_string(), f)).collect();
    Json(freqs)
}

pub async fn dedup_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let removed = remove_duplicates(&mut state.engine.write());
    Json(serde_json::json!({ "removed": removed }))
}

pub async fn batch_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    let engine = state.engine.read();
    let body = if req.joined {
        BatchResponse::Joined(process_queries_joined(&engine, &req.queries[..])?)
    } else {
        BatchResponse::PerQuery(process_queries(&engine, &req.queries[..])?)
    };
    Ok(Json(body))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let document_count = state.engine.read().document_count();
    let requests = state.requests.lock();
    Json(StatsResponse {
        document_count,
        no_result_requests: requests.no_result_requests(),
        window_len: requests.len(),
    })
}
