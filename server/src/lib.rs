use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use docseek_core::index::preview;
use docseek_core::ingest::read_folder;
use docseek_core::{EngineStatus, NoProgress, ProgressEvent, SearchEngine, SearchHit};
use futures::stream::{self, Stream};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod error;

pub use error::ApiError;

const RESULT_PREVIEW_CHARS: usize = 300;
const STEPS_SAMPLE_CHARS: usize = 500;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

#[derive(Deserialize)]
pub struct UploadRequest {
    pub folder_path: String,
}

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_k")]
    pub top_k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct PreprocessRequest {
    pub text: String,
}

#[derive(Deserialize)]
pub struct PreprocessParams {
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct MatrixParams {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}
fn default_top_n() -> usize { 50 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub status: &'static str,
    pub query_original: String,
    pub query_processed: String,
    pub query_tokens: Vec<String>,
    pub took_s: f64,
    pub total_results: usize,
    pub showing: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Serialize)]
pub struct SearchResult {
    pub rank: usize,
    pub document_id: usize,
    pub filename: String,
    pub original_text: String,
    pub processed_text: String,
    pub word_count: usize,
    pub score: f64,
}

impl From<SearchHit> for SearchResult {
    fn from(hit: SearchHit) -> Self {
        Self {
            rank: hit.rank,
            document_id: hit.document_id,
            filename: hit.filename,
            original_text: preview(&hit.original_text, RESULT_PREVIEW_CHARS),
            processed_text: preview(&hit.processed_text, RESULT_PREVIEW_CHARS),
            word_count: hit.word_count,
            score: hit.score,
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub engine: EngineStatus,
}

pub fn build_app(engine: Arc<SearchEngine>) -> Router {
    let app_state = AppState { engine };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/upload-stream", post(upload_stream_handler))
        .route("/api/search", post(search_handler))
        .route("/api/documents", get(documents_handler))
        .route("/api/document/:doc_id", get(document_handler))
        .route("/api/tfidf-matrix", get(matrix_handler))
        .route("/api/preprocess", post(preprocess_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "active", engine: state.engine.status() })
}

/// Reads the folder and reindexes it, answering once the new index is live.
pub async fn upload_handler(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let engine = Arc::clone(&state.engine);
    let summary = tokio::task::spawn_blocking(move || {
        let docs = read_folder(&req.folder_path)?;
        engine.reindex(docs, &mut NoProgress)
    })
    .await??;
    Ok(Json(json!({
        "status": "success",
        "message": format!("indexed {} documents", summary.total_documents),
        "total_documents": summary.total_documents,
        "vocabulary_size": summary.vocabulary_size,
        "documents": summary.documents,
    })))
}

/// Same as [`upload_handler`] but streams every progress event as SSE.
pub async fn upload_stream_handler(
    State(state): State<AppState>,
    Json(req): Json<UploadRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel::<ProgressEvent>();
    let engine = Arc::clone(&state.engine);
    tokio::task::spawn_blocking(move || {
        // a closed receiver only means the client went away; the build still commits
        let mut sink = |event: ProgressEvent| {
            let _ = tx.send(event);
        };
        match read_folder(&req.folder_path) {
            Ok(docs) => {
                if let Err(err) = engine.reindex(docs, &mut sink) {
                    tracing::warn!(error = %err, folder = %req.folder_path, "streamed reindex failed");
                }
            }
            Err(err) => sink(ProgressEvent::Failed { error: err.to_string(), kind: err.kind().to_string() }),
        }
    });

    let events = stream::unfold(rx, |mut rx| async move {
        let event = rx.recv().await?;
        let sse = Event::default()
            .json_data(&event)
            .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));
        Some((Ok(sse), rx))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    if req.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".into()));
    }
    let start = std::time::Instant::now();
    let outcome = state.engine.search(&req.query, req.top_k)?;
    let results: Vec<SearchResult> = outcome.results.into_iter().map(SearchResult::from).collect();
    Ok(Json(SearchResponse {
        status: "success",
        query_original: req.query,
        query_processed: outcome.query_processed,
        query_tokens: outcome.query_tokens,
        took_s: start.elapsed().as_secs_f64(),
        total_results: outcome.total_results,
        showing: results.len(),
        results,
    }))
}

pub async fn documents_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let documents = state.engine.documents();
    Json(json!({ "status": "success", "total": documents.len(), "documents": documents }))
}

pub async fn document_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<usize>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let doc = state.engine.document(doc_id)?;
    let sample: String = doc.original_text.chars().take(STEPS_SAMPLE_CHARS).collect();
    let steps = state.engine.preprocessing_steps(&sample);
    Ok(Json(json!({
        "status": "success",
        "document": {
            "id": doc_id,
            "filename": doc.filename,
            "file_path": doc.path,
            "original_text": doc.original_text,
            "processed_text": doc.processed_text,
            "tokens": doc.tokens,
            "word_count": doc.word_count,
            "preprocessing_steps": steps,
        }
    })))
}

pub async fn matrix_handler(
    State(state): State<AppState>,
    Query(params): Query<MatrixParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let matrix = state.engine.term_matrix(params.top_n)?;
    Ok(Json(json!({ "status": "success", "matrix": matrix })))
}

/// Takes `text` from the query string or, failing that, a JSON body.
pub async fn preprocess_handler(
    State(state): State<AppState>,
    Query(params): Query<PreprocessParams>,
    body: Option<Json<PreprocessRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let text = params
        .text
        .or(body.map(|Json(req)| req.text))
        .ok_or_else(|| ApiError::BadRequest("text is required".into()))?;
    let steps = state.engine.preprocessing_steps(&text);
    Ok(Json(json!({ "status": "success", "steps": steps })))
}
