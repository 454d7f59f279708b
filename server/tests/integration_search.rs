use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use docseek_core::{EngineConfig, SearchEngine};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_tiny_corpus(dir: &Path) {
    fs::write(dir.join("0.txt"), "Kucing makan ikan.").unwrap();
    fs::write(dir.join("1.txt"), "Anjing makan daging.").unwrap();
    fs::write(dir.join("2.txt"), "Kucing dan anjing bermain.").unwrap();
}

fn app() -> Router {
    let engine = SearchEngine::new(EngineConfig::default()).unwrap();
    docseek_server::build_app(Arc::new(engine))
}

async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, body) = call(app, req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Vec<u8>) {
    let req = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    call(app, req).await
}

async fn upload(app: &Router, dir: &Path) -> Value {
    let (status, body) = post_json(app, "/api/upload", json!({ "folder_path": dir.to_string_lossy() })).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn search_requires_an_index() {
    let app = app();
    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["indexed"], false);
    assert_eq!(health["state"], "not_indexed");

    let (status, body) = post_json(&app, "/api/search", json!({ "query": "kucing" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("no index"));
}

#[tokio::test]
async fn upload_then_search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    write_tiny_corpus(dir.path());
    let app = app();

    let summary = upload(&app, dir.path()).await;
    assert_eq!(summary["total_documents"], 3);
    assert_eq!(summary["documents"][2]["filename"], "2.txt");

    let (status, body) = post_json(&app, "/api/search", json!({ "query": "Kucing makan", "top_k": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["query_processed"], "kucing makan");
    assert_eq!(json["total_results"], 3);
    assert_eq!(json["showing"], 2);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["document_id"], 0);
    assert_eq!(results[0]["rank"], 1);
    let top = results[0]["score"].as_f64().unwrap();
    assert!((top - 0.49434220452177857).abs() < 1e-9);

    let (status, health) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["indexed"], true);
    assert_eq!(health["total_documents"], 3);
}

#[tokio::test]
async fn blank_query_is_rejected() {
    let dir = tempdir().unwrap();
    write_tiny_corpus(dir.path());
    let app = app();
    upload(&app, dir.path()).await;
    let (status, _) = post_json(&app, "/api/search", json!({ "query": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn document_detail_and_listing() {
    let dir = tempdir().unwrap();
    write_tiny_corpus(dir.path());
    let app = app();
    upload(&app, dir.path()).await;

    let (status, json) = get_json(&app, "/api/document/2").await;
    assert_eq!(status, StatusCode::OK);
    let doc = &json["document"];
    assert_eq!(doc["filename"], "2.txt");
    assert_eq!(doc["tokens"], json!(["kucing", "anjing", "main"]));
    assert_eq!(doc["preprocessing_steps"]["stopword_removal"], "kucing anjing bermain");

    let (status, _) = get_json(&app, "/api/document/9").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, json) = get_json(&app, "/api/documents").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["total"], 3);
}

#[tokio::test]
async fn tfidf_matrix_view() {
    let app = app();
    let (status, _) = get_json(&app, "/api/tfidf-matrix").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let dir = tempdir().unwrap();
    write_tiny_corpus(dir.path());
    upload(&app, dir.path()).await;
    let (status, json) = get_json(&app, "/api/tfidf-matrix?top_n=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matrix"]["num_terms"], 6);
    assert_eq!(json["matrix"]["terms"], json!(["anjing", "daging", "ikan"]));
}

#[tokio::test]
async fn missing_folder_is_not_found() {
    let app = app();
    let (status, _) = post_json(&app, "/api/upload", json!({ "folder_path": "/no/such/folder" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_stream_emits_progress_until_complete() {
    let dir = tempdir().unwrap();
    write_tiny_corpus(dir.path());
    let app = app();

    let (status, body) =
        post_json(&app, "/api/upload-stream", json!({ "folder_path": dir.path().to_string_lossy() })).await;
    assert_eq!(status, StatusCode::OK);
    let events: Vec<Value> = String::from_utf8(body)
        .unwrap()
        .lines()
        .filter_map(|l| l.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect();
    let stages: Vec<&str> = events.iter().map(|e| e["stage"].as_str().unwrap()).collect();
    assert_eq!(stages, ["reading", "discovered", "processing", "processing", "processing", "building", "complete"]);
    assert_eq!(events[4]["percentage"], 100.0);
    assert_eq!(events[6]["total_documents"], 3);

    let (_, health) = get_json(&app, "/health").await;
    assert_eq!(health["state"], "ready");
}

#[tokio::test]
async fn upload_stream_reports_empty_folder() {
    let dir = tempdir().unwrap();
    let app = app();
    let (status, body) =
        post_json(&app, "/api/upload-stream", json!({ "folder_path": dir.path().to_string_lossy() })).await;
    assert_eq!(status, StatusCode::OK);
    let text = String::from_utf8(body).unwrap();
    assert!(text.contains(r#""stage":"failed""#));
    assert!(text.contains("empty_corpus"));
}

#[tokio::test]
async fn preprocess_endpoint_shows_every_stage() {
    let app = app();
    let (status, body) = post_json(&app, "/api/preprocess", json!({ "text": "Para petani menanam padi" })).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let steps = &json["steps"];
    assert_eq!(steps["case_folding"], "para petani menanam padi");
    assert_eq!(steps["stopword_removal"], "petani menanam padi");
    assert_eq!(steps["stemming"], "tani tanam padi");
}

#[tokio::test]
async fn preprocess_endpoint_accepts_query_parameter() {
    let app = app();
    let req = Request::post("/api/preprocess?text=Kucing%20memakan%20ikan").body(Body::empty()).unwrap();
    let (status, body) = call(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["steps"]["stemming"], "kucing makan ikan");

    let req = Request::post("/api/preprocess").body(Body::empty()).unwrap();
    let (status, _) = call(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
