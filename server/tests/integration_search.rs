use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use irlite_core::{Bm25Params, CorpusIndex, RawDocument, RetrievalEngine, StemmingTokenizer};
use serde_json::Value;
use std::fs;
use std::sync::Arc;
use tempfile::tempdir;
use tower::ServiceExt;

fn tiny_engine() -> RetrievalEngine {
    let docs = vec![
        RawDocument::new("doc1", "Cat sat on the mat."),
        RawDocument::new("doc2", "The dog sat on a log."),
        RawDocument::new("doc3", "A cat and a dog watched a bird."),
    ];
    let index = CorpusIndex::build(docs, StemmingTokenizer).unwrap();
    RetrievalEngine::new(Arc::new(index), Bm25Params::default()).unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let app = irlite_server::router(tiny_engine());
    let (status, json) = get(app, "/search?q=cat%20dog&k=2&mode=tfidf").await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["id"], "doc3");
    assert_eq!(arr[1]["id"], "doc1");
    assert!(arr[0]["snippet"].as_str().unwrap().contains("<em>cat</em>"));
    assert_eq!(json["mode"], "tfidf");
}

#[tokio::test]
async fn search_defaults_to_bm25() {
    let app = irlite_server::router(tiny_engine());
    let (status, json) = get(app, "/search?q=bird").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "bm25");
    assert_eq!(json["results"][0]["id"], "doc3");
}

#[tokio::test]
async fn search_accepts_hyphenated_tfidf_mode() {
    let app = irlite_server::router(tiny_engine());
    let (status, json) = get(app, "/search?q=cat&mode=tf-idf").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["mode"], "tfidf");
}

#[tokio::test]
async fn hybrid_with_bad_weights_is_rejected() {
    let app = irlite_server::router(tiny_engine());
    let (status, _) = get(app, "/search?q=cat&mode=hybrid&tfidf_weight=0.4&bm25_weight=0.5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn doc_lookup() {
    let app = irlite_server::router(tiny_engine());
    let (status, json) = get(app.clone(), "/doc/1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "doc2");
    let (status, _) = get(app, "/doc/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn evaluate_scores_precision() {
    let app = irlite_server::router(tiny_engine());
    let body = serde_json::json!({ "query": "cat dog", "relevant": ["doc3"], "k": 2 }).to_string();
    let req = Request::post("/evaluate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send(app.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["tfidf_precision"], 0.5);
    assert_eq!(json["bm25_precision"], 0.5);

    let body = serde_json::json!({ "query": "cat", "relevant": [], "k": 0 }).to_string();
    let req = Request::post("/evaluate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, _) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn evaluate_clamps_k() {
    let app = irlite_server::router(tiny_engine());
    let body = serde_json::json!({ "query": "cat dog", "relevant": ["doc3"], "k": 1000 }).to_string();
    let req = Request::post("/evaluate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let (status, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["k"], 100);
    assert_eq!(json["tfidf_precision"], 0.01);
}

#[tokio::test]
async fn build_app_reads_a_directory() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "Rust is great. rust systems programming.").unwrap();
    fs::write(dir.path().join("b.txt"), "Learning python.").unwrap();
    let app = irlite_server::build_app(dir.path().to_str().unwrap(), Bm25Params::default()).unwrap();

    let (status, json) = get(app, "/search?q=rust&k=5").await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["id"], "a.txt");
}

#[test]
fn build_app_fails_on_empty_directory() {
    let dir = tempdir().unwrap();
    assert!(irlite_server::build_app(dir.path().to_str().unwrap(), Bm25Params::default()).is_err());
}
