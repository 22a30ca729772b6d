use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use irlite_core::config::{DEFAULT_TOP_K, MAX_TOP_K};
use irlite_core::{
    evaluate_query, open_source, Bm25Params, CorpusIndex, DocId, HybridWeights, QueryEvaluation, RetrievalEngine,
    SearchMode, StemmingTokenizer,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub mode: SearchMode,
    pub tfidf_weight: Option<f64>,
    pub bm25_weight: Option<f64>,
}
fn default_k() -> usize { DEFAULT_TOP_K }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: SearchMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub id: String,
    pub score: f64,
    pub snippet: Option<String>,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub query: String,
    pub relevant: Vec<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub engine: RetrievalEngine,
}

/// Index every document under `corpus` (directory or JSONL) and serve it.
pub fn build_app(corpus: &str, params: Bm25Params) -> Result<Router> {
    let source = open_source(corpus);
    let index = CorpusIndex::from_source(source.as_ref(), StemmingTokenizer)
        .with_context(|| format!("building index from {corpus}"))?;
    let engine = RetrievalEngine::new(Arc::new(index), params)?;
    tracing::info!(corpus, num_docs = engine.index().num_docs(), "index loaded");
    Ok(router(engine))
}

pub fn router(engine: RetrievalEngine) -> Router {
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
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/evaluate", post(evaluate_handler))
        .with_state(AppState { engine })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn bad_request(err: irlite_core::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let defaults = HybridWeights::default();
    let weights = HybridWeights {
        tfidf: params.tfidf_weight.unwrap_or(defaults.tfidf),
        bm25: params.bm25_weight.unwrap_or(defaults.bm25),
    };
    let k = params.k.min(MAX_TOP_K);
    let ranked = state.engine.search(params.mode, &params.q, k, weights).map_err(bad_request)?;

    // Capture raw query terms for highlighting
    let raw_terms: Vec<String> = params
        .q
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    let index = state.engine.index();
    let results: Vec<SearchHit> = ranked
        .into_iter()
        .map(|r| {
            let snippet = index.document(r.doc_id).and_then(|doc| snippet_from_text(&doc.text, &raw_terms));
            SearchHit { doc_id: r.doc_id, id: r.id, score: r.score, snippet }
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, mode = %params.mode, hits = results.len(), "search");
    Ok(Json(SearchResponse {
        query: params.q,
        mode: params.mode,
        took_s: elapsed.as_secs_f64(),
        total_hits: results.len(),
        results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let index = state.engine.index();
    let doc = index
        .document(doc_id)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("no document {doc_id}")))?;
    Ok(Json(serde_json::json!({
        "doc_id": doc_id,
        "id": doc.id,
        "length": index.doc_length(doc_id),
        "text": doc.text,
    })))
}

pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<QueryEvaluation>, ApiError> {
    let k = req.k.min(MAX_TOP_K);
    let evaluation = evaluate_query(&state.engine, &req.query, &req.relevant, k).map_err(bad_request)?;
    Ok(Json(evaluation))
}

const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;

fn snippet_from_text(text: &str, raw_terms: &[String]) -> Option<String> {
    if text.is_empty() { return None; }
    // find first match (case-insensitive) of any raw term
    let first_idx = raw_terms
        .iter()
        .filter(|t| !t.trim().is_empty())
        .find_map(|t| find_case_insensitive(text, t));
    let snippet = match first_idx {
        Some(idx) => {
            let start = char_boundary(text, idx.saturating_sub(SNIPPET_BEFORE));
            let end = char_boundary(text, idx + SNIPPET_AFTER);
            text[start..end].to_string()
        }
        None => text.chars().take(SNIPPET_AFTER).collect(),
    };
    Some(highlight_terms(&snippet, raw_terms))
}

/// Largest char boundary at or below `idx`, clamped to the text length.
fn char_boundary(text: &str, idx: usize) -> usize {
    let mut idx = idx.min(text.len());
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn find_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let pat = regex::RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()?;
    pat.find(haystack).map(|m| m.start())
}

/// HTML-escaped snippet with each case-insensitive term match wrapped in `<em>`.
/// Matching is one pass over the raw text; longer terms win at the same offset.
fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    let mut alternatives: Vec<&str> = terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()).collect();
    alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    alternatives.dedup();
    let pattern = alternatives.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    let pat = match regex::RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(pat) if !alternatives.is_empty() => pat,
        _ => return escape_html(snippet),
    };

    let mut out = String::with_capacity(snippet.len() + 16);
    let mut last = 0;
    for m in pat.find_iter(snippet) {
        out.push_str(&escape_html(&snippet[last..m.start()]));
        out.push_str("<em>");
        out.push_str(&escape_html(m.as_str()));
        out.push_str("</em>");
        last = m.end();
    }
    out.push_str(&escape_html(&snippet[last..]));
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
