//! Ranking quality: precision-at-k and per-query evaluation.

use crate::engine::RetrievalEngine;
use crate::error::{Error, Result};
use crate::index::ScoredResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// `|top-k ids ∩ relevant| / k`.
///
/// The denominator is always `k`, so a list shorter than `k` is penalized.
pub fn precision_at_k<S: AsRef<str>>(ranked: &[ScoredResult], relevant: &[S], k: usize) -> Result<f64> {
    if k == 0 {
        return Err(Error::InvalidK);
    }
    let relevant: HashSet<&str> = relevant.iter().map(|s| s.as_ref()).collect();
    let retrieved: HashSet<&str> = ranked.iter().take(k).map(|r| r.id.as_str()).collect();
    let hits = retrieved.intersection(&relevant).count();
    Ok(hits as f64 / k as f64)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEvaluation {
    pub query: String,
    pub k: usize,
    pub tfidf_precision: f64,
    pub bm25_precision: f64,
    /// Wall-clock seconds spent on both searches.
    pub response_time_sec: f64,
}

/// Run TF-IDF and BM25 for `query` with depth `k` and score both against `relevant`.
pub fn evaluate_query<S: AsRef<str>>(
    engine: &RetrievalEngine,
    query: &str,
    relevant: &[S],
    k: usize,
) -> Result<QueryEvaluation> {
    if k == 0 {
        return Err(Error::InvalidK);
    }
    let start = Instant::now();
    let tfidf = engine.tfidf_search(query, k);
    let bm25 = engine.bm25_search(query, k);
    let elapsed = start.elapsed();

    Ok(QueryEvaluation {
        query: query.to_string(),
        k,
        tfidf_precision: precision_at_k(&tfidf, relevant, k)?,
        bm25_precision: precision_at_k(&bm25, relevant, k)?,
        response_time_sec: elapsed.as_secs_f64(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub queries: usize,
    pub mean_tfidf_precision: f64,
    pub mean_bm25_precision: f64,
    pub mean_response_time_sec: f64,
}

/// Averages over a batch; `None` for an empty batch.
pub fn summarize(evaluations: &[QueryEvaluation]) -> Option<EvaluationSummary> {
    if evaluations.is_empty() {
        return None;
    }
    let n = evaluations.len() as f64;
    let mean = |f: fn(&QueryEvaluation) -> f64| evaluations.iter().map(f).sum::<f64>() / n;
    Some(EvaluationSummary {
        queries: evaluations.len(),
        mean_tfidf_precision: mean(|e| e.tfidf_precision),
        mean_bm25_precision: mean(|e| e.bm25_precision),
        mean_response_time_sec: mean(|e| e.response_time_sec),
    })
}
