//! Linear blend of TF-IDF and BM25 rankings.
//!
//! Scores are combined on their raw scales; nothing is normalized. A document
//! missing from one list contributes zero from that side.

use crate::bm25::Bm25Scorer;
use crate::config::HybridWeights;
use crate::error::Result;
use crate::index::{finalize_ranking, DocId, ScoredResult};
use crate::tfidf::TfidfScorer;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
pub struct HybridRanker<'a> {
    tfidf: TfidfScorer<'a>,
    bm25: Bm25Scorer<'a>,
}

impl<'a> HybridRanker<'a> {
    pub fn new(tfidf: TfidfScorer<'a>, bm25: Bm25Scorer<'a>) -> Self {
        Self { tfidf, bm25 }
    }

    /// Ask each scorer for `2 * top_k` candidates, then blend.
    pub fn search(&self, query: &str, top_k: usize, weights: HybridWeights) -> Result<Vec<ScoredResult>> {
        weights.validate()?;
        let depth = top_k.saturating_mul(2);
        let tfidf_results = self.tfidf.search(query, depth);
        let bm25_results = self.bm25.search(query, depth);
        Ok(blend(&tfidf_results, &bm25_results, top_k, weights))
    }
}

/// Blend two ranked lists into one.
///
/// Fails with [`Error::InvalidWeight`](crate::Error::InvalidWeight) unless the
/// weights sum to exactly 1.0.
pub fn combine(
    tfidf_results: &[ScoredResult],
    bm25_results: &[ScoredResult],
    top_k: usize,
    tfidf_weight: f64,
    bm25_weight: f64,
) -> Result<Vec<ScoredResult>> {
    let weights = HybridWeights { tfidf: tfidf_weight, bm25: bm25_weight };
    weights.validate()?;
    Ok(blend(tfidf_results, bm25_results, top_k, weights))
}

fn blend(
    tfidf_results: &[ScoredResult],
    bm25_results: &[ScoredResult],
    top_k: usize,
    weights: HybridWeights,
) -> Vec<ScoredResult> {
    if top_k == 0 {
        return Vec::new();
    }
    // doc id -> (external id, tfidf score, bm25 score)
    let mut union: BTreeMap<DocId, (&str, f64, f64)> = BTreeMap::new();
    for r in tfidf_results {
        union.entry(r.doc_id).or_insert((r.id.as_str(), 0.0, 0.0)).1 = r.score;
    }
    for r in bm25_results {
        union.entry(r.doc_id).or_insert((r.id.as_str(), 0.0, 0.0)).2 = r.score;
    }
    let blended = union
        .into_iter()
        .map(|(doc_id, (id, t, b))| ScoredResult {
            doc_id,
            id: id.to_string(),
            score: weights.tfidf * t + weights.bm25 * b,
        })
        .collect();
    finalize_ranking(blended, top_k)
}
