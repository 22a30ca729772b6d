//! Vector-space TF-IDF ranking.
//!
//! Weights are raw term counts times `ln(N / df)`; the similarity is the plain
//! dot product of the document and query vectors, with no length normalization.

use crate::index::{CorpusIndex, DocId, ScoredResult, TermId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct TfidfScorer<'a> {
    index: &'a CorpusIndex,
}

impl<'a> TfidfScorer<'a> {
    pub fn new(index: &'a CorpusIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a CorpusIndex {
        self.index
    }

    /// `ln(N / df)`; zero for a term outside the vocabulary.
    pub fn idf(&self, term: TermId) -> f64 {
        let df = self.index.document_frequency(term);
        if df == 0 {
            return 0.0;
        }
        (self.index.num_docs() as f64 / f64::from(df)).ln()
    }

    /// Query vector: each distinct query term weighted by its count in the query times its idf.
    fn query_weights(&self, query: &str) -> HashMap<TermId, f64> {
        let mut counts: HashMap<TermId, u32> = HashMap::new();
        for tid in self.index.query_terms(query) {
            *counts.entry(tid).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(tid, tf)| (tid, f64::from(tf) * self.idf(tid)))
            .collect()
    }

    /// Dot product between one document's vector and the query's vector.
    pub fn score(&self, doc_id: DocId, query: &str) -> f64 {
        self.query_weights(query)
            .into_iter()
            .map(|(tid, q_w)| {
                let tf = self.index.term_frequency(doc_id, tid);
                f64::from(tf) * self.idf(tid) * q_w
            })
            .sum()
    }

    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredResult> {
        if top_k == 0 || query.trim().is_empty() {
            return Vec::new();
        }
        let q_weights = self.query_weights(query);
        if q_weights.is_empty() {
            return Vec::new();
        }

        // Terms in ascending id order so accumulation is reproducible across calls.
        let mut terms: Vec<(TermId, f64)> = q_weights.into_iter().collect();
        terms.sort_unstable_by_key(|(tid, _)| *tid);

        let mut scores = vec![0.0f64; self.index.num_docs()];
        for (tid, q_w) in terms {
            let idf = self.idf(tid);
            for p in self.index.postings(tid) {
                scores[p.doc_id as usize] += f64::from(p.tf) * idf * q_w;
            }
        }
        let results = self.index.rank(
            scores.into_iter().enumerate().map(|(d, s)| (d as DocId, s)),
            top_k,
        );
        tracing::debug!(query, hits = results.len(), "tfidf search");
        results
    }
}
