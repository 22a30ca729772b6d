//! Okapi BM25.
//!
//! `idf = ln(1 + (N - df + 0.5) / (df + 0.5))`, which stays non-negative for
//! every `df` in `[1, N]`. Query terms are summed with repetition.

use crate::config::Bm25Params;
use crate::index::{CorpusIndex, DocId, ScoredResult, TermId};

#[derive(Debug, Clone, Copy)]
pub struct Bm25Scorer<'a> {
    index: &'a CorpusIndex,
    params: Bm25Params,
}

impl<'a> Bm25Scorer<'a> {
    pub fn new(index: &'a CorpusIndex, params: Bm25Params) -> Self {
        Self { index, params }
    }

    pub fn with_defaults(index: &'a CorpusIndex) -> Self {
        Self::new(index, Bm25Params::default())
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn index(&self) -> &'a CorpusIndex {
        self.index
    }

    pub fn idf(&self, term: TermId) -> f64 {
        let df = self.index.document_frequency(term);
        if df == 0 {
            return 0.0;
        }
        let n = self.index.num_docs() as f64;
        let df = f64::from(df);
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// `1 - b + b * dl / avgdl`, or `1 - b` when every document is empty.
    fn length_norm(&self, doc_id: DocId) -> f64 {
        let b = self.params.b;
        let avgdl = self.index.avg_doc_length();
        if avgdl == 0.0 {
            return 1.0 - b;
        }
        1.0 - b + b * f64::from(self.index.doc_length(doc_id)) / avgdl
    }

    fn tf_part(&self, tf: u32, doc_id: DocId) -> f64 {
        if tf == 0 {
            return 0.0;
        }
        let k1 = self.params.k1;
        let tf = f64::from(tf);
        let denom = tf + k1 * self.length_norm(doc_id);
        if denom <= 0.0 {
            return 0.0;
        }
        tf * (k1 + 1.0) / denom
    }

    pub fn score_term(&self, term: TermId, doc_id: DocId) -> f64 {
        let tf = self.index.term_frequency(doc_id, term);
        self.idf(term) * self.tf_part(tf, doc_id)
    }

    pub fn score(&self, doc_id: DocId, query: &str) -> f64 {
        self.index
            .query_terms(query)
            .into_iter()
            .map(|tid| self.score_term(tid, doc_id))
            .sum()
    }

    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredResult> {
        if top_k == 0 || query.trim().is_empty() {
            return Vec::new();
        }
        let terms = self.index.query_terms(query);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scores = vec![0.0f64; self.index.num_docs()];
        for tid in terms {
            let idf = self.idf(tid);
            for p in self.index.postings(tid) {
                scores[p.doc_id as usize] += idf * self.tf_part(p.tf, p.doc_id);
            }
        }
        let results = self.index.rank(
            scores.into_iter().enumerate().map(|(d, s)| (d as DocId, s)),
            top_k,
        );
        tracing::debug!(query, hits = results.len(), "bm25 search");
        results
    }
}
