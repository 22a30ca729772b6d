use crate::bm25::Bm25Scorer;
use crate::config::{Bm25Params, HybridWeights};
use crate::error::Result;
use crate::hybrid::HybridRanker;
use crate::index::{CorpusIndex, ScoredResult};
use crate::tfidf::TfidfScorer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[serde(alias = "tf-idf")]
    Tfidf,
    #[default]
    Bm25,
    Hybrid,
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "tfidf" | "tf-idf" => Ok(Self::Tfidf),
            "bm25" => Ok(Self::Bm25),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown search mode: {other}")),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tfidf => "tfidf",
            Self::Bm25 => "bm25",
            Self::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// A built index shared behind an `Arc`, plus the BM25 configuration.
///
/// Cheap to clone; every search borrows the index read-only.
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    index: Arc<CorpusIndex>,
    params: Bm25Params,
}

impl RetrievalEngine {
    pub fn new(index: Arc<CorpusIndex>, params: Bm25Params) -> Result<Self> {
        params.validate()?;
        Ok(Self { index, params })
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn tfidf(&self) -> TfidfScorer<'_> {
        TfidfScorer::new(&self.index)
    }

    pub fn bm25(&self) -> Bm25Scorer<'_> {
        Bm25Scorer::new(&self.index, self.params)
    }

    pub fn hybrid(&self) -> HybridRanker<'_> {
        HybridRanker::new(self.tfidf(), self.bm25())
    }

    pub fn tfidf_search(&self, query: &str, top_k: usize) -> Vec<ScoredResult> {
        self.tfidf().search(query, top_k)
    }

    pub fn bm25_search(&self, query: &str, top_k: usize) -> Vec<ScoredResult> {
        self.bm25().search(query, top_k)
    }

    pub fn hybrid_search(&self, query: &str, top_k: usize, weights: HybridWeights) -> Result<Vec<ScoredResult>> {
        self.hybrid().search(query, top_k, weights)
    }

    /// `weights` only matter for [`SearchMode::Hybrid`].
    pub fn search(
        &self,
        mode: SearchMode,
        query: &str,
        top_k: usize,
        weights: HybridWeights,
    ) -> Result<Vec<ScoredResult>> {
        match mode {
            SearchMode::Tfidf => Ok(self.tfidf_search(query, top_k)),
            SearchMode::Bm25 => Ok(self.bm25_search(query, top_k)),
            SearchMode::Hybrid => self.hybrid_search(query, top_k, weights),
        }
    }
}
