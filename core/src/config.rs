//! Defaults and tunable parameters shared by the scorers, the CLI and the server.
//!
//! Runtime values come from command-line arguments and request parameters;
//! these are the fallbacks.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of results returned when the caller does not ask for a specific count.
pub const DEFAULT_TOP_K: usize = 5;

/// Upper bound on results per HTTP search request.
pub const MAX_TOP_K: usize = 100;

/// BM25 term-frequency saturation.
pub const DEFAULT_K1: f64 = 1.5;

/// BM25 document-length normalization strength.
pub const DEFAULT_B: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: DEFAULT_K1, b: DEFAULT_B }
    }
}

impl Bm25Params {
    pub fn new(k1: f64, b: f64) -> Result<Self> {
        let params = Self { k1, b };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(Error::InvalidParams("k1 must be a finite non-negative number"));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidParams("b must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Linear blend weights for hybrid ranking.
///
/// The pair must sum to exactly 1.0; no tolerance is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HybridWeights {
    pub tfidf: f64,
    pub bm25: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self { tfidf: 0.5, bm25: 0.5 }
    }
}

impl HybridWeights {
    pub fn new(tfidf: f64, bm25: f64) -> Result<Self> {
        let weights = Self { tfidf, bm25 };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tfidf + self.bm25 != 1.0 {
            return Err(Error::InvalidWeight { tfidf: self.tfidf, bm25: self.bm25 });
        }
        Ok(())
    }
}
