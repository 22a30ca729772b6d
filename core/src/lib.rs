//! In-memory lexical retrieval over a fixed corpus.
//!
//! Documents are tokenized once into a [`CorpusIndex`]; queries are ranked by
//! TF-IDF ([`TfidfScorer`]), Okapi BM25 ([`Bm25Scorer`]) or a linear blend of
//! both ([`HybridRanker`]), and rankings can be checked with [`precision_at_k`].

pub mod bm25;
pub mod config;
pub mod engine;
pub mod error;
pub mod eval;
pub mod hybrid;
pub mod index;
pub mod source;
pub mod tfidf;
pub mod tokenizer;

pub use bm25::Bm25Scorer;
pub use config::{Bm25Params, HybridWeights};
pub use engine::{RetrievalEngine, SearchMode};
pub use error::{Error, Result};
pub use eval::{evaluate_query, precision_at_k, summarize, EvaluationSummary, QueryEvaluation};
pub use hybrid::{combine, HybridRanker};
pub use index::{CorpusIndex, DocId, Document, IndexBuilder, RawDocument, ScoredResult, TermId};
pub use source::{open_source, DirectorySource, DocumentSource, JsonlSource};
pub use tfidf::TfidfScorer;
pub use tokenizer::{PlainTokenizer, StemmingTokenizer, Tokenizer};
