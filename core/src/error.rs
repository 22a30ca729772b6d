use std::path::PathBuf;

/// Errors raised while building an index or validating a query request.
///
/// Every variant is terminal for the operation that produced it. Degenerate
/// inputs such as an empty query or a zero-length document are not errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The document source yielded no documents.
    #[error("corpus is empty")]
    EmptyCorpus,
    /// Two documents share an identifier.
    #[error("duplicate document id: {0}")]
    DuplicateId(String),
    /// The document source could not be read.
    #[error("cannot read document source {}: {source}", path.display())]
    InvalidSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A record in a JSONL source could not be parsed.
    #[error("malformed record at {}:{line}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    /// Hybrid weights do not sum to exactly 1.0.
    #[error("hybrid weights must sum to 1.0 (got tfidf={tfidf}, bm25={bm25})")]
    InvalidWeight { tfidf: f64, bm25: f64 },
    /// Precision cut-off must be positive.
    #[error("k must be positive")]
    InvalidK,
    /// BM25 parameters out of range.
    #[error("invalid BM25 parameters: {0}")]
    InvalidParams(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
