use crate::error::{Error, Result};
use crate::source::DocumentSource;
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

pub type TermId = u32;
pub type DocId = u32;

/// A document as handed over by a source, before tokenization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub text: String,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// One entry of a ranked list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Position of the document in the index.
    pub doc_id: DocId,
    /// External identifier of the document.
    pub id: String,
    pub score: f64,
}

/// Collects documents before any statistics exist. `build` is the only way to
/// obtain a searchable [`CorpusIndex`].
pub struct IndexBuilder {
    tokenizer: Box<dyn Tokenizer>,
    documents: Vec<Document>,
    seen: HashSet<String>,
}

impl IndexBuilder {
    pub fn new<T: Tokenizer + 'static>(tokenizer: T) -> Self {
        Self { tokenizer: Box::new(tokenizer), documents: Vec::new(), seen: HashSet::new() }
    }

    pub fn add_document(&mut self, id: impl Into<String>, text: impl Into<String>) -> Result<&mut Self> {
        let id = id.into();
        if !self.seen.insert(id.clone()) {
            return Err(Error::DuplicateId(id));
        }
        let text = text.into();
        let tokens = self.tokenizer.normalize(&text);
        self.documents.push(Document { id, text, tokens });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn build(self) -> Result<CorpusIndex> {
        if self.documents.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let num_docs = self.documents.len();
        let mut vocabulary: HashMap<String, TermId> = HashMap::new();
        let mut document_frequency: Vec<u32> = Vec::new();
        let mut postings: Vec<Vec<Posting>> = Vec::new();
        let mut term_frequency: Vec<HashMap<TermId, u32>> = Vec::with_capacity(num_docs);
        let mut doc_length: Vec<u32> = Vec::with_capacity(num_docs);

        for (doc_id, doc) in self.documents.iter().enumerate() {
            let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
            for token in &doc.tokens {
                let next_id = vocabulary.len() as TermId;
                let tid = *vocabulary.entry(token.clone()).or_insert_with(|| {
                    document_frequency.push(0);
                    postings.push(Vec::new());
                    next_id
                });
                *tf_counts.entry(tid).or_insert(0) += 1;
            }
            for (&tid, &tf) in &tf_counts {
                document_frequency[tid as usize] += 1;
                postings[tid as usize].push(Posting { doc_id: doc_id as DocId, tf });
            }
            doc_length.push(doc.tokens.len() as u32);
            term_frequency.push(tf_counts);
        }

        let total: u64 = doc_length.iter().map(|&l| u64::from(l)).sum();
        let avg_doc_length = total as f64 / num_docs as f64;
        let doc_lookup = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i as DocId))
            .collect();

        tracing::info!(num_docs, num_terms = vocabulary.len(), avg_doc_length, "index built");

        Ok(CorpusIndex {
            tokenizer: self.tokenizer,
            documents: self.documents,
            doc_lookup,
            vocabulary,
            term_frequency,
            document_frequency,
            postings,
            doc_length,
            avg_doc_length,
        })
    }
}

/// Immutable term statistics over a fixed set of documents.
///
/// Holds the tokenizer it was built with so queries are normalized exactly like
/// the documents were. Postings lists are in ascending document order.
pub struct CorpusIndex {
    tokenizer: Box<dyn Tokenizer>,
    documents: Vec<Document>,
    doc_lookup: HashMap<String, DocId>,
    vocabulary: HashMap<String, TermId>,
    term_frequency: Vec<HashMap<TermId, u32>>,
    document_frequency: Vec<u32>,
    postings: Vec<Vec<Posting>>,
    doc_length: Vec<u32>,
    avg_doc_length: f64,
}

impl fmt::Debug for CorpusIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorpusIndex")
            .field("num_docs", &self.num_docs())
            .field("num_terms", &self.num_terms())
            .field("avg_doc_length", &self.avg_doc_length)
            .finish_non_exhaustive()
    }
}

impl CorpusIndex {
    /// Index `documents` in the order given.
    pub fn build<I, T>(documents: I, tokenizer: T) -> Result<Self>
    where
        I: IntoIterator<Item = RawDocument>,
        T: Tokenizer + 'static,
    {
        let mut builder = IndexBuilder::new(tokenizer);
        for doc in documents {
            builder.add_document(doc.id, doc.text)?;
        }
        builder.build()
    }

    pub fn from_source<S, T>(source: &S, tokenizer: T) -> Result<Self>
    where
        S: DocumentSource + ?Sized,
        T: Tokenizer + 'static,
    {
        Self::build(source.load()?, tokenizer)
    }

    pub fn num_docs(&self) -> usize {
        self.documents.len()
    }

    pub fn num_terms(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn avg_doc_length(&self) -> f64 {
        self.avg_doc_length
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, doc_id: DocId) -> Option<&Document> {
        self.documents.get(doc_id as usize)
    }

    pub fn document_by_id(&self, id: &str) -> Option<(DocId, &Document)> {
        let &doc_id = self.doc_lookup.get(id)?;
        Some((doc_id, &self.documents[doc_id as usize]))
    }

    pub fn vocabulary(&self) -> &HashMap<String, TermId> {
        &self.vocabulary
    }

    pub fn term_id(&self, term: &str) -> Option<TermId> {
        self.vocabulary.get(term).copied()
    }

    pub fn document_frequency(&self, term: TermId) -> u32 {
        self.document_frequency.get(term as usize).copied().unwrap_or(0)
    }

    pub fn term_frequency(&self, doc_id: DocId, term: TermId) -> u32 {
        self.term_frequency
            .get(doc_id as usize)
            .and_then(|counts| counts.get(&term))
            .copied()
            .unwrap_or(0)
    }

    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_length.get(doc_id as usize).copied().unwrap_or(0)
    }

    pub fn postings(&self, term: TermId) -> &[Posting] {
        self.postings.get(term as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        self.tokenizer.normalize(text)
    }

    /// Tokenize a query and map it onto the vocabulary. Repeated tokens are
    /// kept; tokens the corpus never saw are dropped.
    pub fn query_terms(&self, query: &str) -> Vec<TermId> {
        self.tokenize(query).iter().filter_map(|t| self.term_id(t)).collect()
    }

    /// Turn raw per-document scores into a ranked list.
    pub(crate) fn rank<I>(&self, scores: I, top_k: usize) -> Vec<ScoredResult>
    where
        I: IntoIterator<Item = (DocId, f64)>,
    {
        if top_k == 0 {
            return Vec::new();
        }
        let results = scores
            .into_iter()
            .filter(|(_, score)| is_rankable(*score))
            .map(|(doc_id, score)| ScoredResult {
                doc_id,
                id: self.documents[doc_id as usize].id.clone(),
                score,
            })
            .collect();
        finalize_ranking(results, top_k)
    }
}

fn is_rankable(score: f64) -> bool {
    score.is_finite() && score > 0.0
}

/// Drops non-positive scores, orders by score descending then `DocId`
/// ascending, keeps `top_k`.
pub(crate) fn finalize_ranking(mut results: Vec<ScoredResult>, top_k: usize) -> Vec<ScoredResult> {
    results.retain(|r| is_rankable(r.score));
    results.sort_unstable_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.doc_id.cmp(&b.doc_id)));
    results.truncate(top_k);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::PlainTokenizer;

    fn docs(pairs: &[(&str, &str)]) -> Vec<RawDocument> {
        pairs.iter().map(|(id, text)| RawDocument::new(*id, *text)).collect()
    }

    #[test]
    fn computes_term_statistics() {
        let index = CorpusIndex::build(
            docs(&[("a", "cat sat mat cat"), ("b", "dog sat"), ("c", "")]),
            PlainTokenizer,
        )
        .unwrap();

        assert_eq!(index.num_docs(), 3);
        assert_eq!(index.num_terms(), 4);
        let cat = index.term_id("cat").unwrap();
        let sat = index.term_id("sat").unwrap();
        assert_eq!(index.term_frequency(0, cat), 2);
        assert_eq!(index.document_frequency(cat), 1);
        assert_eq!(index.document_frequency(sat), 2);
        assert_eq!(index.doc_length(0), 4);
        assert_eq!(index.doc_length(2), 0);
        assert!((index.avg_doc_length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn term_ids_follow_first_occurrence() {
        let index = CorpusIndex::build(docs(&[("a", "x y"), ("b", "z x")]), PlainTokenizer).unwrap();
        assert_eq!(index.term_id("x"), Some(0));
        assert_eq!(index.term_id("y"), Some(1));
        assert_eq!(index.term_id("z"), Some(2));
    }

    #[test]
    fn document_frequency_matches_postings() {
        let index = CorpusIndex::build(
            docs(&[("a", "one two two"), ("b", "two three"), ("c", "three three one")]),
            PlainTokenizer,
        )
        .unwrap();
        for tid in 0..index.num_terms() as TermId {
            let containing = (0..index.num_docs() as DocId)
                .filter(|&d| index.term_frequency(d, tid) > 0)
                .count() as u32;
            assert_eq!(index.document_frequency(tid), containing);
            assert_eq!(index.postings(tid).len() as u32, containing);
        }
    }

    #[test]
    fn empty_corpus_is_rejected() {
        let err = CorpusIndex::build(Vec::new(), PlainTokenizer).unwrap_err();
        assert!(matches!(err, Error::EmptyCorpus));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = CorpusIndex::build(docs(&[("a", "x"), ("a", "y")]), PlainTokenizer).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn builder_reports_duplicates_at_add_time() {
        let mut builder = IndexBuilder::new(PlainTokenizer);
        builder.add_document("a", "x").unwrap();
        assert!(builder.add_document("a", "y").is_err());
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn query_terms_keep_repeats_and_drop_unknown() {
        let index = CorpusIndex::build(docs(&[("a", "cat dog")]), PlainTokenizer).unwrap();
        let cat = index.term_id("cat").unwrap();
        assert_eq!(index.query_terms("cat CAT bird"), vec![cat, cat]);
    }

    #[test]
    fn lookup_by_external_id() {
        let index = CorpusIndex::build(docs(&[("a", "x"), ("b", "y")]), PlainTokenizer).unwrap();
        let (doc_id, doc) = index.document_by_id("b").unwrap();
        assert_eq!(doc_id, 1);
        assert_eq!(doc.text, "y");
        assert!(index.document_by_id("zzz").is_none());
    }

    #[test]
    fn rank_orders_and_breaks_ties_by_position() {
        let index = CorpusIndex::build(docs(&[("a", "x"), ("b", "x"), ("c", "x")]), PlainTokenizer).unwrap();
        let ranked = index.rank(vec![(2, 1.0), (1, 1.0), (0, 0.0), (0, 2.0)], 10);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert!(index.rank(vec![(0, 1.0)], 0).is_empty());
    }
}
