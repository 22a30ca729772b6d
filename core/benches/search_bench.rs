use criterion::{criterion_group, criterion_main, Criterion};
use irlite_core::tokenizer::{StemmingTokenizer, Tokenizer};
use irlite_core::{Bm25Scorer, CorpusIndex, RawDocument, TfidfScorer};

const WORDS: &[&str] = &[
    "retrieval", "ranking", "documents", "query", "relevance", "index", "terms", "weighting",
    "probabilistic", "vector", "space", "models", "evaluation", "precision", "recall", "corpus",
];

fn corpus(n: usize) -> Vec<RawDocument> {
    (0..n)
        .map(|i| {
            let text: Vec<&str> = (0..40).map(|j| WORDS[(i * 7 + j * 3) % WORDS.len()]).collect();
            RawDocument::new(format!("doc{i}"), text.join(" "))
        })
        .collect()
}

fn bench_tokenize(c: &mut Criterion) {
    let text = corpus(1)[0].text.repeat(50);
    c.bench_function("tokenize_2000_words", |b| b.iter(|| StemmingTokenizer.normalize(&text)));
}

fn bench_search(c: &mut Criterion) {
    let index = CorpusIndex::build(corpus(2_000), StemmingTokenizer).expect("non-empty corpus");
    c.bench_function("tfidf_search", |b| b.iter(|| TfidfScorer::new(&index).search("ranking relevance models", 10)));
    c.bench_function("bm25_search", |b| {
        b.iter(|| Bm25Scorer::with_defaults(&index).search("ranking relevance models", 10))
    });
}

criterion_group!(benches, bench_tokenize, bench_search);
criterion_main!(benches);
