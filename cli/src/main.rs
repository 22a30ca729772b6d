use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use irlite_core::config::{DEFAULT_B, DEFAULT_K1, DEFAULT_TOP_K};
use irlite_core::{
    evaluate_query, open_source, precision_at_k, summarize, Bm25Params, CorpusIndex, HybridWeights, PlainTokenizer,
    QueryEvaluation, RetrievalEngine, ScoredResult, SearchMode, StemmingTokenizer,
};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "irlite")]
#[command(about = "Rank a local corpus with TF-IDF and BM25", long_about = None)]
struct Cli {
    #[command(flatten)]
    corpus: CorpusArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Corpus directory (one document per file) or JSONL file of {"id", "text"} records
    #[arg(long)]
    corpus: PathBuf,
    /// BM25 term-frequency saturation
    #[arg(long, default_value_t = DEFAULT_K1)]
    k1: f64,
    /// BM25 length normalization
    #[arg(long, default_value_t = DEFAULT_B)]
    b: f64,
    /// Lowercase alphanumeric tokens only: no stopwords, no stemming
    #[arg(long, default_value_t = false)]
    plain: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query and print the ranking
    Search {
        #[arg(long)]
        query: String,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
        /// tfidf, bm25 or hybrid; both TF-IDF and BM25 are shown when omitted
        #[arg(long)]
        mode: Option<SearchMode>,
        #[arg(long, default_value_t = 0.5)]
        tfidf_weight: f64,
        #[arg(long, default_value_t = 0.5)]
        bm25_weight: f64,
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Score queries from a JSONL judgments file ({"query", "relevant": [ids]}) with precision@k
    Eval {
        #[arg(long)]
        judgments: PathBuf,
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        k: usize,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Interactive loop: query, inspect both rankings, optionally judge relevance
    Repl {
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top_k: usize,
    },
}

#[derive(Debug, Deserialize)]
struct Judgment {
    query: String,
    relevant: Vec<String>,
}

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    mode: String,
    results: &'a [ScoredResult],
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();
    let engine = load_engine(&cli.corpus)?;

    match cli.command {
        Commands::Search { query, top_k, mode, tfidf_weight, bm25_weight, json } => {
            let weights = HybridWeights { tfidf: tfidf_weight, bm25: bm25_weight };
            run_search(&engine, &query, top_k, mode, weights, json)
        }
        Commands::Eval { judgments, k, json } => run_eval(&engine, &judgments, k, json),
        Commands::Repl { top_k } => {
            let stdin = io::stdin();
            run_repl(&engine, top_k, stdin.lock(), io::stdout())
        }
    }
}

fn load_engine(args: &CorpusArgs) -> Result<RetrievalEngine> {
    let params = Bm25Params::new(args.k1, args.b)?;
    let source = open_source(&args.corpus);
    let index = if args.plain {
        CorpusIndex::from_source(source.as_ref(), PlainTokenizer)
    } else {
        CorpusIndex::from_source(source.as_ref(), StemmingTokenizer)
    }
    .with_context(|| format!("building index from {}", args.corpus.display()))?;
    tracing::info!(num_docs = index.num_docs(), num_terms = index.num_terms(), "index ready");
    Ok(RetrievalEngine::new(Arc::new(index), params)?)
}

fn run_search(
    engine: &RetrievalEngine,
    query: &str,
    top_k: usize,
    mode: Option<SearchMode>,
    weights: HybridWeights,
    json: bool,
) -> Result<()> {
    let runs: Vec<(SearchMode, Vec<ScoredResult>)> = match mode {
        Some(mode) => vec![(mode, engine.search(mode, query, top_k, weights)?)],
        None => vec![
            (SearchMode::Tfidf, engine.tfidf_search(query, top_k)),
            (SearchMode::Bm25, engine.bm25_search(query, top_k)),
        ],
    };

    let mut out = io::stdout().lock();
    for (mode, results) in &runs {
        if json {
            let payload = SearchOutput { query, mode: mode.to_string(), results };
            writeln!(out, "{}", serde_json::to_string(&payload)?)?;
        } else {
            print_results(&mut out, title(*mode), results)?;
        }
    }
    Ok(())
}

fn title(mode: SearchMode) -> &'static str {
    match mode {
        SearchMode::Tfidf => "TF-IDF",
        SearchMode::Bm25 => "BM25",
        SearchMode::Hybrid => "Hybrid",
    }
}

fn print_results<W: Write>(out: &mut W, title: &str, results: &[ScoredResult]) -> io::Result<()> {
    writeln!(out, "\n--- {title} Results ---")?;
    if results.is_empty() {
        return writeln!(out, "No results found.");
    }
    for (rank, r) in results.iter().enumerate() {
        writeln!(out, "{}. {} | Score: {:.6}", rank + 1, r.id, r.score)?;
    }
    Ok(())
}

fn run_eval(engine: &RetrievalEngine, path: &Path, k: usize, json: bool) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening judgments {}", path.display()))?;
    let mut evaluations: Vec<QueryEvaluation> = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let judgment: Judgment = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}: malformed judgment", path.display(), n + 1))?;
        evaluations.push(evaluate_query(engine, &judgment.query, &judgment.relevant, k)?);
    }

    let summary = summarize(&evaluations);
    let mut out = io::stdout().lock();
    if json {
        let payload = serde_json::json!({ "queries": evaluations, "summary": summary });
        writeln!(out, "{}", serde_json::to_string_pretty(&payload)?)?;
        return Ok(());
    }
    for e in &evaluations {
        writeln!(
            out,
            "{} | TF-IDF P@{k}: {:.3} | BM25 P@{k}: {:.3} | {:.6}s",
            e.query, e.tfidf_precision, e.bm25_precision, e.response_time_sec
        )?;
    }
    match summary {
        Some(s) => writeln!(
            out,
            "mean over {} queries | TF-IDF P@{k}: {:.3} | BM25 P@{k}: {:.3}",
            s.queries, s.mean_tfidf_precision, s.mean_bm25_precision
        )?,
        None => writeln!(out, "no judgments found")?,
    }
    Ok(())
}

/// Prompts for queries until `exit` or end of input.
fn run_repl<R: BufRead, W: Write>(engine: &RetrievalEngine, top_k: usize, mut input: R, mut out: W) -> Result<()> {
    writeln!(out, "\nSimple local IR system (TF-IDF + BM25). Type 'exit' to quit.")?;
    loop {
        write!(out, "\nEnter your search query (or 'exit'): ")?;
        out.flush()?;
        let Some(query) = read_line(&mut input)? else { break };
        if query.eq_ignore_ascii_case("exit") {
            writeln!(out, "Exiting.")?;
            break;
        }
        if query.is_empty() {
            writeln!(out, "Please enter a non-empty query.")?;
            continue;
        }

        let tfidf = engine.tfidf_search(&query, top_k);
        let bm25 = engine.bm25_search(&query, top_k);
        print_results(&mut out, "TF-IDF", &tfidf)?;
        print_results(&mut out, "BM25", &bm25)?;

        writeln!(out, "\n--- Evaluation ---")?;
        writeln!(out, "Enter relevant document IDs (comma-separated), or press Enter to skip.")?;
        write!(out, "Relevant document IDs: ")?;
        out.flush()?;
        let relevant: Vec<String> = read_line(&mut input)?
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if relevant.is_empty() || top_k == 0 {
            writeln!(out, "Evaluation skipped.")?;
            continue;
        }
        writeln!(out, "TF-IDF P@{top_k}: {:.3}", precision_at_k(&tfidf, &relevant, top_k)?)?;
        writeln!(out, "BM25 P@{top_k}: {:.3}", precision_at_k(&bm25, &relevant, top_k)?)?;
    }
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
