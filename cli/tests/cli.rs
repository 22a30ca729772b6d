//! Command-line contract tests for `irlite`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn irlite() -> Command {
    Command::cargo_bin("irlite").expect("binary built")
}

fn write_corpus(dir: &Path) {
    fs::write(dir.join("doc1"), "cat sat mat").unwrap();
    fs::write(dir.join("doc2"), "dog sat log").unwrap();
    fs::write(dir.join("doc3"), "cat dog bird").unwrap();
}

#[test]
fn search_prints_both_rankings() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_corpus(tmp.path());

    irlite()
        .args(["--corpus", tmp.path().to_str().unwrap(), "search", "--query", "cat dog"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- TF-IDF Results ---"))
        .stdout(predicate::str::contains("--- BM25 Results ---"))
        .stdout(predicate::str::contains("1. doc3 | Score:"));
}

#[test]
fn hybrid_rejects_bad_weights() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_corpus(tmp.path());

    irlite()
        .args([
            "--corpus",
            tmp.path().to_str().unwrap(),
            "search",
            "--query",
            "cat",
            "--mode",
            "hybrid",
            "--tfidf-weight",
            "0.4",
            "--bm25-weight",
            "0.5",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("weights must sum to 1.0"));
}

#[test]
fn eval_reports_precision() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let corpus = tmp.path().join("corpus");
    fs::create_dir(&corpus).unwrap();
    write_corpus(&corpus);
    let judgments = tmp.path().join("judgments.jsonl");
    fs::write(&judgments, "{\"query\":\"cat dog\",\"relevant\":[\"doc3\"]}\n").unwrap();

    irlite()
        .args([
            "--corpus",
            corpus.to_str().unwrap(),
            "eval",
            "--judgments",
            judgments.to_str().unwrap(),
            "--k",
            "2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("TF-IDF P@2: 0.500"));
}

#[test]
fn empty_corpus_fails() {
    let tmp = tempfile::tempdir().expect("tempdir");
    irlite()
        .args(["--corpus", tmp.path().to_str().unwrap(), "search", "--query", "cat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("corpus is empty"));
}

#[test]
fn repl_reads_until_exit() {
    let tmp = tempfile::tempdir().expect("tempdir");
    write_corpus(tmp.path());
    irlite()
        .args(["--corpus", tmp.path().to_str().unwrap(), "repl"])
        .write_stdin("bird\n\nexit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. doc3"))
        .stdout(predicate::str::contains("Exiting."));
}
