//! Document sources: where raw `(id, text)` pairs come from.
//!
//! Sources only read; tokenization and statistics belong to the index builder.

use crate::error::{Error, Result};
use crate::index::RawDocument;
use serde::Deserialize;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Yields an ordered sequence of documents for one index build.
pub trait DocumentSource {
    fn load(&self) -> Result<Vec<RawDocument>>;
}

impl DocumentSource for [RawDocument] {
    fn load(&self) -> Result<Vec<RawDocument>> {
        Ok(self.to_vec())
    }
}

impl DocumentSource for Vec<RawDocument> {
    fn load(&self) -> Result<Vec<RawDocument>> {
        Ok(self.clone())
    }
}

/// Every regular file directly inside a directory, sorted by file name.
/// The file name is the document id.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
}

impl DocumentSource for DirectorySource {
    fn load(&self) -> Result<Vec<RawDocument>> {
        let invalid = |path: &Path, source: std::io::Error| Error::InvalidSource { path: path.to_path_buf(), source };

        if !self.root.is_dir() {
            return Err(invalid(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let mut docs = Vec::new();
        let walker = WalkDir::new(&self.root).min_depth(1).max_depth(1).sort_by_file_name();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&self.root).to_path_buf();
                Error::InvalidSource { path, source: e.into() }
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let bytes = fs::read(path).map_err(|e| invalid(path, e))?;
            let id = entry.file_name().to_string_lossy().into_owned();
            docs.push(RawDocument { id, text: decode_text(bytes) });
        }
        tracing::debug!(root = %self.root.display(), count = docs.len(), "loaded directory");
        Ok(docs)
    }
}

/// UTF-8 when valid, otherwise Latin-1 (every byte maps to one code point).
fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().iter().map(|&b| b as char).collect(),
    }
}

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: String,
    #[serde(alias = "body")]
    text: String,
}

/// One JSON object per line: `{"id": "...", "text": "..."}` (`body` accepted for `text`).
#[derive(Debug, Clone)]
pub struct JsonlSource {
    path: PathBuf,
}

impl JsonlSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl DocumentSource for JsonlSource {
    fn load(&self) -> Result<Vec<RawDocument>> {
        let invalid = |source| Error::InvalidSource { path: self.path.clone(), source };
        let reader = BufReader::new(File::open(&self.path).map_err(invalid)?);
        let mut docs = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.map_err(invalid)?;
            if line.trim().is_empty() {
                continue;
            }
            let doc: InputDoc = serde_json::from_str(&line).map_err(|source| Error::MalformedRecord {
                path: self.path.clone(),
                line: n + 1,
                source,
            })?;
            docs.push(RawDocument { id: doc.id, text: doc.text });
        }
        tracing::debug!(path = %self.path.display(), count = docs.len(), "loaded jsonl");
        Ok(docs)
    }
}

/// Pick a source from a path: directories are read file by file, anything else as JSONL.
pub fn open_source<P: AsRef<Path>>(path: P) -> Box<dyn DocumentSource> {
    let path = path.as_ref();
    if path.is_dir() {
        Box::new(DirectorySource::new(path))
    } else {
        Box::new(JsonlSource::new(path))
    }
}
