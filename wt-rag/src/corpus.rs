//! Corpus loading: external JSON chunk files into validated [`Chunk`]s.
//!
//! Corpus files are produced by external chunking tooling; this module only
//! consumes them. A file is either a bare array of records or an object with
//! a `chunks` array. Validation is all-or-nothing per file: any rejected
//! record aborts the load with a [`ValidationReport`] naming every failure,
//! so a partially-valid file never yields a partial corpus.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::document::{Category, Chunk};
use crate::error::{RagError, RecordFailure, Result, ValidationReport};

/// Record id as it appears in the corpus file, string or integer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// A string id, e.g. `"king_on_writing_12"`.
    Text(String),
    /// A numeric id.
    Number(u64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{n}"),
        }
    }
}

/// One raw record from a corpus file, before validation.
///
/// All fields are optional at the parse stage so that a malformed record is
/// reported by position instead of failing the whole file with a serde error.
/// Extra fields written by the chunking tooling (`chunk_index`,
/// `total_chunks`, `category`, ...) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CorpusRecord {
    /// Optional stable id; assigned from the record position when absent.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// The passage text.
    #[serde(default)]
    pub text: Option<String>,
    /// Title of the source book.
    #[serde(default)]
    pub book_title: Option<String>,
    /// Author of the source book.
    #[serde(default)]
    pub author: Option<String>,
    /// Chapter, when the tooling could detect one.
    #[serde(default)]
    pub chapter: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Records(Vec<CorpusRecord>),
    Wrapped { chunks: Vec<CorpusRecord> },
}

/// Parse and validate one corpus file's JSON content.
///
/// Chunk ids are prefixed with the category name; records without an id get
/// their zero-based position instead, so reloading an unchanged file yields
/// the same ids.
pub fn parse_corpus(json: &str, category: Category) -> Result<Vec<Chunk>> {
    let records = match serde_json::from_str::<CorpusFile>(json) {
        Ok(CorpusFile::Records(records)) => records,
        Ok(CorpusFile::Wrapped { chunks }) => chunks,
        Err(e) => {
            return Err(RagError::Validation(ValidationReport {
                failures: vec![RecordFailure {
                    index: 0,
                    reason: format!("not a corpus file: {e}"),
                }],
            }));
        }
    };
    validate_records(records, category)
}

/// Validate raw records into [`Chunk`]s, preserving order.
pub fn validate_records(records: Vec<CorpusRecord>, category: Category) -> Result<Vec<Chunk>> {
    let mut failures = Vec::new();
    let mut seen = HashSet::new();
    let mut chunks = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let text = record.text.as_deref().unwrap_or("").trim();
        if text.is_empty() {
            failures.push(RecordFailure { index, reason: "missing or empty `text`".into() });
            continue;
        }
        let Some(book_title) = non_blank(record.book_title) else {
            failures.push(RecordFailure { index, reason: "missing `book_title`".into() });
            continue;
        };
        let Some(author) = non_blank(record.author) else {
            failures.push(RecordFailure { index, reason: "missing `author`".into() });
            continue;
        };

        let id = match &record.id {
            Some(given) => format!("{}_{given}", category.as_str()),
            None => format!("{}_{index}", category.as_str()),
        };
        if !seen.insert(id.clone()) {
            failures.push(RecordFailure { index, reason: format!("duplicate id `{id}`") });
            continue;
        }

        chunks.push(Chunk {
            id,
            text: text.to_string(),
            book_title,
            author,
            chapter: non_blank(record.chapter),
            category,
            embedding: Vec::new(),
        });
    }

    if !failures.is_empty() {
        return Err(RagError::Validation(ValidationReport { failures }));
    }
    Ok(chunks)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Load one category's corpus file. A missing file is an empty corpus, not
/// an error.
pub async fn load_corpus_file(path: &Path, category: Category) -> Result<Vec<Chunk>> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), category = %category, "no corpus file");
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(RagError::Transport {
                endpoint: path.display().to_string(),
                message: format!("failed to read corpus file: {e}"),
            });
        }
    };

    let chunks = parse_corpus(&json, category)?;
    info!(
        path = %path.display(),
        category = %category,
        chunk_count = chunks.len(),
        "loaded corpus file"
    );
    Ok(chunks)
}

/// Load the whole library from a data directory.
///
/// Looks for `craft.json`, `style.json`, and `editorial.json`. When none of
/// them yields any chunks, falls back to `book_chunks.json` loaded as
/// [`Category::Craft`] (older data layouts ship a single combined file).
pub async fn load_library(data_dir: &Path) -> Result<Vec<(Category, Vec<Chunk>)>> {
    let mut library = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let path = data_dir.join(format!("{}.json", category.as_str()));
        library.push((category, load_corpus_file(&path, category).await?));
    }

    if library.iter().all(|(_, chunks)| chunks.is_empty()) {
        let fallback = data_dir.join("book_chunks.json");
        let chunks = load_corpus_file(&fallback, Category::Craft).await?;
        if let Some(slot) = library.iter_mut().find(|(c, _)| *c == Category::Craft) {
            slot.1 = chunks;
        }
    }
    Ok(library)
}
