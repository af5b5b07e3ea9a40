//! Vector store trait: persistence and nearest-neighbor search for
//! embeddings.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// A storage backend for chunk embeddings with cosine-distance search.
///
/// Collections hold one fixed embedding dimension each. Implementations keep
/// search deterministic: ascending distance, ties resolved by insertion
/// order. Unknown or empty collections answer searches with an empty result
/// so an index that was never built degrades to "no context" instead of
/// failing.
///
/// # Example
///
/// ```rust,ignore
/// use wt_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new();
/// store.create_collection("writers_craft", 384).await?;
/// store.upsert("writers_craft", &chunks).await?;
/// let results = store.search("writers_craft", &query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection. No-op when it already exists with the same
    /// dimension; a dimension conflict fails with
    /// [`RagError::DimensionMismatch`].
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Drop a collection and all its entries.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Insert or replace chunks by id. Last write wins per id; an entry keeps
    /// its first-insertion position for tie-breaking. Every embedding is
    /// validated against the collection dimension before anything lands, so a
    /// bad batch leaves the collection untouched.
    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Up to `top_k` entries by ascending cosine distance to `embedding`.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;

    /// Number of entries in the collection; 0 when it does not exist.
    async fn count(&self, collection: &str) -> Result<usize>;
}

/// Cosine distance (1 − cosine similarity), in `[0, 2]`.
///
/// A zero-magnitude vector has no direction; it scores the neutral distance
/// 1.0 against everything, so degenerate queries still rank by tie-break
/// instead of failing.
pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

/// One stored entry: a chunk plus its insertion sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Entry {
    pub(crate) seq: u64,
    pub(crate) chunk: Chunk,
}

/// Map-backed collection state shared by the in-memory and JSON-file stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Collection {
    pub(crate) dimensions: usize,
    pub(crate) next_seq: u64,
    pub(crate) entries: HashMap<String, Entry>,
}

impl Collection {
    pub(crate) fn new(dimensions: usize) -> Self {
        Self { dimensions, next_seq: 0, entries: HashMap::new() }
    }

    /// All-or-nothing dimension check, run before any insert.
    pub(crate) fn validate_dimensions(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            if chunk.embedding.len() != self.dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: chunk.embedding.len(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn upsert(&mut self, chunks: &[Chunk]) {
        for chunk in chunks {
            match self.entries.get_mut(&chunk.id) {
                // Last write wins; the original sequence number stays so
                // re-ingestion does not reshuffle tie-breaks.
                Some(entry) => entry.chunk = chunk.clone(),
                None => {
                    let seq = self.next_seq;
                    self.next_seq += 1;
                    self.entries.insert(chunk.id.clone(), Entry { seq, chunk: chunk.clone() });
                }
            }
        }
    }

    pub(crate) fn rank(&self, embedding: &[f32], top_k: usize) -> Result<Vec<SearchResult>> {
        if embedding.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
            });
        }

        let mut scored: Vec<(f32, u64, &Chunk)> = self
            .entries
            .values()
            .map(|entry| {
                (cosine_distance(&entry.chunk.embedding, embedding), entry.seq, &entry.chunk)
            })
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(distance, _, chunk)| SearchResult { chunk: chunk.clone(), distance })
            .collect())
    }
}
