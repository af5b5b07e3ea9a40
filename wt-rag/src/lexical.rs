//! Keyword-overlap fallback search.
//!
//! When no embedding backend is configured the assistant can still surface
//! passages by plain word overlap. Scores map onto the same distance scale
//! as vector search: 0.0 means every query word appears in the chunk,
//! chunks sharing no words are excluded entirely.

use std::collections::HashSet;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};

/// Rank `chunks` by case-insensitive word overlap with `query`.
///
/// Returns up to `k` results ordered by ascending distance, ties keeping the
/// input order. An empty query matches nothing.
pub fn keyword_search(chunks: &[Chunk], query: &str, k: usize) -> Result<Vec<SearchResult>> {
    if k == 0 {
        return Err(RagError::InvalidArgument("k must be at least 1".into()));
    }

    let query_words: HashSet<String> =
        query.split_whitespace().map(|w| w.to_lowercase()).collect();
    if query_words.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored: Vec<SearchResult> = chunks
        .iter()
        .filter_map(|chunk| {
            let chunk_words: HashSet<String> =
                chunk.text.split_whitespace().map(|w| w.to_lowercase()).collect();
            let overlap = query_words.intersection(&chunk_words).count();
            if overlap == 0 {
                return None;
            }
            let score = overlap as f32 / query_words.len() as f32;
            Some(SearchResult { chunk: chunk.clone(), distance: 1.0 - score })
        })
        .collect();

    scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    scored.truncate(k);
    Ok(scored)
}
