//! In-memory vector store.
//!
//! [`InMemoryVectorStore`] keeps collections in a `HashMap` behind a
//! `tokio::sync::RwLock`. Suitable for tests, demos, and small corpora; the
//! [JSON-file store](crate::jsonfile) shares its semantics and adds
//! persistence.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{Collection, VectorStore};

/// An in-memory vector store using cosine distance for search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        match collections.get(name) {
            Some(existing) if existing.dimensions != dimensions => {
                Err(RagError::DimensionMismatch {
                    expected: existing.dimensions,
                    actual: dimensions,
                })
            }
            Some(_) => Ok(()),
            None => {
                collections.insert(name.to_string(), Collection::new(dimensions));
                Ok(())
            }
        }
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        collections.remove(name);
        Ok(())
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| {
            RagError::InvalidArgument(format!("unknown collection `{collection}`"))
        })?;
        store.validate_dimensions(chunks)?;
        store.upsert(chunks);
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        match collections.get(collection) {
            Some(store) => store.rank(embedding, top_k),
            // An index that was never built serves no context, not an error.
            None => Ok(Vec::new()),
        }
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |store| store.entries.len()))
    }
}
