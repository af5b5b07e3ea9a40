//! JSON-file-persisted vector store.
//!
//! [`JsonFileVectorStore`] has the same semantics as the
//! [in-memory store](crate::inmemory) but snapshots every mutation to a
//! single JSON file, written to a temp path and renamed so a crash mid-write
//! leaves the previous snapshot intact. The snapshot is loaded once in
//! [`open`](JsonFileVectorStore::open); reads are then served from memory,
//! which keeps query serving lock-light and restart-safe.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::{Collection, VectorStore};

/// A [`VectorStore`] persisted as one JSON snapshot on local storage.
pub struct JsonFileVectorStore {
    path: PathBuf,
    collections: RwLock<HashMap<String, Collection>>,
}

impl JsonFileVectorStore {
    /// Open a store at `path`, loading the existing snapshot if there is one.
    ///
    /// Parent directories are created as needed. A corrupt snapshot fails
    /// with [`RagError::Transport`] rather than silently starting empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| io_error(&path, "failed to create index directory", e))?;
            }
        }

        let collections: HashMap<String, Collection> = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| RagError::Transport {
                endpoint: path.display().to_string(),
                message: format!("corrupt index snapshot: {e}"),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(io_error(&path, "failed to read index snapshot", e)),
        };

        info!(
            path = %path.display(),
            collection_count = collections.len(),
            "opened vector index"
        );
        Ok(Self { path, collections: RwLock::new(collections) })
    }

    /// Write the snapshot to a temp file, then rename over the live one.
    ///
    /// Callers hold the write lock across mutate-and-persist so a concurrent
    /// mutation cannot interleave between the two.
    async fn persist(&self, collections: &HashMap<String, Collection>) -> Result<()> {
        let bytes = serde_json::to_vec(collections).map_err(|e| RagError::Transport {
            endpoint: self.path.display().to_string(),
            message: format!("failed to encode index snapshot: {e}"),
        })?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_error(&self.path, "failed to write index snapshot", e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| io_error(&self.path, "failed to replace index snapshot", e))?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "persisted vector index");
        Ok(())
    }
}

fn io_error(path: &Path, what: &str, e: std::io::Error) -> RagError {
    RagError::Transport { endpoint: path.display().to_string(), message: format!("{what}: {e}") }
}

#[async_trait]
impl VectorStore for JsonFileVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        match collections.get(name) {
            Some(existing) if existing.dimensions != dimensions => {
                return Err(RagError::DimensionMismatch {
                    expected: existing.dimensions,
                    actual: dimensions,
                });
            }
            Some(_) => return Ok(()),
            None => {
                collections.insert(name.to_string(), Collection::new(dimensions));
            }
        }
        self.persist(&collections).await
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.remove(name).is_none() {
            return Ok(());
        }
        self.persist(&collections).await
    }

    async fn upsert(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| {
            RagError::InvalidArgument(format!("unknown collection `{collection}`"))
        })?;
        store.validate_dimensions(chunks)?;
        store.upsert(chunks);
        self.persist(&collections).await
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
            None => Ok(Vec::new()),
        }
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).map_or(0, |store| store.entries.len()))
    }
}
