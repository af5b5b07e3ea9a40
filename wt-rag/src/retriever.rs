//! Query orchestration: embed, search, filter, rank.
//!
//! [`Retriever`] owns the embed-then-search sequence on the query path and
//! the embed-then-upsert sequence on the ingestion path. It is constructed
//! once at process start and shared by reference; it holds no per-request
//! state, so concurrent queries only contend on the store's read lock.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wt_rag::{Category, InMemoryVectorStore, Retriever};
//!
//! let retriever = Retriever::builder()
//!     .embedder(Arc::new(embedder))
//!     .store(Arc::new(InMemoryVectorStore::new()))
//!     .build()?;
//!
//! retriever.ensure_indexed(Category::Craft, &chunks).await?;
//! let results = retriever.retrieve("how do I pace a scene", 3, None).await?;
//! ```

use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, error, info};

use crate::config::RetrieverConfig;
use crate::context::format_context;
use crate::document::{Category, Chunk, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// Optional metadata restrictions applied to a retrieval.
///
/// The category restriction narrows the search to one collection before the
/// vector query runs; the provenance restrictions are applied to the results
/// afterwards, before truncation to `k`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    /// Search only this category's collection.
    pub category: Option<Category>,
    /// Keep only results from this book (exact title match).
    pub book_title: Option<String>,
    /// Keep only results by this author (exact match).
    pub author: Option<String>,
}

impl SearchFilter {
    fn validate(&self) -> Result<()> {
        if self.book_title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(RagError::InvalidArgument("filter `book_title` is empty".into()));
        }
        if self.author.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err(RagError::InvalidArgument("filter `author` is empty".into()));
        }
        Ok(())
    }

    fn matches(&self, chunk: &Chunk) -> bool {
        self.book_title.as_deref().is_none_or(|t| chunk.book_title == t)
            && self.author.as_deref().is_none_or(|a| chunk.author == a)
    }
}

/// Translates free-text queries into ranked supporting passages.
///
/// Construct one via [`Retriever::builder()`].
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    config: RetrieverConfig,
}

impl Retriever {
    /// Create a new [`RetrieverBuilder`].
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::default()
    }

    /// Return a reference to the retriever configuration.
    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Return a reference to the vector store.
    pub fn store(&self) -> &Arc<dyn VectorStore> {
        &self.store
    }

    /// Index a category's chunks, skipping the work when the collection
    /// already holds exactly this many entries.
    ///
    /// Returns the number of chunks embedded and stored (0 on the skip
    /// path). Chunk ids are stable across reloads, so re-running after a
    /// partial failure re-embeds the batch without duplicating entries.
    pub async fn ensure_indexed(&self, category: Category, chunks: &[Chunk]) -> Result<usize> {
        let collection = category.collection();
        self.store.create_collection(collection, self.embedder.dimensions()).await?;

        let existing = self.store.count(collection).await?;
        if existing == chunks.len() {
            debug!(category = %category, chunk_count = existing, "collection already indexed");
            return Ok(0);
        }
        if chunks.is_empty() {
            return Ok(0);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embed_batch_deadline(&texts).await.map_err(|e| {
            error!(category = %category, error = %e, "embedding failed during indexing");
            e
        })?;

        let mut indexed = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            let mut chunk = chunk.clone();
            chunk.embedding = embedding;
            indexed.push(chunk);
        }
        self.store.upsert(collection, &indexed).await?;

        info!(category = %category, chunk_count = indexed.len(), "indexed corpus category");
        Ok(indexed.len())
    }

    /// Retrieve the `k` closest passages for a free-text query.
    ///
    /// Results are ordered by ascending cosine distance; with no category
    /// filter all collections are searched and merged, ties keeping the
    /// fixed category order. An index that was never built (or is empty)
    /// yields an empty result so callers can answer without retrieval
    /// context.
    ///
    /// # Errors
    ///
    /// [`RagError::InvalidArgument`] for `k == 0` or a blank filter field;
    /// embedding and store failures propagate typed.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        filter: Option<&SearchFilter>,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be at least 1".into()));
        }
        if let Some(filter) = filter {
            filter.validate()?;
        }

        let query_embedding = self.embed_deadline(query).await?;

        let categories = match filter.and_then(|f| f.category) {
            Some(category) => vec![category],
            None => Category::ALL.to_vec(),
        };

        let mut merged = Vec::new();
        for category in categories {
            let results = self.store.search(category.collection(), &query_embedding, k).await?;
            merged.extend(results);
        }

        if let Some(filter) = filter {
            merged.retain(|r| filter.matches(&r.chunk));
        }

        // Per-collection results arrive ordered; the stable sort keeps the
        // fixed category order on equal distances.
        merged.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        merged.truncate(k);

        info!(k, result_count = merged.len(), "retrieve completed");
        Ok(merged)
    }

    /// Retrieve the configured number of passages and format them as a
    /// prompt context block.
    ///
    /// Returns an empty string when nothing relevant is indexed, so the
    /// caller can prompt without retrieval context.
    pub async fn context_for_query(
        &self,
        query: &str,
        filter: Option<&SearchFilter>,
    ) -> Result<String> {
        let results = self.retrieve(query, self.config.context_chunks, filter).await?;
        Ok(format_context(
            filter.and_then(|f| f.category),
            &results,
            self.config.snippet_max_chars,
        ))
    }

    async fn embed_deadline(&self, text: &str) -> Result<Vec<f32>> {
        match timeout(self.config.embed_timeout(), self.embedder.embed(text)).await {
            Ok(result) => result.map_err(|e| {
                error!(error = %e, "query embedding failed");
                e
            }),
            Err(_) => Err(self.timeout_error()),
        }
    }

    async fn embed_batch_deadline(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        // One per-text deadline, pooled across the batch.
        let deadline = self.config.embed_timeout().saturating_mul(texts.len() as u32);
        match timeout(deadline, self.embedder.embed_batch(texts)).await {
            Ok(result) => result,
            Err(_) => Err(self.timeout_error()),
        }
    }

    fn timeout_error(&self) -> RagError {
        RagError::Transport {
            endpoint: "embedder".into(),
            message: format!("embedding timed out after {}ms", self.config.embed_timeout_ms),
        }
    }
}

/// Builder for constructing a [`Retriever`].
///
/// The embedder and store are required; the configuration falls back to
/// [`RetrieverConfig::default()`].
#[derive(Default)]
pub struct RetrieverBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn VectorStore>>,
    config: Option<RetrieverConfig>,
}

impl RetrieverBuilder {
    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector store backend.
    pub fn store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the retriever configuration.
    pub fn config(mut self, config: RetrieverConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the [`Retriever`], validating that the required parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if the embedder or store is
    /// missing.
    pub fn build(self) -> Result<Retriever> {
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::InvalidArgument("embedder is required".into()))?;
        let store =
            self.store.ok_or_else(|| RagError::InvalidArgument("store is required".into()))?;

        Ok(Retriever { embedder, store, config: self.config.unwrap_or_default() })
    }
}
