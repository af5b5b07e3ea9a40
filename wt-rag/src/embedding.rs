//! Embedding provider trait for turning text into vectors.

use async_trait::async_trait;

use crate::error::{RagError, Result};

/// A backend that produces fixed-dimension vector embeddings from text.
///
/// `embed` must be deterministic for a fixed model and input, and must fail
/// with [`RagError::Embedding`] on empty input. The default
/// [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially and names the failing
/// element; backends with native batching should override it and keep that
/// contract.
///
/// # Example
///
/// ```rust,ignore
/// use wt_rag::EmbeddingProvider;
///
/// let embedding = provider.embed("show, don't tell").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving order and length.
    ///
    /// A failure is tagged with the index of the element that caused it, so
    /// callers can tell which record of an ingestion batch was at fault.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for (index, text) in texts.iter().enumerate() {
            results.push(self.embed(text).await.map_err(|e| at_batch_index(index, e))?);
        }
        Ok(results)
    }

    /// Dimensionality of every vector this provider produces.
    fn dimensions(&self) -> usize;
}

/// Tag an error with the batch element it came from.
pub(crate) fn at_batch_index(index: usize, error: RagError) -> RagError {
    match error {
        RagError::Embedding { provider, message } => RagError::Embedding {
            provider,
            message: format!("batch element {index}: {message}"),
        },
        RagError::Transport { endpoint, message } => RagError::Transport {
            endpoint,
            message: format!("batch element {index}: {message}"),
        },
        other => other,
    }
}
