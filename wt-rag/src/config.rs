//! Retriever configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Tunables for the retriever.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrieverConfig {
    /// Number of passages fetched by the context helper.
    pub context_chunks: usize,
    /// Passage truncation length, in characters, in the formatted context
    /// block.
    pub snippet_max_chars: usize,
    /// Deadline for one embedding call, in milliseconds. Batch calls get one
    /// deadline per element, pooled.
    pub embed_timeout_ms: u64,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self { context_chunks: 3, snippet_max_chars: 500, embed_timeout_ms: 30_000 }
    }
}

impl RetrieverConfig {
    /// Create a new builder for constructing a [`RetrieverConfig`].
    pub fn builder() -> RetrieverConfigBuilder {
        RetrieverConfigBuilder::default()
    }

    /// The embedding deadline as a [`Duration`].
    pub fn embed_timeout(&self) -> Duration {
        Duration::from_millis(self.embed_timeout_ms)
    }
}

/// Builder for constructing a validated [`RetrieverConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetrieverConfigBuilder {
    config: RetrieverConfig,
}

impl RetrieverConfigBuilder {
    /// Set the number of passages fetched by the context helper.
    pub fn context_chunks(mut self, count: usize) -> Self {
        self.config.context_chunks = count;
        self
    }

    /// Set the passage truncation length in characters.
    pub fn snippet_max_chars(mut self, chars: usize) -> Self {
        self.config.snippet_max_chars = chars;
        self
    }

    /// Set the embedding deadline.
    pub fn embed_timeout(mut self, timeout: Duration) -> Self {
        self.config.embed_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Build the [`RetrieverConfig`], validating that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] if any parameter is zero.
    pub fn build(self) -> Result<RetrieverConfig> {
        if self.config.context_chunks == 0 {
            return Err(RagError::InvalidArgument("context_chunks must be at least 1".into()));
        }
        if self.config.snippet_max_chars == 0 {
            return Err(RagError::InvalidArgument("snippet_max_chars must be at least 1".into()));
        }
        if self.config.embed_timeout_ms == 0 {
            return Err(RagError::InvalidArgument("embed_timeout must be non-zero".into()));
        }
        Ok(self.config)
    }
}
