//! Error types for the `wt-rag` crate.

use std::fmt;

use thiserror::Error;

/// A single rejected corpus record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Zero-based position of the record in the source file.
    pub index: usize,
    /// What was wrong with it.
    pub reason: String,
}

/// Every record rejected during one ingestion batch.
///
/// Ingestion is all-or-nothing: a batch with any invalid record produces a
/// report instead of a partial corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// The rejected records, in file order.
    pub failures: Vec<RecordFailure>,
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} record(s) rejected", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; [{}] {}", failure.index, failure.reason)?;
        }
        Ok(())
    }
}

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// One or more corpus records failed validation.
    #[error("corpus validation failed: {0}")]
    Validation(ValidationReport),

    /// An embedding call failed or was given empty input.
    #[error("embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A vector's length does not match the index dimension.
    #[error("dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the index was created with.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },

    /// A caller supplied a bad argument (zero `k`, malformed filter, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage or the model service was unreachable or timed out.
    #[error("transport error ({endpoint}): {message}")]
    Transport {
        /// The file path or service endpoint involved.
        endpoint: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
