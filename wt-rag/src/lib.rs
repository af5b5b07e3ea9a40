//! Retrieval core for the Writer's Tears writing coach.
//!
//! This crate provides:
//! - Corpus loading and validation for writing-craft book chunks
//! - An embedding provider seam, with an OpenAI-compatible backend behind
//!   the `openai` feature
//! - In-memory and JSON-file-persisted vector stores with cosine search
//! - A [`Retriever`] that turns a free-text query into ranked passages
//! - Context-block formatting and a keyword fallback for embedder-less
//!   setups

pub mod config;
pub mod context;
pub mod corpus;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod jsonfile;
pub mod lexical;
#[cfg(feature = "openai")]
pub mod openai;
pub mod retriever;
pub mod vectorstore;

pub use config::{RetrieverConfig, RetrieverConfigBuilder};
pub use context::format_context;
pub use corpus::{
    CorpusRecord, RecordId, load_corpus_file, load_library, parse_corpus, validate_records,
};
pub use document::{Category, Chunk, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, RecordFailure, Result, ValidationReport};
pub use inmemory::InMemoryVectorStore;
pub use jsonfile::JsonFileVectorStore;
pub use lexical::keyword_search;
#[cfg(feature = "openai")]
pub use openai::OpenAiEmbeddings;
pub use retriever::{Retriever, RetrieverBuilder, SearchFilter};
pub use vectorstore::VectorStore;
