//! Data types for corpus chunks and search results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Topical corpus category. Each category is indexed in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Plot and craft books.
    Craft,
    /// Style and language books.
    Style,
    /// Editorial and translation books.
    Editorial,
}

impl Category {
    /// All categories, in their fixed search order.
    pub const ALL: [Category; 3] = [Category::Craft, Category::Style, Category::Editorial];

    /// Lowercase name used in chunk ids, file names, and log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Craft => "craft",
            Category::Style => "style",
            Category::Editorial => "editorial",
        }
    }

    /// Name of the vector collection holding this category's chunks.
    pub fn collection(self) -> &'static str {
        match self {
            Category::Craft => "writers_craft",
            Category::Style => "writers_style",
            Category::Editorial => "writers_editorial",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One indexed passage of a writing-craft book.
///
/// Chunks are immutable once ingested; corpus updates are modeled as full
/// re-ingestion or additive ingestion of new ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier, stable across reloads of the same corpus file.
    pub id: String,
    /// The passage text.
    pub text: String,
    /// Title of the source book.
    pub book_title: String,
    /// Author of the source book.
    pub author: String,
    /// Chapter the passage came from, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    /// Which corpus category the chunk belongs to.
    pub category: Category,
    /// Vector embedding; empty until the chunk is indexed.
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// A retrieved [`Chunk`] with its cosine distance to the query.
///
/// Smaller distance means a closer match; result lists are ordered ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine distance to the query vector.
    pub distance: f32,
}
