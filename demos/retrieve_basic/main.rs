//! # Basic Retrieval Demo
//!
//! Indexes a handful of writing-craft passages and queries them.
//!
//! Uses `InMemoryVectorStore` and a deterministic hash-based embedder so it
//! runs with **zero API keys**.
//!
//! Run: `cargo run --example retrieve_basic`

use std::sync::Arc;

use wt_rag::{Category, Chunk, EmbeddingProvider, InMemoryVectorStore, Retriever};

// ---------------------------------------------------------------------------
// HashEmbedder — deterministic hash-based embeddings for demos
// ---------------------------------------------------------------------------

struct HashEmbedder {
    dimensions: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> wt_rag::Result<Vec<f32>> {
        // Hash the text bytes, then generate a normalized vector whose
        // direction depends on the content.
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn passage(id: &str, text: &str, book: &str, author: &str) -> Chunk {
    Chunk {
        id: id.into(),
        text: text.into(),
        book_title: book.into(),
        author: author.into(),
        chapter: None,
        category: Category::Craft,
        embedding: Vec::new(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let retriever = Retriever::builder()
        .embedder(Arc::new(HashEmbedder { dimensions: 64 }))
        .store(Arc::new(InMemoryVectorStore::new()))
        .build()?;

    let corpus = vec![
        passage(
            "craft_0",
            "Perfectionism is the voice of the oppressor. Get the first draft down; \
             you can fix it later.",
            "Bird by Bird",
            "Lamott",
        ),
        passage(
            "craft_1",
            "The scariest moment is always just before you start. Write with the \
             door closed, rewrite with the door open.",
            "On Writing",
            "King",
        ),
        passage(
            "craft_2",
            "A scene that does not turn — that ends where it began in value terms — \
             is a nonevent and should be cut.",
            "Story",
            "McKee",
        ),
    ];

    println!("Indexing {} passages...", corpus.len());
    let indexed = retriever.ensure_indexed(Category::Craft, &corpus).await?;
    println!("  {indexed} passage(s) embedded and stored");

    let queries = ["how do I start a first draft", "when should I cut a scene"];

    for query in &queries {
        println!("\nQuery: \"{query}\"");
        let results = retriever.retrieve(query, 2, None).await?;
        for (i, result) in results.iter().enumerate() {
            println!(
                "  {}. [distance={:.4}] {} — «{}»",
                i + 1,
                result.distance,
                result.chunk.author,
                result.chunk.book_title,
            );
        }
    }

    // The context block is what the prompt layer appends to the model input.
    let block = retriever.context_for_query("how do I start a first draft", None).await?;
    println!("\n{block}");

    Ok(())
}
