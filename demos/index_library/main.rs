//! # Library Indexing Demo
//!
//! Loads a corpus directory (`craft.json` / `style.json` / `editorial.json`,
//! or a combined `book_chunks.json`), indexes it into a JSON-file vector
//! store, and runs a sample query. Re-running skips categories whose
//! collections already match the corpus.
//!
//! Uses the same deterministic hash embedder as `retrieve_basic`; a real
//! deployment swaps in the `openai`-feature backend.
//!
//! Run: `cargo run --example index_library -- <data_dir> [index_file]`

use std::path::PathBuf;
use std::sync::Arc;

use wt_rag::{EmbeddingProvider, JsonFileVectorStore, Retriever, load_library};

struct HashEmbedder {
    dimensions: usize,
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> wt_rag::Result<Vec<f32>> {
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let data_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".into()));
    let index_file = PathBuf::from(args.next().unwrap_or_else(|| "data/index.json".into()));

    let library = load_library(&data_dir).await?;
    let total: usize = library.iter().map(|(_, chunks)| chunks.len()).sum();
    println!("Loaded {total} chunk(s) from {}", data_dir.display());

    let store = JsonFileVectorStore::open(&index_file).await?;
    let retriever = Retriever::builder()
        .embedder(Arc::new(HashEmbedder { dimensions: 128 }))
        .store(Arc::new(store))
        .build()?;

    for (category, chunks) in &library {
        let indexed = retriever.ensure_indexed(*category, chunks).await?;
        if indexed == 0 {
            println!("  {category}: up to date ({} chunk(s))", chunks.len());
        } else {
            println!("  {category}: indexed {indexed} chunk(s)");
        }
    }

    let query = "how do I write believable dialogue";
    println!("\nQuery: \"{query}\"");
    let block = retriever.context_for_query(query, None).await?;
    if block.is_empty() {
        println!("  (no indexed passages — drop corpus files into {})", data_dir.display());
    } else {
        println!("{block}");
    }

    Ok(())
}
