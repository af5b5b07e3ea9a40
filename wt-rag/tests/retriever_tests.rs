//! End-to-end retriever behavior with a deterministic embedder.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wt_rag::{
    Category, Chunk, EmbeddingProvider, InMemoryVectorStore, RagError, Retriever,
    RetrieverConfig, SearchFilter,
};

const DIM: usize = 32;

/// Hash-based embedder: deterministic, normalized, no network.
struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    fn new() -> Self {
        Self { dimensions: DIM }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> wt_rag::Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(RagError::Embedding {
                provider: "hash".into(),
                message: "input text is empty".into(),
            });
        }
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

/// Embedder that never returns; used to exercise the deadline path.
struct StalledEmbedder;

#[async_trait]
impl EmbeddingProvider for StalledEmbedder {
    async fn embed(&self, _text: &str) -> wt_rag::Result<Vec<f32>> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(vec![0.0; DIM])
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder that fails on one marked text, to observe batch attribution.
struct PoisonEmbedder;

#[async_trait]
impl EmbeddingProvider for PoisonEmbedder {
    async fn embed(&self, text: &str) -> wt_rag::Result<Vec<f32>> {
        if text.contains("poison") {
            return Err(RagError::Embedding {
                provider: "poison".into(),
                message: "refused".into(),
            });
        }
        Ok(vec![1.0; DIM])
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

fn chunk(id: &str, text: &str, book: &str, author: &str, category: Category) -> Chunk {
    Chunk {
        id: id.into(),
        text: text.into(),
        book_title: book.into(),
        author: author.into(),
        chapter: None,
        category,
        embedding: Vec::new(),
    }
}

fn craft_chunks() -> Vec<Chunk> {
    vec![
        chunk("craft_0", "Show, don't tell.", "Bird by Bird", "Lamott", Category::Craft),
        chunk("craft_1", "Kill your darlings.", "On Writing", "King", Category::Craft),
        chunk("craft_2", "Write drunk, edit sober is bad advice.", "On Writing", "King", Category::Craft),
        chunk("craft_3", "Every scene needs conflict.", "Story", "McKee", Category::Craft),
        chunk("craft_4", "Enter late, leave early.", "Story", "McKee", Category::Craft),
    ]
}

fn make_retriever() -> Retriever {
    Retriever::builder()
        .embedder(Arc::new(HashEmbedder::new()))
        .store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn single_chunk_corpus_end_to_end() {
    let retriever = make_retriever();
    let corpus =
        vec![chunk("craft_0", "Show, don't tell.", "Bird by Bird", "Lamott", Category::Craft)];
    retriever.ensure_indexed(Category::Craft, &corpus).await.unwrap();

    let results = retriever
        .retrieve("how do I show emotion instead of stating it", 1, None)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.id, "craft_0");
    assert_eq!(results[0].chunk.book_title, "Bird by Bird");
    assert!(results[0].distance.is_finite());
}

#[tokio::test]
async fn zero_k_is_an_invalid_argument() {
    let retriever = make_retriever();
    assert!(matches!(
        retriever.retrieve("anything", 0, None).await,
        Err(RagError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn empty_index_returns_empty_result() {
    let retriever = make_retriever();
    let results = retriever.retrieve("pacing a scene", 3, None).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn k_three_returns_exactly_three_sorted() {
    let retriever = make_retriever();
    retriever.ensure_indexed(Category::Craft, &craft_chunks()).await.unwrap();

    let results = retriever.retrieve("how should a scene open", 3, None).await.unwrap();

    assert_eq!(results.len(), 3);
    for window in results.windows(2) {
        assert!(window[0].distance <= window[1].distance);
    }
}

#[tokio::test]
async fn repeated_retrieval_is_deterministic() {
    let retriever = make_retriever();
    retriever.ensure_indexed(Category::Craft, &craft_chunks()).await.unwrap();

    let first = retriever.retrieve("advice about editing", 5, None).await.unwrap();
    let second = retriever.retrieve("advice about editing", 5, None).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn double_indexing_is_idempotent() {
    let retriever = make_retriever();
    let corpus = craft_chunks();

    let indexed = retriever.ensure_indexed(Category::Craft, &corpus).await.unwrap();
    assert_eq!(indexed, corpus.len());

    let reindexed = retriever.ensure_indexed(Category::Craft, &corpus).await.unwrap();
    assert_eq!(reindexed, 0);

    let count = retriever.store().count(Category::Craft.collection()).await.unwrap();
    assert_eq!(count, corpus.len());
}

#[tokio::test]
async fn book_title_filter_restricts_results() {
    let retriever = make_retriever();
    retriever.ensure_indexed(Category::Craft, &craft_chunks()).await.unwrap();

    let filter = SearchFilter { book_title: Some("On Writing".into()), ..Default::default() };
    let results = retriever.retrieve("editing advice", 5, Some(&filter)).await.unwrap();

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.chunk.book_title == "On Writing"));
}

#[tokio::test]
async fn blank_filter_field_is_an_invalid_argument() {
    let retriever = make_retriever();
    let filter = SearchFilter { book_title: Some("  ".into()), ..Default::default() };
    assert!(matches!(
        retriever.retrieve("anything", 3, Some(&filter)).await,
        Err(RagError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn category_filter_searches_one_collection() {
    let retriever = make_retriever();
    retriever.ensure_indexed(Category::Craft, &craft_chunks()).await.unwrap();
    retriever
        .ensure_indexed(
            Category::Style,
            &[chunk("style_0", "Omit needless words.", "The Elements of Style", "Strunk", Category::Style)],
        )
        .await
        .unwrap();

    let filter = SearchFilter { category: Some(Category::Style), ..Default::default() };
    let results = retriever.retrieve("tightening prose", 10, Some(&filter)).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].chunk.category, Category::Style);
}

#[tokio::test]
async fn unfiltered_retrieval_merges_all_categories() {
    let retriever = make_retriever();
    retriever.ensure_indexed(Category::Craft, &craft_chunks()).await.unwrap();
    retriever
        .ensure_indexed(
            Category::Editorial,
            &[chunk("ed_0", "Prefer the living word.", "Слово живое и мёртвое", "Нора Галь", Category::Editorial)],
        )
        .await
        .unwrap();

    let results = retriever.retrieve("word choice", 10, None).await.unwrap();
    assert_eq!(results.len(), 6);
}

#[tokio::test(start_paused = true)]
async fn stalled_embedder_times_out_as_transport_error() {
    let config =
        RetrieverConfig::builder().embed_timeout(Duration::from_millis(50)).build().unwrap();
    let retriever = Retriever::builder()
        .embedder(Arc::new(StalledEmbedder))
        .store(Arc::new(InMemoryVectorStore::new()))
        .config(config)
        .build()
        .unwrap();

    let err = retriever.retrieve("anything", 3, None).await.unwrap_err();
    let RagError::Transport { message, .. } = err else {
        panic!("expected transport error, got {err:?}");
    };
    assert!(message.contains("timed out"));
}

#[tokio::test]
async fn batch_failure_names_the_element() {
    let retriever = Retriever::builder()
        .embedder(Arc::new(PoisonEmbedder))
        .store(Arc::new(InMemoryVectorStore::new()))
        .build()
        .unwrap();

    let corpus = vec![
        chunk("craft_0", "fine text", "Story", "McKee", Category::Craft),
        chunk("craft_1", "poison text", "Story", "McKee", Category::Craft),
    ];
    let err = retriever.ensure_indexed(Category::Craft, &corpus).await.unwrap_err();
    let RagError::Embedding { message, .. } = err else {
        panic!("expected embedding error, got {err:?}");
    };
    assert!(message.contains("batch element 1"));

    // The failed batch must not leave a partial collection behind.
    let count = retriever.store().count(Category::Craft.collection()).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn context_block_carries_attribution() {
    let retriever = make_retriever();
    retriever.ensure_indexed(Category::Craft, &craft_chunks()).await.unwrap();

    let block = retriever.context_for_query("scene structure", None).await.unwrap();
    assert!(block.starts_with("Relevant advice from writing books:"));
    assert!(block.contains("«"));

    let empty = make_retriever();
    let block = empty.context_for_query("scene structure", None).await.unwrap();
    assert!(block.is_empty());
}
