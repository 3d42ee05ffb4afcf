use kbase_chunker::{split, Document};
use kbase_search::{EngineOptions, QueryEngine, RetrievalPath, SearchError};
use kbase_vector_store::{
    EmbeddingProvider, HashEmbedder, IndexStore, Metric, SharedIndex, VectorIndex,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

const HANDBOOK: &str = "Releases are cut on Monday. Deployment to production happens on \
Tuesday after review. Incidents are tracked in the on-call log.";

async fn persisted_index(dir: &TempDir, embedder: &HashEmbedder) -> IndexStore {
    let chunks = split(HANDBOOK, 48, 8).expect("chunk");
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed(&texts).await.expect("embed");

    let entries = vectors
        .into_iter()
        .zip(chunks)
        .map(|(vector, chunk)| (vector, chunk.text, "handbook.txt".to_string()));
    let index = VectorIndex::build(Metric::L2, embedder.dimension(), entries).expect("build");

    let store = IndexStore::new(dir.path().join("index.json"));
    store.save(&index).await.expect("save");
    store
}

#[tokio::test]
async fn vector_search_over_reloaded_snapshot() {
    let dir = TempDir::new().expect("tempdir");
    let embedder = HashEmbedder::new(24);
    let store = persisted_index(&dir, &embedder).await;

    let index = SharedIndex::new(store.load().await.expect("load"));
    let first_chunk = index
        .snapshot()
        .expect("snapshot")
        .entry(0)
        .expect("entry")
        .text
        .to_string();
    let engine = QueryEngine::configure(
        Some(Arc::new(embedder)),
        Some(index),
        Vec::new(),
        EngineOptions::default(),
    )
    .await;

    let ranked = engine.query(&first_chunk, 3).await.expect("query");
    assert_eq!(ranked.path, RetrievalPath::Vector);
    assert_eq!(ranked.results.len(), 3);
    assert_eq!(ranked.results[0].text, first_chunk);
    let ranks: Vec<usize> = ranked.results.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, vec![1, 2, 3]);

    let json = serde_json::to_value(&ranked).expect("json");
    assert_eq!(json["path"], "vector");
    assert_eq!(json["results"][0]["source"], "handbook.txt");
}

#[tokio::test]
async fn lexical_fallback_over_snapshot_entries() {
    let dir = TempDir::new().expect("tempdir");
    let store = persisted_index(&dir, &HashEmbedder::new(24)).await;
    let index = SharedIndex::new(store.load().await.expect("load"));

    let engine =
        QueryEngine::configure(None, Some(index), Vec::new(), EngineOptions::default()).await;
    assert_eq!(engine.path(), RetrievalPath::Lexical);

    let ranked = engine.query("deploy", 5).await.expect("query");
    assert!(!ranked.results.is_empty());
    assert!(ranked.results.iter().all(|r| r.text.to_lowercase().contains("deploy")));
    assert!(ranked.results[0].distance_or_score >= 2.0);
}

#[tokio::test]
async fn empty_query_is_rejected_on_every_path() {
    let docs = vec![Document::new("a", "anything", "a.txt")];
    let lexical = QueryEngine::configure(None, None, docs, EngineOptions::default()).await;
    assert!(matches!(lexical.query("", 4).await, Err(SearchError::EmptyQuery)));

    let dir = TempDir::new().expect("tempdir");
    let embedder = HashEmbedder::new(24);
    let store = persisted_index(&dir, &embedder).await;
    let vector = QueryEngine::configure(
        Some(Arc::new(embedder)),
        Some(SharedIndex::new(store.load().await.expect("load"))),
        Vec::new(),
        EngineOptions::default(),
    )
    .await;
    assert!(matches!(vector.query("  ", 4).await, Err(SearchError::EmptyQuery)));
}
