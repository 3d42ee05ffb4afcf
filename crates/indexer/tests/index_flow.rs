use kbase_chunker::ChunkerConfig;
use kbase_indexer::{IndexerConfig, KnowledgeIndexer};
use kbase_vector_store::{EmbeddingProvider, HashEmbedder, IndexStore, Metric};
use std::sync::Arc;
use tempfile::TempDir;

fn indexer(embedder: &HashEmbedder) -> KnowledgeIndexer {
    let config = IndexerConfig {
        chunker: ChunkerConfig::new(40, 10),
        metric: Metric::L2,
        batch_size: 3,
    };
    KnowledgeIndexer::new(config, Arc::new(embedder.clone())).expect("indexer")
}

#[tokio::test]
async fn index_directory_persists_searchable_snapshot() {
    let temp = TempDir::new().expect("tempdir");
    let data = temp.path().join("data");
    tokio::fs::create_dir_all(data.join("ops")).await.expect("mkdir");
    tokio::fs::write(
        data.join("guide.txt"),
        "Deployment happens every Tuesday after the release review meeting.",
    )
    .await
    .expect("write guide");
    tokio::fs::write(data.join("ops/oncall.txt"), "Page the on-call engineer.")
        .await
        .expect("write oncall");
    tokio::fs::write(data.join("ignored.md"), "markdown is not ingested")
        .await
        .expect("write md");

    let embedder = HashEmbedder::new(16);
    let store = IndexStore::new(temp.path().join(".kbase/index.json"));
    let stats = indexer(&embedder)
        .index_directory(&data, &store)
        .await
        .expect("index");

    assert_eq!(stats.documents, 2);
    assert_eq!(stats.dimension, 16);
    assert!(stats.sources.contains_key("guide.txt"));
    assert!(stats.sources.contains_key("ops/oncall.txt"));
    assert!(stats.skipped.is_empty());

    let index = store.load().await.expect("load");
    assert_eq!(index.len(), stats.chunks);
    assert_eq!(index.metric(), Metric::L2);

    let probe = embedder
        .embed_one("Page the on-call engineer.")
        .await
        .expect("embed");
    let hits = index.search(&probe, 1).expect("search");
    assert_eq!(hits[0].source, "ops/oncall.txt");
    assert!(hits[0].distance.abs() < 1e-6);
}

#[tokio::test]
async fn missing_data_directory_writes_empty_index() {
    let temp = TempDir::new().expect("tempdir");
    let store = IndexStore::new(temp.path().join("index.json"));
    let embedder = HashEmbedder::new(4);

    let stats = indexer(&embedder)
        .index_directory(temp.path().join("absent"), &store)
        .await
        .expect("index");

    assert_eq!(stats.documents, 0);
    assert_eq!(stats.chunks, 0);
    let index = store.load().await.expect("load");
    assert!(index.is_empty());
    assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 3).expect("search").is_empty());
}

#[tokio::test]
async fn reindex_replaces_previous_snapshot() {
    let temp = TempDir::new().expect("tempdir");
    let data = temp.path().join("data");
    tokio::fs::create_dir_all(&data).await.expect("mkdir");
    tokio::fs::write(data.join("a.txt"), "first").await.expect("write");

    let embedder = HashEmbedder::new(4);
    let store = IndexStore::new(temp.path().join("index.json"));
    let indexer = indexer(&embedder);
    indexer.index_directory(&data, &store).await.expect("first");

    tokio::fs::remove_file(data.join("a.txt")).await.expect("rm");
    tokio::fs::write(data.join("b.txt"), "second").await.expect("write");
    indexer.index_directory(&data, &store).await.expect("second");

    let index = store.load().await.expect("load");
    let sources: Vec<&str> = index.entries().map(|e| e.source).collect();
    assert_eq!(sources, vec!["b.txt"]);
}
