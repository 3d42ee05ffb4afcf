use crate::config::KbConfig;
use anyhow::{Context, Result};
use kbase_indexer::{load_documents, KnowledgeIndexer};
use kbase_search::{EngineOptions, QueryEngine, RankedResults, RetrievalPath, SearchError};
use kbase_vector_store::{EmbeddingProvider, IndexStore, SharedIndex, VectorIndex, VectorStoreError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct IndexRequest {
    pub data_dir: PathBuf,
    pub store: PathBuf,
    pub json: bool,
}

pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub data_dir: PathBuf,
    pub store: PathBuf,
    pub lexical: bool,
    pub highlight: bool,
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct IndexOutput<'a> {
    store: &'a Path,
    #[serde(flatten)]
    stats: &'a kbase_indexer::IndexStats,
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    store: PathBuf,
    dimension: usize,
    metric: String,
    entries: usize,
    active_entries: usize,
    sources: usize,
}

#[derive(Debug, Serialize)]
struct DeleteOutput<'a> {
    source: &'a str,
    deactivated: usize,
}

fn provider_for(config: &KbConfig) -> Option<Arc<dyn EmbeddingProvider>> {
    config
        .embedding
        .mode
        .provider(config.embedding.dimension)
        .map(|embedder| Arc::new(embedder) as Arc<dyn EmbeddingProvider>)
}

pub async fn run_index(config: &KbConfig, request: IndexRequest) -> Result<()> {
    let provider = provider_for(config).context(
        "Indexing needs an embedding backend; set embedding.mode or KBASE_EMBEDDING_MODE to 'hash'",
    )?;
    let indexer = KnowledgeIndexer::new(config.indexer_config(), provider)?;
    let store = IndexStore::new(&request.store);

    let stats = indexer
        .index_directory(&request.data_dir, &store)
        .await
        .with_context(|| format!("Failed to index {}", request.data_dir.display()))?;

    if request.json {
        let output = IndexOutput {
            store: store.path(),
            stats: &stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!(
            "Indexed {} documents into {} chunks (dimension {}) in {} ms -> {}",
            stats.documents,
            stats.chunks,
            stats.dimension,
            stats.time_ms,
            store.path().display()
        );
        for skipped in &stats.skipped {
            println!("  skipped: {skipped}");
        }
    }
    Ok(())
}

pub async fn run_search(config: &KbConfig, request: SearchRequest) -> Result<()> {
    if request.query.trim().is_empty() {
        return Err(SearchError::EmptyQuery.into());
    }

    let store = IndexStore::new(&request.store);
    let index = match store.load().await {
        Ok(index) => Some(SharedIndex::new(index)),
        Err(VectorStoreError::NotFound(path)) => {
            log::warn!(
                "No index at {}, searching documents in {} lexically",
                path.display(),
                request.data_dir.display()
            );
            None
        }
        Err(e) => return Err(e).context("Failed to load index snapshot"),
    };

    let documents = if index.is_none() {
        load_documents(&request.data_dir).await.documents
    } else {
        Vec::new()
    };

    let options = EngineOptions {
        force_lexical: request.lexical,
        highlight: request.highlight || config.search.highlight,
        lexical: config.lexical_config(),
    };
    let engine = QueryEngine::configure(provider_for(config), index, documents, options).await;
    let ranked = engine.query(&request.query, request.top_k).await?;

    if request.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
    } else {
        print_ranked(&ranked);
    }
    Ok(())
}

fn print_ranked(ranked: &RankedResults) {
    if ranked.results.is_empty() {
        println!("No results.");
        return;
    }
    let label = match ranked.path {
        RetrievalPath::Vector => "distance",
        RetrievalPath::Lexical => "score",
    };
    for result in &ranked.results {
        println!(
            "### Result {} ({label} {:.4})\nSource: {}\n{}\n---",
            result.rank, result.distance_or_score, result.source, result.text
        );
    }
}

pub async fn run_stats(store_path: &Path, json: bool) -> Result<()> {
    let store = IndexStore::new(store_path);
    let index = store
        .load()
        .await
        .context("Failed to load index snapshot")?;
    let output = stats_of(store_path, &index);

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Store:          {}", output.store.display());
        println!("Metric:         {}", output.metric);
        println!("Dimension:      {}", output.dimension);
        println!("Entries:        {}", output.entries);
        println!("Active entries: {}", output.active_entries);
        println!("Sources:        {}", output.sources);
    }
    Ok(())
}

fn stats_of(store_path: &Path, index: &VectorIndex) -> StatsOutput {
    let sources: BTreeSet<&str> = index
        .entries()
        .filter(|entry| entry.active)
        .map(|entry| entry.source)
        .collect();
    StatsOutput {
        store: store_path.to_path_buf(),
        dimension: index.dimension(),
        metric: index.metric().to_string(),
        entries: index.len(),
        active_entries: index.active_count(),
        sources: sources.len(),
    }
}

pub async fn run_delete_source(store_path: &Path, source: &str, json: bool) -> Result<()> {
    let store = IndexStore::new(store_path);
    let shared = SharedIndex::new(
        store
            .load()
            .await
            .context("Failed to load index snapshot")?,
    );

    let deactivated = shared.delete_source(source)?;
    if deactivated > 0 {
        store.save(&*shared.snapshot()?).await?;
    }
    log::info!("Deactivated {deactivated} entries for {source}");

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&DeleteOutput {
                source,
                deactivated
            })?
        );
    } else {
        println!("Deactivated {deactivated} entries for {source}");
    }
    Ok(())
}
