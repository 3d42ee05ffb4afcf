use crate::config::IndexerConfig;
use crate::error::{IndexerError, Result};
use crate::loader::load_documents;
use crate::stats::IndexStats;
use kbase_chunker::{Chunk, Chunker, Document};
use kbase_vector_store::{EmbeddingProvider, IndexStore, SharedIndex, VectorIndex};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// Chunks documents, embeds the chunks and builds the vector index
pub struct KnowledgeIndexer {
    config: IndexerConfig,
    chunker: Chunker,
    provider: Arc<dyn EmbeddingProvider>,
}

impl KnowledgeIndexer {
    pub fn new(config: IndexerConfig, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        if config.batch_size == 0 {
            return Err(IndexerError::Other("batch_size must be > 0".to_string()));
        }
        let chunker = Chunker::new(config.chunker)?;
        Ok(Self {
            config,
            chunker,
            provider,
        })
    }

    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Build a fresh index over `documents`
    pub async fn build_index(&self, documents: &[Document]) -> Result<(VectorIndex, IndexStats)> {
        let started = Instant::now();
        let mut stats = IndexStats::new();
        stats.documents = documents.len();
        stats.dimension = self.provider.dimension();

        let mut chunks = Vec::new();
        for document in documents {
            let doc_chunks = self.chunker.split_document(document);
            stats.add_chunks(&document.source_name, doc_chunks.len());
            chunks.extend(doc_chunks);
        }
        log::info!(
            "Chunked {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let vectors = self.embed_chunks(&chunks).await?;
        let entries = vectors
            .into_iter()
            .zip(chunks)
            .map(|(vector, chunk)| (vector, chunk.text, chunk.source));
        let index = VectorIndex::build(self.config.metric, self.provider.dimension(), entries)?;

        stats.time_ms = elapsed_ms(started);
        log::info!(
            "Built {} index with {} entries in {} ms",
            index.metric(),
            index.len(),
            stats.time_ms
        );
        Ok((index, stats))
    }

    /// Full rebuild: load `data_dir`, build, then atomically replace the snapshot
    pub async fn index_directory(
        &self,
        data_dir: impl AsRef<Path>,
        store: &IndexStore,
    ) -> Result<IndexStats> {
        let data_dir = data_dir.as_ref();
        if data_dir.exists() && !data_dir.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                data_dir.display()
            )));
        }

        let started = Instant::now();
        let loaded = load_documents(data_dir).await;
        let (index, mut stats) = self.build_index(&loaded.documents).await?;
        for source in loaded.skipped {
            stats.add_skipped(source);
        }

        store.save(&index).await?;
        stats.time_ms = elapsed_ms(started);
        Ok(stats)
    }

    /// Replace every entry of `source` with chunks of `documents`.
    ///
    /// Embedding happens before the write; the delete and the adds are then
    /// published together, so readers never see the source half-replaced.
    /// Returns the number of entries added.
    pub async fn refresh_source(
        &self,
        shared: &SharedIndex,
        source: &str,
        documents: &[Document],
    ) -> Result<usize> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.chunker.split_text(&doc.raw_text, source))
            .collect();
        let vectors = self.embed_chunks(&chunks).await?;

        let (removed, added) = shared.update(|index| {
            let removed = index.delete_source(source);
            for (vector, chunk) in vectors.iter().zip(&chunks) {
                index.add(vector, chunk.text.as_str(), source)?;
            }
            Ok((removed, chunks.len()))
        })?;

        log::info!("Refreshed {source}: {removed} entries deactivated, {added} added");
        Ok(added)
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.config.batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let embedded = self.provider.embed(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(IndexerError::Other(format!(
                    "embedding provider '{}' returned {} vectors for {} texts",
                    self.provider.name(),
                    embedded.len(),
                    texts.len()
                )));
            }
            vectors.extend(embedded);
            log::debug!("Embedded {}/{} chunks", vectors.len(), chunks.len());
        }
        Ok(vectors)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
