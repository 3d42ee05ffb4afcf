use kbase_chunker::ChunkerConfig;
use kbase_vector_store::Metric;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Settings for one indexing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    pub chunker: ChunkerConfig,
    pub metric: Metric,
    /// Texts per `EmbeddingProvider::embed` call
    pub batch_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            chunker: ChunkerConfig::default(),
            metric: Metric::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
