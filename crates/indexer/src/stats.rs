use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics about an indexing run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of documents loaded (PDF pages count individually)
    pub documents: usize,

    /// Number of chunks created
    pub chunks: usize,

    /// Chunks per source file
    pub sources: BTreeMap<String, usize>,

    /// Embedding dimension of the resulting index
    pub dimension: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Files that could not be loaded
    pub skipped: Vec<String>,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chunks(&mut self, source: &str, count: usize) {
        self.chunks += count;
        *self.sources.entry(source.to_string()).or_insert(0) += count;
    }

    pub fn add_skipped(&mut self, source: impl Into<String>) {
        self.skipped.push(source.into());
    }
}
