use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Degenerate vector: cosine distance is undefined for a zero-norm vector")]
    DegenerateVector,

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Snapshot not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl VectorStoreError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptSnapshot(msg.into())
    }

    pub fn provider_unavailable(msg: impl Into<String>) -> Self {
        Self::ProviderUnavailable(msg.into())
    }
}
