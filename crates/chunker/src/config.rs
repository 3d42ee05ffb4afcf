use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Default maximum chunk length in characters
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 800;

/// Default overlap between consecutive chunks in characters
pub const DEFAULT_OVERLAP: usize = 100;

/// Configuration for character-window chunking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Maximum chunk size in characters (hard limit)
    pub max_size: usize,

    /// Characters shared between a chunk and its successor
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    #[must_use]
    pub const fn new(max_size: usize, overlap: usize) -> Self {
        Self { max_size, overlap }
    }

    /// Distance in characters between the starts of two consecutive chunks
    #[must_use]
    pub const fn stride(&self) -> usize {
        self.max_size.saturating_sub(self.overlap)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(ChunkerError::invalid_config("max_size must be > 0"));
        }

        if self.overlap >= self.max_size {
            return Err(ChunkerError::invalid_config(format!(
                "overlap ({}) must be smaller than max_size ({})",
                self.overlap, self.max_size
            )));
        }

        Ok(())
    }
}
