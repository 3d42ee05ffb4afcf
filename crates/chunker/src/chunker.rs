use crate::config::ChunkerConfig;
use crate::error::Result;
use crate::types::{Chunk, Document};

/// Main chunker interface for splitting documents
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Create a new chunker, rejecting configurations that cannot make progress
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Chunk a single document
    #[must_use]
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let chunks = self.split_text(&document.raw_text, &document.source_name);
        log::debug!(
            "Split document {} into {} chunks",
            document.id,
            chunks.len()
        );
        chunks
    }

    /// Chunk a batch of documents, keeping document order
    #[must_use]
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect()
    }

    /// Chunk raw text attributed to `source`
    #[must_use]
    pub fn split_text(&self, text: &str, source: &str) -> Vec<Chunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, including the end of the text
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let total_chars = bounds.len() - 1;
        let max_size = self.config.max_size;
        let stride = self.config.stride();

        // One window per stride-aligned start; a window that reaches the end of
        // the text may be short. The last window can lie wholly inside the one
        // before it ("abcdefghij" at 4/1 ends with "ghij", "j"). Keep it: the
        // count stays ceil(len / stride) and reconstruction relies on it.
        let mut chunks = Vec::with_capacity(total_chars.div_ceil(stride));
        for start in (0..total_chars).step_by(stride) {
            let end = (start + max_size).min(total_chars);
            chunks.push(Chunk {
                text: text[bounds[start]..bounds[end]].to_string(),
                source: source.to_string(),
                sequence_index: chunks.len(),
                start_offset: start,
            });
        }

        chunks
    }
}

/// Split `text` into windows of at most `max_size` chars sharing `overlap` chars.
pub fn split(text: &str, max_size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    let chunker = Chunker::new(ChunkerConfig::new(max_size, overlap))?;
    Ok(chunker.split_text(text, ""))
}
