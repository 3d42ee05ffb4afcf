use serde::{Deserialize, Serialize};

/// A raw input document as loaded from the source directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Unique within one load (file name, or `file#pN` for PDF pages)
    pub id: String,

    /// Full UTF-8 text
    pub raw_text: String,

    /// Originating file name
    pub source_name: String,
}

impl Document {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        raw_text: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
            source_name: source_name.into(),
        }
    }
}

/// A bounded-length window of a document's text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Chunk content
    pub text: String,

    /// `source_name` of the document this chunk was cut from
    pub source: String,

    /// Position of this chunk within its source (0-indexed)
    pub sequence_index: usize,

    /// Offset of the first character in the source text, in chars
    pub start_offset: usize,
}

impl Chunk {
    /// Number of characters in this chunk
    #[must_use]
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Offset one past the last character in the source text, in chars
    #[must_use]
    pub fn end_offset(&self) -> usize {
        self.start_offset + self.char_len()
    }
}
