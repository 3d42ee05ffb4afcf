//! # kbase Chunker
//!
//! Splits document text into overlapping, bounded-length chunks that are the
//! unit of indexing for the rest of the workspace.
//!
//! ## Windowing
//!
//! ```text
//! text:    |<------------------- len ------------------->|
//! chunk 0: |<---- max_size ---->|
//! chunk 1:              |<---- max_size ---->|
//!                       |<ovl>|
//! chunk 2:                           |<--- remainder --->|
//! ```
//!
//! Consecutive chunks share exactly `overlap` characters, so the source text
//! is recovered by dropping the first `overlap` characters of every chunk but
//! the first and concatenating.
//!
//! ## Example
//!
//! ```rust
//! use kbase_chunker::{Chunker, ChunkerConfig, Document};
//!
//! let chunker = Chunker::new(ChunkerConfig::new(8, 2)).unwrap();
//! let doc = Document::new("notes.txt", "abcdefghijklmnop", "notes.txt");
//!
//! let chunks = chunker.split_document(&doc);
//! assert_eq!(chunks[0].text, "abcdefgh");
//! assert_eq!(chunks[1].text, "ghijklmn");
//! assert_eq!(chunks[2].text, "mnop");
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::{split, Chunker};
pub use config::{ChunkerConfig, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_OVERLAP};
pub use error::{ChunkerError, Result};
pub use types::{Chunk, Document};
