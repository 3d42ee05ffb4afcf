//! # kbase Indexer
//!
//! Turns a directory of documents into a persisted vector index.
//!
//! ## Pipeline
//!
//! ```text
//! Data directory
//!     │
//!     ├──> DocumentScanner (.gitignore aware)
//!     │      └─> .txt / .pdf files
//!     │
//!     ├──> Loader (pdftotext per page)
//!     │      └─> Documents
//!     │
//!     ├──> Chunker (overlapping windows)
//!     │      └─> Chunks
//!     │
//!     └──> EmbeddingProvider (batched) + VectorIndex
//!            └─> IndexStore snapshot
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kbase_indexer::{IndexerConfig, KnowledgeIndexer};
//! use kbase_vector_store::{HashEmbedder, IndexStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> kbase_indexer::Result<()> {
//!     let embedder = Arc::new(HashEmbedder::default());
//!     let indexer = KnowledgeIndexer::new(IndexerConfig::default(), embedder)?;
//!     let stats = indexer
//!         .index_directory("data", &IndexStore::new(".kbase/index.json"))
//!         .await?;
//!
//!     println!("Indexed {} documents, {} chunks", stats.documents, stats.chunks);
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod indexer;
mod loader;
mod scanner;
mod stats;

pub use config::{IndexerConfig, DEFAULT_BATCH_SIZE};
pub use error::{IndexerError, Result};
pub use indexer::KnowledgeIndexer;
pub use loader::{load_documents, LoadedDocuments};
pub use scanner::{DocumentKind, DocumentScanner};
pub use stats::IndexStats;
