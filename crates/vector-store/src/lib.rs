//! # kbase Vector Store
//!
//! Vector storage, exact nearest-neighbor search and snapshot persistence for
//! document chunk embeddings.
//!
//! ## Features
//!
//! - **Exact search** over every active entry, squared-L2 or cosine distance
//! - **Stable entry ids**: deletes only deactivate, nothing is renumbered
//! - **Copy-on-write sharing** so searches never observe a half-applied write
//! - **Atomic snapshots**: temp file + rename, bit-exact vector encoding
//! - **Pluggable embeddings** behind [`EmbeddingProvider`]
//!
//! ## Architecture
//!
//! ```text
//! Chunk[]
//!     │
//!     ├──> EmbeddingProvider
//!     │      └─> Vec<f32>[D]
//!     │
//!     ├──> VectorIndex (Array2<f32>, metric)
//!     │      └─> top-k Neighbor[]
//!     │
//!     └──> IndexStore
//!            └─> JSON snapshot (tmp + rename)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use kbase_vector_store::{IndexStore, Metric, VectorIndex};
//!
//! #[tokio::main]
//! async fn main() -> kbase_vector_store::Result<()> {
//!     let mut index = VectorIndex::new(Metric::L2, 2)?;
//!     index.add(&[1.0, 0.0], "cats are great", "pets.txt")?;
//!     index.add(&[0.0, 1.0], "fish swim", "pets.txt")?;
//!
//!     let store = IndexStore::new(".kbase/index.json");
//!     store.save(&index).await?;
//!
//!     for hit in store.load().await?.search(&[1.0, 0.0], 1)? {
//!         println!("{} ({:.3}) {}", hit.source, hit.distance, hit.text);
//!     }
//!     Ok(())
//! }
//! ```

mod embeddings;
mod error;
mod index;
mod metric;
mod shared;
mod store;

pub use embeddings::{
    EmbeddingMode, EmbeddingProvider, HashEmbedder, DEFAULT_EMBEDDING_DIMENSION,
};
pub use error::{Result, VectorStoreError};
pub use index::{IndexEntry, Neighbor, VectorIndex};
pub use metric::Metric;
pub use shared::SharedIndex;
pub use store::{IndexSnapshot, IndexStore, SNAPSHOT_VERSION};
