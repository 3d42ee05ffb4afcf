//! # kbase Search
//!
//! Query answering over a knowledge base: nearest-neighbor retrieval through
//! an embedding provider, or substring/edit-similarity scoring when no
//! provider is usable.
//!
//! ```text
//! query ──> QueryEngine ──┬─> EmbeddingProvider ─> SharedIndex::search
//!                         └─> LexicalSearch::score
//!                                   │
//!                                   └─> RankedResults
//! ```

mod engine;
mod error;
mod highlight;
mod lexical;

pub use engine::{
    documents_from_index, EngineOptions, QueryEngine, QueryPhase, RankedResult, RankedResults,
    RetrievalPath,
};
pub use error::{Result, SearchError};
pub use highlight::{Highlighter, DEFAULT_MARKER};
pub use lexical::{
    tokenize, LexicalConfig, LexicalSearch, MatchKind, ScoredDocument, DEFAULT_FUZZY_TOP_K,
    FUZZY_CUTOFF, FUZZY_WEIGHT, MIN_TOKEN_SIMILARITY, SUBSTRING_WEIGHT,
};
