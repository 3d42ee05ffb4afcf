use crate::error::{Result, SearchError};
use crate::highlight::Highlighter;
use crate::lexical::{LexicalConfig, LexicalSearch};
use kbase_chunker::Document;
use kbase_vector_store::{EmbeddingProvider, SharedIndex, VectorIndex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

const PROBE_TEXT: &str = "kbase embedding probe";

/// Which retrieval strategy an engine answers with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalPath {
    Vector,
    Lexical,
}

impl fmt::Display for RetrievalPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vector => "vector",
            Self::Lexical => "lexical",
        })
    }
}

/// Steps a single query moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Idle,
    Embedding,
    Searching,
    LexicalScoring,
    Ranked,
}

#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Skip the vector path even when it is available
    pub force_lexical: bool,
    /// Mark query tokens in lexical results
    pub highlight: bool,
    pub lexical: LexicalConfig,
}

/// One hit: `distance_or_score` is a distance (lower is better) on the
/// vector path and a relevance score (higher is better) on the lexical path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// 1-based
    pub rank: usize,
    pub text: String,
    pub source: String,
    pub distance_or_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResults {
    pub path: RetrievalPath,
    pub results: Vec<RankedResult>,
}

/// Answers queries over one knowledge base.
///
/// The retrieval path is fixed by [`configure`](Self::configure): a failing
/// provider later surfaces as an error instead of silently switching paths.
pub struct QueryEngine {
    path: RetrievalPath,
    provider: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<SharedIndex>,
    documents: Vec<Document>,
    lexical: LexicalSearch,
    highlighter: Option<Highlighter>,
}

impl QueryEngine {
    /// Pick the retrieval path once.
    ///
    /// The vector path needs a provider, an index, and a probe embedding of
    /// the index dimension. Otherwise the engine scores `documents`
    /// lexically; when `documents` is empty the index's active entries are
    /// used instead.
    pub async fn configure(
        provider: Option<Arc<dyn EmbeddingProvider>>,
        index: Option<SharedIndex>,
        documents: Vec<Document>,
        options: EngineOptions,
    ) -> Self {
        let path = if options.force_lexical {
            log::info!("Lexical retrieval requested");
            RetrievalPath::Lexical
        } else {
            select_path(provider.as_deref(), index.as_ref()).await
        };

        let documents = match (path, documents.is_empty(), index.as_ref()) {
            (RetrievalPath::Lexical, true, Some(shared)) => match shared.snapshot() {
                Ok(current) => documents_from_index(&current),
                Err(e) => {
                    log::warn!("Cannot read index entries for lexical search: {e}");
                    Vec::new()
                }
            },
            _ => documents,
        };

        log::info!(
            "Query engine ready: {} path, {} documents for lexical scoring",
            path,
            documents.len()
        );

        Self {
            path,
            provider,
            index,
            documents,
            lexical: LexicalSearch::new(options.lexical),
            highlighter: options.highlight.then(Highlighter::default),
        }
    }

    pub fn path(&self) -> RetrievalPath {
        self.path
    }

    /// Up to `k` results for `text`, best first
    pub async fn query(&self, text: &str, k: usize) -> Result<RankedResults> {
        if text.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        if k == 0 {
            return Err(SearchError::InvalidArgument("k must be > 0".to_string()));
        }

        enter(QueryPhase::Idle);
        let results = match (self.path, self.provider.as_ref(), self.index.as_ref()) {
            (RetrievalPath::Vector, Some(provider), Some(index)) => {
                self.vector_query(provider.as_ref(), index, text, k).await?
            }
            _ => self.lexical_query(text, k),
        };
        enter(QueryPhase::Ranked);

        log::debug!("Query '{text}' ranked {} results via {}", results.len(), self.path);
        Ok(RankedResults {
            path: self.path,
            results,
        })
    }

    async fn vector_query(
        &self,
        provider: &dyn EmbeddingProvider,
        index: &SharedIndex,
        text: &str,
        k: usize,
    ) -> Result<Vec<RankedResult>> {
        enter(QueryPhase::Embedding);
        let vector = provider.embed_one(text).await?;

        enter(QueryPhase::Searching);
        let neighbors = index.search(&vector, k)?;

        Ok(neighbors
            .into_iter()
            .enumerate()
            .map(|(i, neighbor)| RankedResult {
                rank: i + 1,
                text: neighbor.text,
                source: neighbor.source,
                distance_or_score: neighbor.distance,
            })
            .collect())
    }

    fn lexical_query(&self, text: &str, k: usize) -> Vec<RankedResult> {
        enter(QueryPhase::LexicalScoring);
        self.lexical
            .search(text, &self.documents, k)
            .into_iter()
            .enumerate()
            .map(|(i, scored)| {
                let doc = &self.documents[scored.index];
                let body = match &self.highlighter {
                    Some(highlighter) => highlighter.highlight(&doc.raw_text, text),
                    None => doc.raw_text.clone(),
                };
                RankedResult {
                    rank: i + 1,
                    text: body,
                    source: doc.source_name.clone(),
                    distance_or_score: scored.score,
                }
            })
            .collect()
    }
}

async fn select_path(
    provider: Option<&dyn EmbeddingProvider>,
    index: Option<&SharedIndex>,
) -> RetrievalPath {
    let (Some(provider), Some(index)) = (provider, index) else {
        log::info!("No embedding provider or vector index, using lexical retrieval");
        return RetrievalPath::Lexical;
    };
    let Some(dimension) = index.dimension() else {
        log::warn!("Vector index unreadable, using lexical retrieval");
        return RetrievalPath::Lexical;
    };

    match provider.embed_one(PROBE_TEXT).await {
        Ok(probe) if probe.len() == dimension => {
            log::info!(
                "Using vector retrieval ({} embeddings, dimension {dimension})",
                provider.name()
            );
            RetrievalPath::Vector
        }
        Ok(probe) => {
            log::warn!(
                "Embedding provider '{}' yields dimension {}, index expects {dimension}; \
                 using lexical retrieval",
                provider.name(),
                probe.len()
            );
            RetrievalPath::Lexical
        }
        Err(e) => {
            log::warn!("Embedding provider unavailable ({e}); using lexical retrieval");
            RetrievalPath::Lexical
        }
    }
}

/// Active entries of `index` as documents, one per chunk
pub fn documents_from_index(index: &VectorIndex) -> Vec<Document> {
    index
        .entries()
        .filter(|entry| entry.active)
        .map(|entry| Document::new(entry.entry_id.to_string(), entry.text, entry.source))
        .collect()
}

fn enter(phase: QueryPhase) {
    log::debug!("Query phase: {phase:?}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kbase_vector_store::{HashEmbedder, Metric, VectorStoreError};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Succeeds `budget` times, then reports unavailability
    struct FlakyProvider {
        inner: HashEmbedder,
        budget: usize,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(dimension: usize, budget: usize) -> Self {
            Self {
                inner: HashEmbedder::new(dimension),
                budget,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyProvider {
        fn dimension(&self) -> usize {
            self.inner.dimension()
        }

        fn name(&self) -> &str {
            "flaky"
        }

        async fn embed(&self, texts: &[String]) -> kbase_vector_store::Result<Vec<Vec<f32>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) >= self.budget {
                return Err(VectorStoreError::provider_unavailable("backend went away"));
            }
            self.inner.embed(texts).await
        }
    }

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("a", "Deployment runs every Friday", "ops.txt"),
            Document::new("b", "Lunch is served at noon", "office.txt"),
            Document::new("c", "Rollbacks follow a failed deploy", "ops.txt"),
        ]
    }

    fn index_of(docs: &[Document], embedder: &HashEmbedder) -> SharedIndex {
        let mut index = VectorIndex::new(Metric::Cosine, embedder.dimension()).unwrap();
        for doc in docs {
            index
                .add(
                    &embedder.embed_text(&doc.raw_text),
                    doc.raw_text.as_str(),
                    doc.source_name.as_str(),
                )
                .unwrap();
        }
        SharedIndex::new(index)
    }

    #[tokio::test]
    async fn test_vector_path_ranks_exact_text_first() {
        let embedder = HashEmbedder::new(32);
        let docs = corpus();
        let engine = QueryEngine::configure(
            Some(Arc::new(embedder.clone())),
            Some(index_of(&docs, &embedder)),
            Vec::new(),
            EngineOptions::default(),
        )
        .await;

        assert_eq!(engine.path(), RetrievalPath::Vector);
        let ranked = engine.query("Lunch is served at noon", 2).await.unwrap();
        assert_eq!(ranked.path, RetrievalPath::Vector);
        assert_eq!(ranked.results.len(), 2);
        assert_eq!(ranked.results[0].rank, 1);
        assert_eq!(ranked.results[0].source, "office.txt");
        assert!(ranked.results[0].distance_or_score.abs() < 1e-5);
        assert!(ranked.results[1].distance_or_score >= ranked.results[0].distance_or_score);
    }

    #[tokio::test]
    async fn test_lexical_without_provider() {
        let engine =
            QueryEngine::configure(None, None, corpus(), EngineOptions::default()).await;

        assert_eq!(engine.path(), RetrievalPath::Lexical);
        let ranked = engine.query("deploy", 4).await.unwrap();
        let sources: Vec<(usize, &str)> = ranked
            .results
            .iter()
            .map(|r| (r.rank, r.text.as_str()))
            .collect();
        assert_eq!(
            sources,
            vec![
                (1, "Deployment runs every Friday"),
                (2, "Rollbacks follow a failed deploy"),
            ]
        );
        assert!(ranked.results.iter().all(|r| r.distance_or_score >= 2.0));
    }

    #[tokio::test]
    async fn test_fuzzy_fallback_returns_requested_k() {
        let docs: Vec<Document> = (0..8)
            .map(|i| Document::new(format!("n{i}"), format!("hello worl{i}"), "notes.txt"))
            .collect();
        let engine = QueryEngine::configure(None, None, docs, EngineOptions::default()).await;

        let ranked = engine.query("helo wrld", 8).await.unwrap();
        assert_eq!(ranked.path, RetrievalPath::Lexical);
        assert_eq!(ranked.results.len(), 8);
        let ranks: Vec<usize> = ranked.results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, (1..=8).collect::<Vec<_>>());
        assert!(ranked
            .results
            .iter()
            .all(|r| r.distance_or_score >= crate::lexical::FUZZY_CUTOFF));
    }

    #[tokio::test]
    async fn test_unavailable_provider_selects_lexical_from_index_entries() {
        let embedder = HashEmbedder::new(8);
        let docs = corpus();
        let engine = QueryEngine::configure(
            Some(Arc::new(FlakyProvider::new(8, 0))),
            Some(index_of(&docs, &embedder)),
            Vec::new(),
            EngineOptions::default(),
        )
        .await;

        assert_eq!(engine.path(), RetrievalPath::Lexical);
        let ranked = engine.query("lunch", 3).await.unwrap();
        assert_eq!(ranked.results.len(), 1);
        assert_eq!(ranked.results[0].source, "office.txt");
    }

    #[tokio::test]
    async fn test_dimension_mismatch_selects_lexical() {
        let docs = corpus();
        let engine = QueryEngine::configure(
            Some(Arc::new(HashEmbedder::new(4))),
            Some(index_of(&docs, &HashEmbedder::new(8))),
            docs,
            EngineOptions::default(),
        )
        .await;
        assert_eq!(engine.path(), RetrievalPath::Lexical);
    }

    #[tokio::test]
    async fn test_provider_failure_after_configure_is_reported() {
        let embedder = HashEmbedder::new(8);
        let docs = corpus();
        let engine = QueryEngine::configure(
            Some(Arc::new(FlakyProvider::new(8, 1))),
            Some(index_of(&docs, &embedder)),
            docs,
            EngineOptions::default(),
        )
        .await;

        assert_eq!(engine.path(), RetrievalPath::Vector);
        let err = engine.query("deploy", 2).await.unwrap_err();
        assert!(err.is_provider_unavailable(), "{err}");
        assert_eq!(engine.path(), RetrievalPath::Vector);
    }

    #[tokio::test]
    async fn test_rejects_empty_query_and_zero_k() {
        let engine =
            QueryEngine::configure(None, None, corpus(), EngineOptions::default()).await;

        assert!(matches!(engine.query("   \t", 3).await, Err(SearchError::EmptyQuery)));
        assert!(matches!(
            engine.query("deploy", 0).await,
            Err(SearchError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_no_match_is_empty_success() {
        let engine =
            QueryEngine::configure(None, None, corpus(), EngineOptions::default()).await;
        let ranked = engine.query("zzzzqqq", 3).await.unwrap();
        assert!(ranked.results.is_empty());
    }

    #[tokio::test]
    async fn test_forced_lexical_with_highlight() {
        let embedder = HashEmbedder::new(8);
        let docs = corpus();
        let options = EngineOptions {
            force_lexical: true,
            highlight: true,
            ..EngineOptions::default()
        };
        let engine = QueryEngine::configure(
            Some(Arc::new(embedder.clone())),
            Some(index_of(&docs, &embedder)),
            docs,
            options,
        )
        .await;

        assert_eq!(engine.path(), RetrievalPath::Lexical);
        let ranked = engine.query("friday", 1).await.unwrap();
        assert_eq!(ranked.results[0].text, "Deployment runs every **Friday**");
    }

    #[test]
    fn test_documents_from_index_skips_inactive() {
        let mut index = VectorIndex::new(Metric::L2, 1).unwrap();
        index.add(&[1.0], "kept", "a.txt").unwrap();
        index.add(&[2.0], "gone", "b.txt").unwrap();
        index.delete(1);

        let docs = documents_from_index(&index);
        assert_eq!(docs, vec![Document::new("0", "kept", "a.txt")]);
    }
}
