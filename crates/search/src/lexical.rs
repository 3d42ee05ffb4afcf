use kbase_chunker::Document;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

/// Score added for every query token found verbatim in a document
pub const SUBSTRING_WEIGHT: f32 = 2.0;

/// Multiplier for the edit similarity of a token that is not a substring
pub const FUZZY_WEIGHT: f32 = 0.5;

/// Token similarity below this contributes nothing
pub const MIN_TOKEN_SIMILARITY: f32 = 0.5;

/// Minimum whole-query similarity in the fallback pass
pub const FUZZY_CUTOFF: f32 = 0.4;

pub const DEFAULT_FUZZY_TOP_K: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexicalConfig {
    /// Results kept by the whole-string fallback
    pub fuzzy_top_k: usize,
}

impl Default for LexicalConfig {
    fn default() -> Self {
        Self {
            fuzzy_top_k: DEFAULT_FUZZY_TOP_K,
        }
    }
}

/// How a document earned its score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Token substring / token similarity pass
    Token,
    /// Whole-query similarity fallback
    Fuzzy,
}

/// A document position in the scored collection and its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDocument {
    pub index: usize,
    pub score: f32,
    pub kind: MatchKind,
}

/// Split a query into lower-cased word tokens
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Substring and edit-similarity scoring over raw documents.
///
/// Fuzzy token similarity is measured against the document's whole text,
/// not against its individual words. Long documents therefore rarely earn a
/// fuzzy contribution; the exact substring bonus dominates.
#[derive(Debug, Clone, Default)]
pub struct LexicalSearch {
    config: LexicalConfig,
}

impl LexicalSearch {
    pub fn new(config: LexicalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LexicalConfig {
        &self.config
    }

    /// Score every document against `query`, best first.
    ///
    /// Only documents with a positive score are returned; equal scores keep
    /// collection order. When no document scores, falls back to whole-query
    /// similarity with [`FUZZY_CUTOFF`], keeping at most
    /// [`LexicalConfig::fuzzy_top_k`]. An empty result is a valid outcome.
    pub fn score(&self, query: &str, documents: &[Document]) -> Vec<ScoredDocument> {
        self.score_with_limit(query, documents, self.config.fuzzy_top_k)
    }

    /// Best `limit` documents for `query`; the fallback pass keeps `limit` too
    pub fn search(
        &self,
        query: &str,
        documents: &[Document],
        limit: usize,
    ) -> Vec<ScoredDocument> {
        let mut scored = self.score_with_limit(query, documents, limit);
        scored.truncate(limit);
        scored
    }

    fn score_with_limit(
        &self,
        query: &str,
        documents: &[Document],
        fallback_limit: usize,
    ) -> Vec<ScoredDocument> {
        let tokens = tokenize(query);
        let lowered: Vec<String> = documents
            .iter()
            .map(|doc| doc.raw_text.to_lowercase())
            .collect();

        let mut scored: Vec<ScoredDocument> = lowered
            .iter()
            .enumerate()
            .filter_map(|(index, text)| {
                let score = token_score(&tokens, text);
                (score > 0.0).then_some(ScoredDocument {
                    index,
                    score,
                    kind: MatchKind::Token,
                })
            })
            .collect();

        if scored.is_empty() {
            log::debug!("No token matches for '{query}', trying whole-query similarity");
            return fuzzy_fallback(query, &lowered, fallback_limit);
        }

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored
    }
}

fn fuzzy_fallback(query: &str, lowered: &[String], limit: usize) -> Vec<ScoredDocument> {
    let query = query.trim().to_lowercase();
    let mut scored: Vec<ScoredDocument> = lowered
        .iter()
        .enumerate()
        .filter_map(|(index, text)| {
            let ratio = normalized_levenshtein(&query, text) as f32;
            (ratio >= FUZZY_CUTOFF).then_some(ScoredDocument {
                index,
                score: ratio,
                kind: MatchKind::Fuzzy,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

fn token_score(tokens: &[String], text: &str) -> f32 {
    tokens
        .iter()
        .map(|token| {
            if text.contains(token.as_str()) {
                SUBSTRING_WEIGHT
            } else {
                let ratio = normalized_levenshtein(token, text) as f32;
                if ratio >= MIN_TOKEN_SIMILARITY {
                    FUZZY_WEIGHT * ratio
                } else {
                    0.0
                }
            }
        })
        .sum()
}
