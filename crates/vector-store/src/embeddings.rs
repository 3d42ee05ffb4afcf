use crate::error::{Result, VectorStoreError};
use async_trait::async_trait;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Default dimension of the local hash embedder
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

const EMBEDDING_MODE_ENV: &str = "KBASE_EMBEDDING_MODE";

/// Maps chunk text to fixed-dimension vectors.
///
/// Implementations return exactly one vector of [`dimension`](Self::dimension)
/// components per input text, in input order. A backend that cannot be
/// reached reports [`VectorStoreError::ProviderUnavailable`].
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn dimension(&self) -> usize;

    /// Identifier recorded in logs and stats
    fn name(&self) -> &str;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| VectorStoreError::provider_unavailable("empty embedding result"))
    }
}

/// Which embedding backend to construct
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingMode {
    /// Deterministic local hash embeddings
    #[default]
    Hash,
    /// No embedding backend; queries use lexical search
    Off,
}

impl EmbeddingMode {
    /// Read `KBASE_EMBEDDING_MODE`, if set
    pub fn from_env() -> Result<Option<Self>> {
        match env::var(EMBEDDING_MODE_ENV) {
            Ok(raw) => raw.parse().map(Some).map_err(VectorStoreError::Other),
            Err(_) => Ok(None),
        }
    }

    /// Construct the provider for this mode; `None` for [`EmbeddingMode::Off`]
    #[must_use]
    pub fn provider(self, dimension: usize) -> Option<HashEmbedder> {
        match self {
            Self::Hash => Some(HashEmbedder::new(dimension)),
            Self::Off => None,
        }
    }
}

impl fmt::Display for EmbeddingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hash => "hash",
            Self::Off => "off",
        })
    }
}

impl FromStr for EmbeddingMode {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hash" | "stub" => Ok(Self::Hash),
            "off" | "none" | "lexical" => Ok(Self::Off),
            other => Err(format!(
                "Unsupported {EMBEDDING_MODE_ENV} '{other}' (expected 'hash' or 'off')"
            )),
        }
    }
}

/// Local embedder producing deterministic unit vectors seeded by a hash of the text.
///
/// Identical texts always map to identical vectors; distinct texts map to
/// unrelated ones. Useful offline and in tests, carries no semantics.
#[derive(Clone, Debug)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut state =
            fnv1a_64(text.as_bytes()) ^ (self.dimension as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut vec = Vec::with_capacity(self.dimension);
        for _ in 0..self.dimension {
            let bits = splitmix64(&mut state);
            let mantissa = ((bits >> 32) as u32) >> 9;
            let unit = f32::from_bits(0x3f80_0000 | mantissa) - 1.0;
            vec.push(unit.mul_add(2.0, -1.0));
        }
        normalize(&mut vec);
        vec
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_EMBEDDING_DIMENSION)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.dimension == 0 {
            return Err(VectorStoreError::provider_unavailable(
                "hash embedder configured with dimension 0",
            ));
        }
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

fn normalize(vec: &mut [f32]) {
    let norm = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vec.iter_mut() {
            *v /= norm;
        }
    }
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

const fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
