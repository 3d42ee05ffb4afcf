use anyhow::{Context, Result};
use kbase_chunker::ChunkerConfig;
use kbase_indexer::{IndexerConfig, DEFAULT_BATCH_SIZE};
use kbase_search::{LexicalConfig, DEFAULT_FUZZY_TOP_K};
use kbase_vector_store::{EmbeddingMode, Metric, DEFAULT_EMBEDDING_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "kbase.toml";

pub const DEFAULT_TOP_K: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KbConfig {
    /// Directory scanned for `.txt` / `.pdf` documents
    pub data_dir: PathBuf,
    /// Snapshot file
    pub store_path: PathBuf,
    pub chunking: ChunkerConfig,
    pub index: IndexSection,
    pub embedding: EmbeddingSection,
    pub search: SearchSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexSection {
    pub metric: Metric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingSection {
    pub mode: EmbeddingMode,
    pub dimension: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchSection {
    pub top_k: usize,
    pub highlight: bool,
    pub fuzzy_top_k: usize,
}

impl Default for KbConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            store_path: PathBuf::from(".kbase/index.json"),
            chunking: ChunkerConfig::default(),
            index: IndexSection::default(),
            embedding: EmbeddingSection::default(),
            search: SearchSection::default(),
        }
    }
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::default(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            highlight: false,
            fuzzy_top_k: DEFAULT_FUZZY_TOP_K,
        }
    }
}

impl KbConfig {
    /// Load `explicit`, else `./kbase.toml` if present, else defaults.
    ///
    /// `KBASE_EMBEDDING_MODE` then overrides `embedding.mode`.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(mode) = EmbeddingMode::from_env()? {
            log::debug!("Embedding mode {mode} from environment");
            config.embedding.mode = mode;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.chunking
            .validate()
            .context("Invalid [chunking] section")?;
        if self.embedding.dimension == 0 {
            anyhow::bail!("embedding.dimension must be > 0");
        }
        if self.embedding.batch_size == 0 {
            anyhow::bail!("embedding.batch_size must be > 0");
        }
        if self.search.top_k == 0 {
            anyhow::bail!("search.top_k must be > 0");
        }
        Ok(())
    }

    pub fn indexer_config(&self) -> IndexerConfig {
        IndexerConfig {
            chunker: self.chunking,
            metric: self.index.metric,
            batch_size: self.embedding.batch_size,
        }
    }

    pub fn lexical_config(&self) -> LexicalConfig {
        LexicalConfig {
            fuzzy_top_k: self.search.fuzzy_top_k,
        }
    }
}
