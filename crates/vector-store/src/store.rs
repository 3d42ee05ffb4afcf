use crate::error::{Result, VectorStoreError};
use crate::index::VectorIndex;
use crate::metric::Metric;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Serialized form of a [`VectorIndex`].
///
/// `vectors`, `texts` and `sources` are parallel arrays indexed by entry id.
/// Vectors are encoded as base64 little-endian `f32` so reloads are bit-exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub version: u32,
    pub dimension: usize,
    pub metric: Metric,
    #[serde(with = "vector_codec")]
    pub vectors: Vec<Vec<f32>>,
    pub texts: Vec<String>,
    pub sources: Vec<String>,
    /// Ids of deleted entries; kept so ids stay stable across reloads
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inactive: Vec<usize>,
}

impl IndexSnapshot {
    #[must_use]
    pub fn from_index(index: &VectorIndex) -> Self {
        let mut snapshot = Self {
            version: SNAPSHOT_VERSION,
            dimension: index.dimension(),
            metric: index.metric(),
            vectors: Vec::with_capacity(index.len()),
            texts: Vec::with_capacity(index.len()),
            sources: Vec::with_capacity(index.len()),
            inactive: Vec::new(),
        };

        for entry in index.entries() {
            snapshot.vectors.push(entry.vector.to_vec());
            snapshot.texts.push(entry.text.to_string());
            snapshot.sources.push(entry.source.to_string());
            if !entry.active {
                snapshot.inactive.push(entry.entry_id);
            }
        }
        snapshot
    }

    /// Validate array consistency and rebuild the index
    pub fn into_index(self) -> Result<VectorIndex> {
        if self.version != SNAPSHOT_VERSION {
            return Err(VectorStoreError::corrupt(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }
        if self.vectors.len() != self.texts.len() || self.texts.len() != self.sources.len() {
            return Err(VectorStoreError::corrupt(format!(
                "array lengths disagree: {} vectors, {} texts, {} sources",
                self.vectors.len(),
                self.texts.len(),
                self.sources.len()
            )));
        }
        if let Some((id, bad)) = self
            .vectors
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != self.dimension)
        {
            return Err(VectorStoreError::corrupt(format!(
                "vector {id} has {} components, declared dimension is {}",
                bad.len(),
                self.dimension
            )));
        }
        let inactive: BTreeSet<usize> = self.inactive.into_iter().collect();
        if let Some(&id) = inactive.iter().find(|&&id| id >= self.vectors.len()) {
            return Err(VectorStoreError::corrupt(format!(
                "inactive id {id} is out of range"
            )));
        }

        let entries = self
            .vectors
            .into_iter()
            .zip(self.texts)
            .zip(self.sources)
            .map(|((vector, text), source)| (vector, text, source));
        let mut index = VectorIndex::build(self.metric, self.dimension, entries)
            .map_err(|e| VectorStoreError::corrupt(format!("rebuild index: {e}")))?;
        for id in inactive {
            index.delete(id);
        }
        Ok(index)
    }
}

/// Whole-file snapshot persistence for a [`VectorIndex`]
#[derive(Debug, Clone)]
pub struct IndexStore {
    path: PathBuf,
}

impl IndexStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the snapshot to a sibling temp file, fsync it, then rename over the target
    pub async fn save(&self, index: &VectorIndex) -> Result<()> {
        log::info!("Saving index snapshot to {:?}", self.path);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec(&IndexSnapshot::from_index(index))?;
        let tmp = tmp_path_for(&self.path);
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, &self.path).await?;

        log::info!(
            "Index snapshot saved: {} entries ({} active)",
            index.len(),
            index.active_count()
        );
        Ok(())
    }

    pub async fn load(&self) -> Result<VectorIndex> {
        log::info!("Loading index snapshot from {:?}", self.path);
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(VectorStoreError::NotFound(self.path.clone()));
            }
            Err(err) => return Err(err.into()),
        };

        let snapshot: IndexSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| VectorStoreError::corrupt(format!("{}: {e}", self.path.display())))?;
        let index = snapshot.into_index()?;

        log::info!(
            "Loaded {} entries ({} active, {} metric, dimension {})",
            index.len(),
            index.active_count(),
            index.metric(),
            index.dimension()
        );
        Ok(index)
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "index".into());
    name.push(".tmp");
    path.with_file_name(name)
}

mod vector_codec {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(vectors: &[Vec<f32>], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(vectors.iter().map(|vector| {
            let bytes: Vec<u8> = vector.iter().flat_map(|v| v.to_le_bytes()).collect();
            STANDARD.encode(bytes)
        }))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Vec<f32>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = Vec::<String>::deserialize(deserializer)?;
        encoded
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let bytes = STANDARD
                    .decode(raw)
                    .map_err(|e| D::Error::custom(format!("vector {idx}: {e}")))?;
                if bytes.len() % 4 != 0 {
                    return Err(D::Error::custom(format!(
                        "vector {idx}: {} bytes is not a whole number of f32 values",
                        bytes.len()
                    )));
                }
                Ok(bytes
                    .chunks_exact(4)
                    .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect())
            })
            .collect()
    }
}
