use crate::error::{Result, VectorStoreError};
use crate::metric::{l2_norm, Metric};
use ndarray::{Array2, ArrayView1};
use std::cmp::Ordering;

/// A borrowed view of one stored entry
#[derive(Debug, Clone, Copy)]
pub struct IndexEntry<'a> {
    pub entry_id: usize,
    pub vector: ArrayView1<'a, f32>,
    pub text: &'a str,
    pub source: &'a str,
    pub active: bool,
}

/// One search hit
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub entry_id: usize,
    pub distance: f32,
    pub text: String,
    pub source: String,
}

/// Exact (brute-force) vector index over chunk embeddings.
///
/// Entry ids are dense insertion positions and never change: `delete` only
/// flags an entry inactive. Vectors live row-major in a single matrix so a
/// scan walks contiguous memory.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    metric: Metric,
    dimension: usize,
    vectors: Array2<f32>,
    norms: Vec<f32>,
    texts: Vec<String>,
    sources: Vec<String>,
    active: Vec<bool>,
    active_count: usize,
}

impl VectorIndex {
    pub fn new(metric: Metric, dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::InvalidArgument(
                "index dimension must be > 0".to_string(),
            ));
        }

        Ok(Self {
            metric,
            dimension,
            vectors: Array2::zeros((0, dimension)),
            norms: Vec::new(),
            texts: Vec::new(),
            sources: Vec::new(),
            active: Vec::new(),
            active_count: 0,
        })
    }

    /// Build an index from `(vector, text, source)` triples, all of `dimension` length
    pub fn build<I>(metric: Metric, dimension: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Vec<f32>, String, String)>,
    {
        let mut index = Self::new(metric, dimension)?;
        for (vector, text, source) in entries {
            index.add(&vector, text, source)?;
        }
        log::debug!(
            "Built {} index: {} entries, dimension {}",
            metric,
            index.len(),
            dimension
        );
        Ok(index)
    }

    /// Append an entry and return its id
    pub fn add(
        &mut self,
        vector: &[f32],
        text: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<usize> {
        self.check_dimension(vector.len())?;
        if vector.iter().any(|v| !v.is_finite()) {
            return Err(VectorStoreError::InvalidArgument(
                "vector contains NaN or infinite components".to_string(),
            ));
        }

        let row = ArrayView1::from(vector);
        let norm = l2_norm(row);
        if self.metric.uses_norms() && norm == 0.0 {
            return Err(VectorStoreError::DegenerateVector);
        }

        self.vectors
            .push_row(row)
            .map_err(|e| VectorStoreError::Other(format!("append vector row: {e}")))?;
        self.norms.push(norm);
        self.texts.push(text.into());
        self.sources.push(source.into());
        self.active.push(true);
        self.active_count += 1;

        Ok(self.texts.len() - 1)
    }

    /// Mark an entry inactive. Unknown or already-deleted ids are ignored.
    pub fn delete(&mut self, entry_id: usize) {
        if let Some(flag) = self.active.get_mut(entry_id) {
            if *flag {
                *flag = false;
                self.active_count -= 1;
            }
        }
    }

    /// Deactivate every active entry attributed to `source`; returns how many changed
    pub fn delete_source(&mut self, source: &str) -> usize {
        let ids: Vec<usize> = (0..self.len())
            .filter(|&id| self.active[id] && self.sources[id] == source)
            .collect();
        for &id in &ids {
            self.delete(id);
        }
        ids.len()
    }

    /// The `k` active entries closest to `query`, nearest first.
    ///
    /// Equal distances are ordered by ascending entry id.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if k == 0 {
            return Err(VectorStoreError::InvalidArgument(
                "k must be > 0".to_string(),
            ));
        }
        self.check_dimension(query.len())?;
        if query.iter().any(|v| !v.is_finite()) {
            return Err(VectorStoreError::InvalidArgument(
                "query contains NaN or infinite components".to_string(),
            ));
        }

        let query = ArrayView1::from(query);
        let query_norm = l2_norm(query);
        if self.metric.uses_norms() && query_norm == 0.0 {
            return Err(VectorStoreError::DegenerateVector);
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .outer_iter()
            .enumerate()
            .filter(|(id, _)| self.active[*id])
            .map(|(id, row)| {
                let distance = self.metric.distance(query, query_norm, row, self.norms[id]);
                (id, distance)
            })
            .collect();

        if k < scored.len() {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank_order);

        Ok(scored
            .into_iter()
            .map(|(id, distance)| Neighbor {
                entry_id: id,
                distance,
                text: self.texts[id].clone(),
                source: self.sources[id].clone(),
            })
            .collect())
    }

    #[must_use]
    pub fn entry(&self, entry_id: usize) -> Option<IndexEntry<'_>> {
        if entry_id >= self.len() {
            return None;
        }
        Some(IndexEntry {
            entry_id,
            vector: self.vectors.row(entry_id),
            text: &self.texts[entry_id],
            source: &self.sources[entry_id],
            active: self.active[entry_id],
        })
    }

    /// All entries in id order, including inactive ones
    pub fn entries(&self) -> impl Iterator<Item = IndexEntry<'_>> + '_ {
        (0..self.len()).filter_map(|id| self.entry(id))
    }

    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    #[must_use]
    pub const fn dimension(&self) -> usize {
        self.dimension
    }

    /// Total number of entries ever added (ids are `0..len`)
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    fn check_dimension(&self, actual: usize) -> Result<()> {
        if actual != self.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: self.dimension,
                actual,
            });
        }
        Ok(())
    }
}

fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}
