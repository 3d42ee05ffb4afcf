use crate::error::{Result, VectorStoreError};
use crate::index::{Neighbor, VectorIndex};
use std::sync::{Arc, Mutex, RwLock};

/// Copy-on-write handle to a [`VectorIndex`] shared between readers and one writer.
///
/// Readers grab the current `Arc` and search it without holding any lock.
/// Writers are serialized, mutate a private clone and publish it with a
/// single pointer swap, so a reader sees either the old or the new index.
#[derive(Clone)]
pub struct SharedIndex {
    current: Arc<RwLock<Arc<VectorIndex>>>,
    writer: Arc<Mutex<()>>,
}

impl SharedIndex {
    #[must_use]
    pub fn new(index: VectorIndex) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(index))),
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// The currently published index
    pub fn snapshot(&self) -> Result<Arc<VectorIndex>> {
        let guard = self
            .current
            .read()
            .map_err(|_| VectorStoreError::Other("index lock poisoned".into()))?;
        Ok(Arc::clone(&*guard))
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.snapshot()?.search(query, k)
    }

    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.snapshot().ok().map(|index| index.dimension())
    }

    /// Apply `mutation` to a private copy and publish it if it succeeds.
    ///
    /// On error nothing is published and readers keep the previous index.
    pub fn update<T, F>(&self, mutation: F) -> Result<T>
    where
        F: FnOnce(&mut VectorIndex) -> Result<T>,
    {
        let _writer = self
            .writer
            .lock()
            .map_err(|_| VectorStoreError::Other("index writer lock poisoned".into()))?;

        let mut next = (*self.snapshot()?).clone();
        let out = mutation(&mut next)?;

        let mut guard = self
            .current
            .write()
            .map_err(|_| VectorStoreError::Other("index lock poisoned".into()))?;
        *guard = Arc::new(next);
        Ok(out)
    }

    pub fn add(&self, vector: &[f32], text: &str, source: &str) -> Result<usize> {
        self.update(|index| index.add(vector, text, source))
    }

    pub fn delete(&self, entry_id: usize) -> Result<()> {
        self.update(|index| {
            index.delete(entry_id);
            Ok(())
        })
    }

    pub fn delete_source(&self, source: &str) -> Result<usize> {
        self.update(|index| Ok(index.delete_source(source)))
    }
}
