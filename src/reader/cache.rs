use crate::error::GraphResult;
use arrow::record_batch::RecordBatch;
use std::collections::HashMap;

/// Which file of a chunk a cached batch came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheSlot {
    /// Property group by index
    Group(usize),
    Labels,
    Adjacency,
}

/// Batches of the chunk a cursor currently points into
///
/// Entries are keyed by `(slot, chunk)`; moving to another chunk drops
/// every entry, so at most one chunk's worth of data is held.
#[derive(Debug)]
pub struct ChunkCache<K> {
    chunk: Option<K>,
    batches: HashMap<CacheSlot, RecordBatch>,
    loads: usize,
}

impl<K> Default for ChunkCache<K> {
    fn default() -> Self {
        Self {
            chunk: None,
            batches: HashMap::new(),
            loads: 0,
        }
    }
}

impl<K: Copy + PartialEq> ChunkCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached batch for `(slot, chunk)`, loading it on a miss
    pub fn get_or_load(
        &mut self,
        slot: CacheSlot,
        chunk: K,
        load: impl FnOnce() -> GraphResult<RecordBatch>,
    ) -> GraphResult<RecordBatch> {
        if self.chunk != Some(chunk) {
            self.batches.clear();
            self.chunk = Some(chunk);
        }
        if let Some(batch) = self.batches.get(&slot) {
            return Ok(batch.clone());
        }
        let batch = load()?;
        self.loads += 1;
        self.batches.insert(slot, batch.clone());
        Ok(batch)
    }

    pub fn clear(&mut self) {
        self.chunk = None;
        self.batches.clear();
    }

    pub fn chunk(&self) -> Option<K> {
        self.chunk
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of loads performed so far
    pub fn loads(&self) -> usize {
        self.loads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Int32Array};
    use std::sync::Arc;

    fn batch(v: i32) -> GraphResult<RecordBatch> {
        let column: ArrayRef = Arc::new(Int32Array::from(vec![v]));
        Ok(RecordBatch::try_from_iter(vec![("v", column)])?)
    }

    #[test]
    fn test_hit_and_eviction() {
        let mut cache: ChunkCache<i64> = ChunkCache::new();
        cache.get_or_load(CacheSlot::Group(0), 0, || batch(1)).unwrap();
        cache
            .get_or_load(CacheSlot::Group(0), 0, || panic!("should hit"))
            .unwrap();
        cache.get_or_load(CacheSlot::Labels, 0, || batch(2)).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.loads(), 2);

        cache.get_or_load(CacheSlot::Group(0), 1, || batch(3)).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.chunk(), Some(1));
        assert_eq!(cache.loads(), 3);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.chunk(), None);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let mut cache: ChunkCache<(i64, i64)> = ChunkCache::new();
        let err = cache.get_or_load(CacheSlot::Adjacency, (0, 0), || {
            Err(crate::error::GraphError::NotFound("chunk0".into()))
        });
        assert!(err.is_err());
        assert!(cache.is_empty());
        cache
            .get_or_load(CacheSlot::Adjacency, (0, 0), || batch(1))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }
}
