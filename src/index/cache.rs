//! Process-wide cache of loaded bucket indexes

use super::NameIndex;
use crate::Result;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Loaded [`NameIndex`] per bucket, plus the lock that orders object
/// mutations and listings against bucket removal.
#[derive(Default)]
pub struct IndexCache {
    entries: RwLock<HashMap<String, Arc<NameIndex>>>,
    lifecycle: RwLock<()>,
}

impl IndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index of `bucket`, loading it from `bucket_dir` on first use
    pub fn get_or_load(&self, bucket: &str, bucket_dir: &Path) -> Result<Arc<NameIndex>> {
        if let Some(index) = self.entries.read().get(bucket) {
            return Ok(Arc::clone(index));
        }

        let loaded = Arc::new(NameIndex::load(bucket_dir)?);
        let mut entries = self.entries.write();
        // Another thread may have loaded it meanwhile; keep the first one
        let index = entries
            .entry(bucket.to_string())
            .or_insert(loaded);
        Ok(Arc::clone(index))
    }

    /// Forget a bucket's index
    pub fn evict(&self, bucket: &str) -> Option<Arc<NameIndex>> {
        self.entries.write().remove(bucket)
    }

    /// Held for the duration of an object put, delete or listing
    pub fn object_mutation(&self) -> RwLockReadGuard<'_, ()> {
        self.lifecycle.read()
    }

    /// Held while a bucket is removed; waits out in-flight object mutations
    pub fn bucket_removal(&self) -> RwLockWriteGuard<'_, ()> {
        self.lifecycle.write()
    }

    /// Number of buckets with a loaded index
    pub fn loaded(&self) -> usize {
        self.entries.read().len()
    }
}
