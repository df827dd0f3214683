//! Bucket directory lifecycle

use super::layout::{bucket_path, validate_bucket_name};
use crate::index::IndexCache;
use crate::model::{unix_seconds, BucketInfo};
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Creates, removes and enumerates bucket directories under a storage root
pub struct BucketStore<'a> {
    root: &'a Path,
    indexes: &'a IndexCache,
}

impl<'a> BucketStore<'a> {
    pub fn new(root: &'a Path, indexes: &'a IndexCache) -> Self {
        BucketStore { root, indexes }
    }

    /// Path of a bucket, optionally ensuring the directory exists
    pub fn path(&self, bucket: &str, create: bool) -> Result<PathBuf> {
        bucket_path(self.root, bucket, create)
    }

    /// Whether the bucket directory exists. Invalid names never exist.
    pub fn exists(&self, bucket: &str) -> bool {
        match bucket_path(self.root, bucket, false) {
            Ok(path) => path.is_dir(),
            Err(_) => false,
        }
    }

    /// Create a bucket; succeeds when it already exists
    pub fn create(&self, bucket: &str) -> Result<()> {
        let path = bucket_path(self.root, bucket, true)?;
        tracing::info!(bucket, path = %path.display(), "bucket ready");
        Ok(())
    }

    /// Remove a bucket together with every object and its name index.
    pub fn delete(&self, bucket: &str) -> Result<()> {
        let path = bucket_path(self.root, bucket, false)?;
        let _removal = self.indexes.bucket_removal();

        if !path.is_dir() {
            return Err(Error::NotFound(format!("bucket '{}'", bucket)));
        }

        self.indexes.evict(bucket);
        match fs::remove_dir_all(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("bucket '{}'", bucket)));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(bucket, "bucket deleted");
        Ok(())
    }

    /// All buckets under the root, sorted by name
    pub fn list(&self) -> Result<Vec<BucketInfo>> {
        let entries = match fs::read_dir(self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut buckets = Vec::new();
        for entry in entries {
            let entry = entry?;
            let meta = entry.metadata()?;
            if !meta.is_dir() {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_bucket_name(&name).is_err() {
                continue;
            }

            let modified = meta.modified().map(unix_seconds).unwrap_or(0);
            let created = meta.created().map(unix_seconds).unwrap_or(modified);
            buckets.push(BucketInfo {
                name,
                created,
                modified,
            });
        }
        buckets.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(buckets)
    }
}
