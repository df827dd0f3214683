//! High-level Storage API
//!
//! This module provides the main entry point for interacting with shardstore.

use crate::config::Config;
use crate::index::IndexCache;
use crate::listing::{ListingPager, DEFAULT_PAGE_SIZE};
use crate::mime::MimeRegistry;
use crate::model::{BucketInfo, ListPage, ObjectData, ObjectMeta};
use crate::store::{BucketStore, ObjectStore};
use crate::Result;
use std::path::{Path, PathBuf};

/// The main storage interface
///
/// Owns the storage root, the content-type table and the cache of bucket
/// name indexes. All operations are blocking and safe to call from several
/// threads through a shared reference.
pub struct Storage {
    root: PathBuf,
    mime: MimeRegistry,
    indexes: IndexCache,
    page_size: usize,
}

impl Storage {
    /// Open the storage rooted at `root`, creating the directory if needed
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "opened storage");
        Ok(Storage {
            root,
            mime: MimeRegistry::builtin(),
            indexes: IndexCache::new(),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Open the storage described by a [`Config`]
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::open(&config.storage_root)?
            .with_mime_registry(config.mime_registry())
            .with_page_size(config.page_size))
    }

    /// Replace the content-type table
    pub fn with_mime_registry(mut self, mime: MimeRegistry) -> Self {
        self.mime = mime;
        self
    }

    /// Set the page size used when `list_objects` gets no limit
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn mime_registry(&self) -> &MimeRegistry {
        &self.mime
    }

    /// Bucket lifecycle operations
    pub fn buckets(&self) -> BucketStore<'_> {
        BucketStore::new(&self.root, &self.indexes)
    }

    /// Object blob operations
    pub fn objects(&self) -> ObjectStore<'_> {
        ObjectStore::new(&self.root, &self.indexes, &self.mime)
    }

    /// Listing operations
    pub fn pager(&self) -> ListingPager<'_> {
        ListingPager::new(&self.root, &self.indexes)
    }

    // === Bucket Operations ===

    /// Create a bucket. Creating an existing bucket succeeds.
    pub fn create_bucket(&self, bucket: &str) -> Result<()> {
        self.buckets().create(bucket)
    }

    /// Delete a bucket and everything in it
    pub fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.buckets().delete(bucket)
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets().exists(bucket)
    }

    /// All buckets, sorted by name
    pub fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.buckets().list()
    }

    // === Object Operations ===

    /// One page of object names after `cursor`; `limit` defaults to the
    /// configured page size.
    pub fn list_objects(
        &self,
        bucket: &str,
        cursor: Option<&str>,
        limit: Option<usize>,
    ) -> Result<ListPage> {
        self.pager()
            .list(bucket, cursor, limit.unwrap_or(self.page_size))
    }

    /// Store an object; the bucket must exist
    pub fn put_object(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<()> {
        self.objects().put(bucket, name, bytes)
    }

    /// Read an object with its content type
    pub fn get_object(&self, bucket: &str, name: &str) -> Result<ObjectData> {
        self.objects().get(bucket, name)
    }

    /// Object metadata without the content
    pub fn stat_object(&self, bucket: &str, name: &str) -> Result<ObjectMeta> {
        self.objects().stat(bucket, name)
    }

    /// Delete an object
    pub fn delete_object(&self, bucket: &str, name: &str) -> Result<()> {
        self.objects().delete(bucket, name)
    }

    /// Every object name in a bucket, in order
    pub fn all_keys(&self, bucket: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for page in self.pager().pages(bucket, None, self.page_size) {
            keys.extend(page?.entries.into_iter().map(|e| e.key));
        }
        Ok(keys)
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("root", &self.root)
            .field("page_size", &self.page_size)
            .field("loaded_indexes", &self.indexes.loaded())
            .finish()
    }
}
