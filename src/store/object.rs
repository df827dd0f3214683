//! Object blob lifecycle
//!
//! Blobs live at the digest-sharded path of their name. Each put or delete
//! holds the bucket's index writer across the file operation so the name
//! index never disagrees with what a reader can observe.

use super::layout::{bucket_path, object_location, object_path};
use crate::index::IndexCache;
use crate::mime::MimeRegistry;
use crate::model::{digest, unix_seconds, ObjectData, ObjectMeta};
use crate::{Error, Result};
use bytes::Bytes;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Reads, writes and deletes objects under a storage root
pub struct ObjectStore<'a> {
    root: &'a Path,
    indexes: &'a IndexCache,
    mime: &'a MimeRegistry,
}

impl<'a> ObjectStore<'a> {
    pub fn new(root: &'a Path, indexes: &'a IndexCache, mime: &'a MimeRegistry) -> Self {
        ObjectStore {
            root,
            indexes,
            mime,
        }
    }

    /// Hex digest of an object name
    pub fn digest(name: &str) -> String {
        digest(name)
    }

    /// Path of an object, optionally ensuring its shard directories exist
    pub fn path(&self, bucket: &str, name: &str, create: bool) -> Result<PathBuf> {
        object_path(self.root, bucket, name, create)
    }

    /// Store `bytes` under `name`, replacing any previous content.
    ///
    /// The bytes are staged in a temporary file next to the target and
    /// renamed into place, so readers see either the old or the new blob.
    pub fn put(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<()> {
        let bucket_dir = bucket_path(self.root, bucket, false)?;
        let _mutation = self.indexes.object_mutation();
        if !bucket_dir.is_dir() {
            return Err(bucket_not_found(bucket));
        }

        let index = self.indexes.get_or_load(bucket, &bucket_dir)?;
        let mut writer = index.writer();
        // Encode first so a failure leaves no blob behind
        let pending = writer.prepare_insert(name)?;

        let location = object_location(self.root, bucket, name, true)?;
        let mut staged = NamedTempFile::new_in(&location.dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;
        staged.persist(&location.file).map_err(|e| e.error)?;

        if let Some(pending) = pending {
            writer.commit(pending)?;
        }

        tracing::debug!(
            bucket,
            name,
            size = bytes.len(),
            path = %location.file.display(),
            "object stored"
        );
        Ok(())
    }

    /// Read an object and resolve its content type from the name.
    ///
    /// A missing bucket and a missing object are both `NotFound`.
    pub fn get(&self, bucket: &str, name: &str) -> Result<ObjectData> {
        let path = object_path(self.root, bucket, name, false)?;
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(object_not_found(bucket, name));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ObjectData {
            bytes: Bytes::from(data),
            content_type: self.mime.resolve(name).to_string(),
        })
    }

    /// Size, content type and modification time of an object
    pub fn stat(&self, bucket: &str, name: &str) -> Result<ObjectMeta> {
        let path = object_path(self.root, bucket, name, false)?;
        let meta = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(object_not_found(bucket, name)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(object_not_found(bucket, name));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ObjectMeta {
            key: name.to_string(),
            size: meta.len(),
            content_type: self.mime.resolve(name).to_string(),
            modified: meta.modified().map(unix_seconds).unwrap_or(0),
        })
    }

    /// Remove an object. Deleting an absent object is `NotFound`.
    pub fn delete(&self, bucket: &str, name: &str) -> Result<()> {
        let path = object_path(self.root, bucket, name, false)?;
        let _mutation = self.indexes.object_mutation();
        if !path.is_file() {
            return Err(object_not_found(bucket, name));
        }

        let bucket_dir = bucket_path(self.root, bucket, false)?;
        let index = self.indexes.get_or_load(bucket, &bucket_dir)?;
        let mut writer = index.writer();

        match fs::remove_file(&path) {
            Ok(()) => {}
            // Lost a race with another delete of the same name
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(object_not_found(bucket, name));
            }
            Err(e) => return Err(e.into()),
        }
        writer.remove(name)?;

        tracing::debug!(bucket, name, "object deleted");
        Ok(())
    }
}

fn bucket_not_found(bucket: &str) -> Error {
    Error::NotFound(format!("bucket '{}'", bucket))
}

fn object_not_found(bucket: &str, name: &str) -> Error {
    Error::NotFound(format!("object '{}' in bucket '{}'", name, bucket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BucketStore;
    use tempfile::tempdir;

    struct Fixture {
        dir: tempfile::TempDir,
        cache: IndexCache,
        mime: MimeRegistry,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                dir: tempdir().unwrap(),
                cache: IndexCache::new(),
                mime: MimeRegistry::builtin(),
            }
        }

        fn objects(&self) -> ObjectStore<'_> {
            ObjectStore::new(self.dir.path(), &self.cache, &self.mime)
        }

        fn buckets(&self) -> BucketStore<'_> {
            BucketStore::new(self.dir.path(), &self.cache)
        }
    }

    #[test]
    fn test_put_get_roundtrip() {
        let fx = Fixture::new();
        fx.buckets().create("test").unwrap();

        fx.objects().put("test", "hello.txt", b"hello world").unwrap();
        let data = fx.objects().get("test", "hello.txt").unwrap();

        assert_eq!(&data.bytes[..], b"hello world");
        assert_eq!(data.content_type, "text/plain");
        assert!(fx
            .dir
            .path()
            .join("test/38/57/b672471862eab426eba0622e44bd2cedbd5d")
            .is_file());
    }

    #[test]
    fn test_put_overwrites() {
        let fx = Fixture::new();
        fx.buckets().create("test").unwrap();

        fx.objects().put("test", "a.bin", b"first version").unwrap();
        fx.objects().put("test", "a.bin", b"second").unwrap();

        let data = fx.objects().get("test", "a.bin").unwrap();
        assert_eq!(&data.bytes[..], b"second");
        assert_eq!(data.content_type, crate::mime::DEFAULT_MIME_TYPE);
    }

    #[test]
    fn test_put_without_bucket() {
        let fx = Fixture::new();

        let err = fx.objects().put("missing", "a.txt", b"x").unwrap_err();
        assert!(err.is_not_found());
        assert!(!fx.dir.path().join("missing").exists());
        assert!(!fx.objects().path("missing", "a.txt", false).unwrap().exists());
    }

    #[test]
    fn test_empty_object() {
        let fx = Fixture::new();
        fx.buckets().create("test").unwrap();

        fx.objects().put("test", "empty", b"").unwrap();
        assert!(fx.objects().get("test", "empty").unwrap().bytes.is_empty());
        assert_eq!(fx.objects().stat("test", "empty").unwrap().size, 0);
    }

    #[test]
    fn test_delete_then_get() {
        let fx = Fixture::new();
        fx.buckets().create("test").unwrap();
        fx.objects().put("test", "doomed.txt", b"bye").unwrap();

        fx.objects().delete("test", "doomed.txt").unwrap();
        assert!(fx.objects().get("test", "doomed.txt").unwrap_err().is_not_found());
        // A second delete reports the object as missing
        assert!(fx
            .objects()
            .delete("test", "doomed.txt")
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_get_missing() {
        let fx = Fixture::new();
        assert!(fx.objects().get("nope", "a.txt").unwrap_err().is_not_found());

        fx.buckets().create("test").unwrap();
        assert!(fx.objects().get("test", "a.txt").unwrap_err().is_not_found());
        assert!(fx.objects().stat("test", "a.txt").unwrap_err().is_not_found());
    }

    #[test]
    fn test_stat() {
        let fx = Fixture::new();
        fx.buckets().create("test").unwrap();
        fx.objects().put("test", "img/logo.PNG", &[0u8; 128]).unwrap();

        let meta = fx.objects().stat("test", "img/logo.PNG").unwrap();
        assert_eq!(meta.key, "img/logo.PNG");
        assert_eq!(meta.size, 128);
        assert_eq!(meta.content_type, "image/png");
    }

    #[test]
    fn test_digest_is_exposed() {
        assert_eq!(
            ObjectStore::digest("hello.txt"),
            "3857b672471862eab426eba0622e44bd2cedbd5d"
        );
    }
}
