//! On-disk layout
//!
//! ```text
//! <root>/
//!   <bucket>/
//!     .names                  ordered name index (append-only log)
//!     <d[0:2]>/<d[2:4]>/<d[4:]>   object bytes, d = hex(sha1(object name))
//! ```
//!
//! Shard directories are always two hex characters, so they never collide
//! with the dot-prefixed index file.

use crate::model::NameDigest;
use crate::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the per-bucket name index
pub const INDEX_FILE_NAME: &str = ".names";

/// Reject names that do not map to exactly one directory under the root.
pub fn validate_bucket_name(bucket: &str) -> Result<()> {
    let bad = bucket.is_empty()
        || bucket == "."
        || bucket == ".."
        || bucket.contains(|c| matches!(c, '/' | '\\' | '\0'));
    if bad {
        return Err(Error::InvalidBucketName(bucket.to_string()));
    }
    Ok(())
}

/// Path of a bucket directory: `root/bucket`.
///
/// With `create` the directory is ensured with a single create-if-absent
/// call. Without it no I/O happens and the path may not exist.
pub fn bucket_path(root: &Path, bucket: &str, create: bool) -> Result<PathBuf> {
    validate_bucket_name(bucket)?;
    let path = root.join(bucket);
    if create {
        fs::create_dir_all(&path)?;
    }
    Ok(path)
}

/// Where an object lives: its shard directory and the file inside it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLocation {
    /// `root/bucket/d[0:2]/d[2:4]`
    pub dir: PathBuf,
    /// `dir/d[4:]`
    pub file: PathBuf,
}

/// Locate an object, optionally ensuring both shard directory levels exist.
///
/// The leaf file is never created here. Without `create` nothing on disk is
/// touched.
pub fn object_location(
    root: &Path,
    bucket: &str,
    name: &str,
    create: bool,
) -> Result<ObjectLocation> {
    let shard = NameDigest::of_name(name).shard();
    let dir = bucket_path(root, bucket, false)?
        .join(&shard.outer)
        .join(&shard.inner);
    if create {
        fs::create_dir_all(&dir)?;
    }
    let file = dir.join(&shard.leaf);
    Ok(ObjectLocation { dir, file })
}

/// Path of an object file: `root/bucket/d[0:2]/d[2:4]/d[4:]`.
pub fn object_path(root: &Path, bucket: &str, name: &str, create: bool) -> Result<PathBuf> {
    Ok(object_location(root, bucket, name, create)?.file)
}

/// Path of a bucket's name index file
pub fn index_path(bucket_dir: &Path) -> PathBuf {
    bucket_dir.join(INDEX_FILE_NAME)
}
