//! Core data model types for shardstore

mod digest;
mod object;

pub use digest::{digest, NameDigest, ShardPath, DIGEST_HEX_LEN, DIGEST_LEN};
pub use object::{BucketInfo, ListEntry, ListPage, ObjectData, ObjectMeta};

pub(crate) use object::unix_seconds;
