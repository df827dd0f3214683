//! Filesystem object store
//!
//! Buckets are directories under the storage root. Objects are plain files
//! at a path derived from the SHA-1 digest of their name.

mod bucket;
pub mod layout;
mod object;

pub use bucket::BucketStore;
pub use layout::{bucket_path, object_location, object_path, ObjectLocation};
pub use object::ObjectStore;
