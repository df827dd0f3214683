//! # shardstore
//!
//! A filesystem object store: named buckets holding named byte blobs.
//!
//! Objects are placed on disk by a SHA-1 digest of their *name*, split into
//! two directory levels so no directory grows unbounded. Because that layout
//! scatters names, each bucket also keeps an ordered name index, which makes
//! cursor-based listings come back in byte-wise name order.
//!
//! ## Core Concepts
//!
//! - **Buckets**: directories directly under the storage root
//! - **Objects**: plain files at `<bucket>/<d[0:2]>/<d[2:4]>/<d[4:]>`
//! - **Name index**: per-bucket sorted set of live names, persisted as a log
//! - **Pages**: bounded listing slices with a continuation cursor
//!
//! ## Example
//!
//! ```no_run
//! use shardstore::Storage;
//!
//! # fn main() -> shardstore::Result<()> {
//! let storage = Storage::open("/tmp/shardstore")?;
//! storage.create_bucket("photos")?;
//! storage.put_object("photos", "2021/cat.jpg", b"...")?;
//!
//! let page = storage.list_objects("photos", None, None)?;
//! for entry in &page.entries {
//!     println!("{}", entry.key);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod index;
pub mod listing;
pub mod mime;
pub mod model;
pub mod store;

mod error;
mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use listing::{ListingPager, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use mime::{MimeRegistry, DEFAULT_MIME_TYPE};
pub use model::{digest, BucketInfo, ListEntry, ListPage, NameDigest, ObjectData, ObjectMeta};
pub use storage::Storage;
pub use store::{bucket_path, object_location, object_path, BucketStore, ObjectLocation, ObjectStore};
