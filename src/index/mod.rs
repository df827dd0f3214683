//! Ordered name index
//!
//! Object paths are derived from a digest of the name, so the shard tree
//! cannot be walked in name order. Each bucket keeps a separate sorted index
//! of its live names, updated together with every blob write and delete.

mod cache;
mod name_index;

pub use cache::IndexCache;
pub use name_index::{IndexWriter, NameIndex, PendingInsert};
