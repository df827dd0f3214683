//! Object, listing and bucket records returned by the store

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Content of an object together with its resolved content type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectData {
    /// The exact bytes that were stored
    pub bytes: Bytes,
    /// Content type resolved from the object name's extension
    pub content_type: String,
}

/// Object metadata read from the filesystem without loading the content
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    /// Last modification time (unix seconds)
    pub modified: u64,
}

/// One entry of a listing page
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListEntry {
    #[serde(rename = "Key")]
    pub key: String,
}

impl ListEntry {
    pub fn new(key: impl Into<String>) -> Self {
        ListEntry { key: key.into() }
    }
}

/// A bounded, ordered slice of a bucket listing
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPage {
    /// Entries in ascending byte-wise order
    pub entries: Vec<ListEntry>,
    /// Key to resume from; present only when more entries exist past this page
    pub next_cursor: Option<String>,
}

impl ListPage {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether another page follows this one
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Iterate over the keys of this page
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }
}

/// A bucket as seen when enumerating the storage root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketInfo {
    pub name: String,
    /// Creation time (unix seconds); falls back to `modified` on filesystems
    /// that do not record birth time
    pub created: u64,
    /// Last modification time of the bucket directory (unix seconds)
    pub modified: u64,
}

/// Seconds since the unix epoch, saturating to zero for pre-epoch times
pub(crate) fn unix_seconds(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
