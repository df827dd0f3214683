//! Ordered index of live object names for one bucket
//!
//! Log format:
//! ```text
//! [RECORD]*
//!   - bincode (varint) encoding of IndexRecord::Put(name) | IndexRecord::Delete(name)
//! ```
//!
//! The log is replayed into a `BTreeSet` on load. A record that cannot be
//! decoded at the tail is treated as a torn write and cut off. When
//! tombstones outnumber live names the log is rewritten with one `Put` per
//! live name.

use crate::store::layout::index_path;
use crate::Result;
use bincode::Options;
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Cursor, Write};
use std::ops::Bound;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Compaction never runs below this many tombstones
const COMPACT_MIN_TOMBSTONES: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum IndexRecord {
    Put(String),
    Delete(String),
}

fn codec() -> bincode::DefaultOptions {
    bincode::DefaultOptions::new()
}

struct IndexState {
    names: BTreeSet<String>,
    /// Append handle, opened on the first write
    log: Option<File>,
    tombstones: usize,
}

/// Sorted set of the names currently stored in a bucket, backed by a log file
pub struct NameIndex {
    path: PathBuf,
    state: RwLock<IndexState>,
}

impl NameIndex {
    /// Load the index of the bucket rooted at `bucket_dir`.
    ///
    /// A missing log file is an empty index; nothing is created until the
    /// first write.
    pub fn load(bucket_dir: &Path) -> Result<Self> {
        let path = index_path(bucket_dir);
        let mut names = BTreeSet::new();
        let mut tombstones = 0;

        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        let mut cursor = Cursor::new(data.as_slice());
        let mut good = 0u64;
        while (cursor.position() as usize) < data.len() {
            // A record can never claim more bytes than the log has left
            let remaining = data.len() as u64 - cursor.position();
            match codec()
                .with_limit(remaining)
                .deserialize_from::<_, IndexRecord>(&mut cursor)
            {
                Ok(IndexRecord::Put(name)) => {
                    names.insert(name);
                }
                Ok(IndexRecord::Delete(name)) => {
                    names.remove(&name);
                    tombstones += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        offset = good,
                        error = %e,
                        "truncating unreadable name index tail"
                    );
                    let file = OpenOptions::new().write(true).open(&path)?;
                    file.set_len(good)?;
                    break;
                }
            }
            good = cursor.position();
        }

        tracing::debug!(path = %path.display(), live = names.len(), tombstones, "loaded name index");

        Ok(NameIndex {
            path,
            state: RwLock::new(IndexState {
                names,
                log: None,
                tombstones,
            }),
        })
    }

    /// Up to `limit` names strictly greater than `after` (or from the start),
    /// in ascending byte-wise order.
    pub fn range_after(&self, after: Option<&str>, limit: usize) -> Vec<String> {
        let state = self.state.read();
        let lower = match after {
            Some(cursor) => Bound::Excluded(cursor),
            None => Bound::Unbounded,
        };
        state
            .names
            .range::<str, _>((lower, Bound::Unbounded))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.read().names.contains(name)
    }

    /// Number of live names
    pub fn len(&self) -> usize {
        self.state.read().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Exclusive access for a blob mutation and its matching index update.
    ///
    /// Listings block until the writer is dropped, so they observe the blob
    /// and its name together.
    pub fn writer(&self) -> IndexWriter<'_> {
        IndexWriter {
            path: &self.path,
            state: self.state.write(),
        }
    }

    /// Path of the backing log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// An encoded `Put` record waiting for [`IndexWriter::commit`]
pub struct PendingInsert {
    name: String,
    bytes: Vec<u8>,
}

/// Write guard over a [`NameIndex`]
pub struct IndexWriter<'a> {
    path: &'a Path,
    state: RwLockWriteGuard<'a, IndexState>,
}

impl IndexWriter<'_> {
    /// Record that `name` is live. Re-inserting a live name writes nothing.
    pub fn insert(&mut self, name: &str) -> Result<()> {
        match self.prepare_insert(name)? {
            Some(pending) => self.commit(pending),
            None => Ok(()),
        }
    }

    /// Encode the `Put` record for `name` without touching the log.
    ///
    /// `None` when the name is already live. Lets a caller fail before it
    /// changes anything else on disk.
    pub fn prepare_insert(&self, name: &str) -> Result<Option<PendingInsert>> {
        if self.state.names.contains(name) {
            return Ok(None);
        }
        let bytes = codec().serialize(&IndexRecord::Put(name.to_string()))?;
        Ok(Some(PendingInsert {
            name: name.to_string(),
            bytes,
        }))
    }

    /// Append a prepared `Put` and make its name live
    pub fn commit(&mut self, pending: PendingInsert) -> Result<()> {
        if self.state.names.contains(&pending.name) {
            return Ok(());
        }
        self.append_bytes(&pending.bytes)?;
        self.state.names.insert(pending.name);
        Ok(())
    }

    /// Record that `name` is gone
    pub fn remove(&mut self, name: &str) -> Result<()> {
        if !self.state.names.contains(name) {
            return Ok(());
        }
        self.append(&IndexRecord::Delete(name.to_string()))?;
        self.state.names.remove(name);
        self.state.tombstones += 1;

        if self.state.tombstones >= COMPACT_MIN_TOMBSTONES
            && self.state.tombstones > self.state.names.len()
        {
            self.compact()?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.state.names.contains(name)
    }

    /// Rewrite the log so it holds exactly one `Put` per live name
    pub fn compact(&mut self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        for name in &self.state.names {
            let bytes = codec().serialize(&IndexRecord::Put(name.clone()))?;
            tmp.write_all(&bytes)?;
        }
        tmp.flush()?;

        // Drop the append handle first so it never points at the replaced file
        self.state.log = None;
        tmp.persist(self.path).map_err(|e| e.error)?;

        tracing::debug!(
            path = %self.path.display(),
            live = self.state.names.len(),
            dropped = self.state.tombstones,
            "compacted name index"
        );
        self.state.tombstones = 0;
        Ok(())
    }

    fn append(&mut self, record: &IndexRecord) -> Result<()> {
        let bytes = codec().serialize(record)?;
        self.append_bytes(&bytes)
    }

    fn append_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.state.log.is_none() {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path)?;
            self.state.log = Some(file);
        }
        if let Some(log) = self.state.log.as_mut() {
            log.write_all(bytes)?;
        }
        Ok(())
    }
}
