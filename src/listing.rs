//! Paginated, name-ordered bucket listings
//!
//! Pages are read from the bucket's [`NameIndex`](crate::index::NameIndex),
//! never from the shard tree. The pager asks for one name more than the page
//! holds; that extra name only decides whether a cursor is handed out, so a
//! bucket holding exactly `limit` names yields a single page with no cursor.

use crate::index::IndexCache;
use crate::model::{ListEntry, ListPage};
use crate::store::bucket_path;
use crate::{Error, Result};
use std::path::Path;

/// Page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page the pager will return
pub const MAX_PAGE_SIZE: usize = 1000;

/// Lists the objects of a bucket in ascending byte-wise name order
pub struct ListingPager<'a> {
    root: &'a Path,
    indexes: &'a IndexCache,
}

impl<'a> ListingPager<'a> {
    pub fn new(root: &'a Path, indexes: &'a IndexCache) -> Self {
        ListingPager { root, indexes }
    }

    /// One page of names strictly after `cursor`.
    ///
    /// `limit` is clamped into `1..=MAX_PAGE_SIZE`, so a limit of 0 is
    /// raised to 1 and yields a one-entry page. The returned `next_cursor` is
    /// the last key of the page and is only present when at least one more
    /// name follows it.
    pub fn list(&self, bucket: &str, cursor: Option<&str>, limit: usize) -> Result<ListPage> {
        let bucket_dir = bucket_path(self.root, bucket, false)?;
        // Keeps a concurrent bucket removal from evicting the index between
        // the existence check and the cache insert
        let _lifecycle = self.indexes.object_mutation();
        if !bucket_dir.is_dir() {
            return Err(Error::NotFound(format!("bucket '{}'", bucket)));
        }

        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let index = self.indexes.get_or_load(bucket, &bucket_dir)?;
        let mut names = index.range_after(cursor, limit + 1);

        let has_more = names.len() > limit;
        names.truncate(limit);
        let next_cursor = if has_more { names.last().cloned() } else { None };

        tracing::debug!(
            bucket,
            cursor = cursor.unwrap_or(""),
            returned = names.len(),
            has_more,
            "listed objects"
        );

        Ok(ListPage {
            entries: names.into_iter().map(ListEntry::new).collect(),
            next_cursor,
        })
    }

    /// Iterate over every page of a bucket, starting after `cursor`
    pub fn pages<'s>(&'s self, bucket: &'s str, cursor: Option<String>, limit: usize) -> Pages<'s> {
        Pages {
            pager: self,
            bucket,
            cursor,
            limit,
            done: false,
        }
    }
}

/// Iterator over successive listing pages; stops after the first error
pub struct Pages<'p> {
    pager: &'p ListingPager<'p>,
    bucket: &'p str,
    cursor: Option<String>,
    limit: usize,
    done: bool,
}

impl Iterator for Pages<'_> {
    type Item = Result<ListPage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = self
            .pager
            .list(self.bucket, self.cursor.as_deref(), self.limit);
        match &page {
            Ok(p) => {
                self.cursor = p.next_cursor.clone();
                self.done = self.cursor.is_none();
            }
            Err(_) => self.done = true,
        }
        Some(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn fill(root: &Path, cache: &IndexCache, bucket: &str, names: &[String]) {
        let dir = bucket_path(root, bucket, true).unwrap();
        let index = cache.get_or_load(bucket, &dir).unwrap();
        let mut w = index.writer();
        for name in names {
            w.insert(name).unwrap();
        }
    }

    fn numbered(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{}-{:03}.txt", prefix, i)).collect()
    }

    #[test]
    fn test_missing_bucket() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        let pager = ListingPager::new(dir.path(), &cache);

        assert!(pager.list("nope", None, 100).unwrap_err().is_not_found());
    }

    #[test]
    fn test_empty_bucket() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let pager = ListingPager::new(dir.path(), &cache);

        let page = pager.list("empty", None, 100).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_exact_page_has_no_cursor() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        fill(dir.path(), &cache, "b", &numbered("k", 3));
        let pager = ListingPager::new(dir.path(), &cache);

        let page = pager.list("b", None, 3).unwrap();
        assert_eq!(page.len(), 3);
        assert_eq!(page.next_cursor, None);
    }

    #[test]
    fn test_one_past_page_has_cursor() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        fill(dir.path(), &cache, "b", &numbered("k", 4));
        let pager = ListingPager::new(dir.path(), &cache);

        let first = pager.list("b", None, 3).unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first.next_cursor.as_deref(), Some("k-002.txt"));

        let second = pager.list("b", first.next_cursor.as_deref(), 3).unwrap();
        assert_eq!(second.keys().collect::<Vec<_>>(), vec!["k-003.txt"]);
        assert_eq!(second.next_cursor, None);
    }

    #[test]
    fn test_list_racing_bucket_removal_leaves_no_stale_index() {
        use crate::store::BucketStore;
        use std::sync::atomic::{AtomicBool, Ordering};

        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        let buckets = BucketStore::new(dir.path(), &cache);
        let pager = ListingPager::new(dir.path(), &cache);
        let stop = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                while !stop.load(Ordering::Relaxed) {
                    let _ = pager.list("b", None, 10);
                }
            });

            let mut stale = None;
            for round in 0..200 {
                buckets.create("b").unwrap();
                fill(dir.path(), &cache, "b", &numbered("x", 5));
                buckets.delete("b").unwrap();
                buckets.create("b").unwrap();
                let page = pager.list("b", None, 10).unwrap();
                buckets.delete("b").unwrap();
                if !page.is_empty() {
                    stale = Some((round, page));
                    break;
                }
            }
            stop.store(true, Ordering::Relaxed);
            assert_eq!(stale, None);
        });
    }

    #[test]
    fn test_limit_is_clamped() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        fill(dir.path(), &cache, "b", &numbered("k", 2));
        let pager = ListingPager::new(dir.path(), &cache);

        let page = pager.list("b", None, 0).unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.next_cursor.as_deref(), Some("k-000.txt"));
    }

    #[test]
    fn test_pages_iterator_covers_everything() {
        let dir = tempdir().unwrap();
        let cache = IndexCache::new();
        let names = numbered("obj", 25);
        fill(dir.path(), &cache, "b", &names);
        let pager = ListingPager::new(dir.path(), &cache);

        let pages: Vec<ListPage> = pager
            .pages("b", None, 10)
            .collect::<Result<_>>()
            .unwrap();
        let sizes: Vec<_> = pages.iter().map(ListPage::len).collect();
        assert_eq!(sizes, vec![10, 10, 5]);

        let keys: Vec<String> = pages
            .iter()
            .flat_map(|p| p.keys().map(str::to_string))
            .collect();
        assert_eq!(keys, names);
    }
}
