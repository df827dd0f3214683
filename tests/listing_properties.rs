//! Property tests for listing order and cursor continuity

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use shardstore::Storage;
use std::collections::BTreeSet;
use tempfile::tempdir;

fn name_strategy() -> impl Strategy<Value = String> {
    // Mix separators, dots and non-ASCII so byte-wise order matters
    "[a-zA-Z0-9/._é-]{1,12}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn pages_cover_every_name_once_in_order(
        names in btree_set(name_strategy(), 0..60),
        limit in 1usize..15,
    ) {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.create_bucket("prop").unwrap();
        for name in &names {
            storage.put_object("prop", name, name.as_bytes()).unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = storage.list_objects("prop", cursor.as_deref(), Some(limit)).unwrap();
            prop_assert!(page.len() <= limit);
            seen.extend(page.entries.iter().map(|e| e.key.clone()));
            match page.next_cursor {
                Some(next) => {
                    prop_assert_eq!(Some(&next), seen.last());
                    prop_assert_eq!(page.entries.len(), limit);
                    cursor = Some(next);
                }
                None => break,
            }
        }

        let expected: Vec<String> = names.into_iter().collect();
        prop_assert_eq!(seen, expected);
    }

    #[test]
    fn deletes_disappear_from_listing(
        names in btree_set("[a-z]{1,6}", 1..40),
        picks in vec(any::<prop::sample::Index>(), 0..20),
    ) {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        storage.create_bucket("prop").unwrap();
        for name in &names {
            storage.put_object("prop", name, b"x").unwrap();
        }

        let all: Vec<&String> = names.iter().collect();
        let doomed: BTreeSet<&String> = picks.iter().map(|i| *i.get(&all)).collect();
        for name in &doomed {
            storage.delete_object("prop", name).unwrap();
        }

        let expected: Vec<String> = names
            .iter()
            .filter(|n| !doomed.contains(n))
            .cloned()
            .collect();
        prop_assert_eq!(storage.all_keys("prop").unwrap(), expected);
    }
}
