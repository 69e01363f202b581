//! Expiration Index
//!
//! A second, ordered view over the live items, keyed by when they expire.
//! The scheduler only ever needs the earliest entry and a way to drain
//! everything that is due, so a `BTreeMap` gives us both in O(log n).
//!
//! ## Ordering Key
//!
//! Entries are keyed by `(expiration, id)`. The id is the insertion
//! sequence number, so two items expiring at the same instant occupy two
//! distinct slots and come out in insertion order. Keying on expiration
//! alone would make the second insert overwrite the first.

use crate::storage::{Item, ItemId};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordering key: expiration first, insertion sequence as tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IndexKey {
    pub expiration: DateTime<Utc>,
    pub id: ItemId,
}

impl IndexKey {
    pub fn new(expiration: DateTime<Utc>, id: ItemId) -> Self {
        Self { expiration, id }
    }
}

/// Live items ordered by soonest expiration.
#[derive(Debug, Default)]
pub struct ExpirationIndex {
    entries: BTreeMap<IndexKey, Arc<Item>>,
}

impl ExpirationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an item under its ordering key.
    ///
    /// Returns `false` if the key was already present (the entry is left as is).
    pub fn insert(&mut self, id: ItemId, item: Arc<Item>) -> bool {
        let key = IndexKey::new(item.expiration(), id);
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, item);
        true
    }

    /// Removes an entry by identity. Returns `None` if it is not indexed.
    pub fn remove(&mut self, key: &IndexKey) -> Option<Arc<Item>> {
        self.entries.remove(key)
    }

    /// The soonest-expiring entry, without removing it.
    pub fn peek_earliest(&self) -> Option<(&IndexKey, &Arc<Item>)> {
        self.entries.first_key_value()
    }

    /// Instant of the soonest expiration.
    pub fn earliest_expiration(&self) -> Option<DateTime<Utc>> {
        self.entries.first_key_value().map(|(key, _)| key.expiration)
    }

    /// Removes and returns, in ascending key order, every entry whose
    /// expiration is at or before `watermark`.
    pub fn pop_all_due_by(&mut self, watermark: DateTime<Utc>) -> Vec<(IndexKey, Arc<Item>)> {
        let mut due = Vec::new();
        while let Some(entry) = self.entries.first_entry() {
            if entry.key().expiration > watermark {
                break;
            }
            due.push(entry.remove_entry());
        }
        due
    }

    pub fn contains(&self, key: &IndexKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &IndexKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    fn item(label: &str, secs: i64) -> Arc<Item> {
        Arc::new(Item::new(label, "test", at(secs)))
    }

    #[test]
    fn test_peek_earliest() {
        let mut index = ExpirationIndex::new();
        assert!(index.peek_earliest().is_none());

        index.insert(ItemId(1), item("late", 30));
        index.insert(ItemId(2), item("soon", 10));
        index.insert(ItemId(3), item("middle", 20));

        let (key, earliest) = index.peek_earliest().unwrap();
        assert_eq!(key.id, ItemId(2));
        assert_eq!(earliest.label(), "soon");
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_identical_expirations_stay_distinct() {
        let mut index = ExpirationIndex::new();
        assert!(index.insert(ItemId(1), item("a", 10)));
        assert!(index.insert(ItemId(2), item("b", 10)));
        assert!(index.insert(ItemId(3), item("c", 10)));
        assert_eq!(index.len(), 3);

        let due = index.pop_all_due_by(at(10));
        let labels: Vec<_> = due.iter().map(|(_, item)| item.label()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_same_key_twice() {
        let mut index = ExpirationIndex::new();
        assert!(index.insert(ItemId(1), item("a", 10)));
        assert!(!index.insert(ItemId(1), item("a", 10)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut index = ExpirationIndex::new();
        index.insert(ItemId(1), item("a", 10));
        index.insert(ItemId(2), item("a", 10));

        let key = IndexKey::new(at(10), ItemId(1));
        assert!(index.remove(&key).is_some());
        assert!(index.remove(&key).is_none());
        assert!(!index.contains(&key));
        assert_eq!(index.peek_earliest().unwrap().0.id, ItemId(2));
    }

    #[test]
    fn test_pop_all_due_by_watermark() {
        let mut index = ExpirationIndex::new();
        index.insert(ItemId(1), item("c", 30));
        index.insert(ItemId(2), item("a", 10));
        index.insert(ItemId(3), item("b", 20));

        assert!(index.pop_all_due_by(at(9)).is_empty());

        let due = index.pop_all_due_by(at(20));
        let ids: Vec<_> = due.iter().map(|(key, _)| key.id).collect();
        assert_eq!(ids, vec![ItemId(2), ItemId(3)]);
        assert_eq!(index.earliest_expiration(), Some(at(30)));

        assert_eq!(index.pop_all_due_by(at(1000)).len(), 1);
        assert!(index.is_empty());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: every inserted item comes back out exactly once, in
            /// (expiration, insertion) order, however many share an instant.
            #[test]
            fn drains_every_entry_in_key_order(offsets in prop::collection::vec(0i64..5, 1..64)) {
                let mut index = ExpirationIndex::new();
                for (i, secs) in offsets.iter().enumerate() {
                    index.insert(ItemId(i as u64), item("x", *secs));
                }
                prop_assert_eq!(index.len(), offsets.len());

                let drained = index.pop_all_due_by(at(5));
                prop_assert_eq!(drained.len(), offsets.len());

                let keys: Vec<_> = drained.iter().map(|(key, _)| *key).collect();
                let mut sorted = keys.clone();
                sorted.sort();
                prop_assert_eq!(keys, sorted);
                prop_assert!(index.is_empty());
            }

            /// Property: a partial drain leaves exactly the entries past the watermark.
            #[test]
            fn partial_drain_splits_at_watermark(
                offsets in prop::collection::vec(0i64..100, 0..64),
                watermark in 0i64..100,
            ) {
                let mut index = ExpirationIndex::new();
                for (i, secs) in offsets.iter().enumerate() {
                    index.insert(ItemId(i as u64), item("x", *secs));
                }

                let drained = index.pop_all_due_by(at(watermark));
                let expected_due = offsets.iter().filter(|s| **s <= watermark).count();
                prop_assert_eq!(drained.len(), expected_due);
                prop_assert!(index.keys().all(|key| key.expiration > at(watermark)));
            }
        }
    }
}
