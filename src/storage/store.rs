//! Item Store
//!
//! The ground truth for "what is in the inventory". Items are kept in
//! insertion order, duplicates by label are permitted and stay distinct
//! entries.
//!
//! ## Layout
//!
//! ```text
//! items:    BTreeMap<ItemId, Arc<Item>>      insertion order (ids are monotonic)
//! by_label: HashMap<String, BTreeSet<ItemId>> oldest duplicate first
//! ```
//!
//! The label map turns `take_by_label` into a hash lookup plus a B-tree pop,
//! while still removing the earliest-inserted item when a label repeats.

use crate::storage::{Item, ItemId};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// The unordered-by-expiry collection of live items.
#[derive(Debug, Default)]
pub struct ItemStore {
    items: BTreeMap<ItemId, Arc<Item>>,
    by_label: HashMap<String, BTreeSet<ItemId>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item. Never fails; the id must be fresh.
    pub fn insert(&mut self, id: ItemId, item: Arc<Item>) {
        self.by_label
            .entry(item.label().to_owned())
            .or_default()
            .insert(id);
        self.items.insert(id, item);
    }

    /// Removes and returns the earliest-inserted item carrying `label`.
    ///
    /// Returns `None` without side effects if no live item matches.
    pub fn take_by_label(&mut self, label: &str) -> Option<(ItemId, Arc<Item>)> {
        let ids = self.by_label.get_mut(label)?;
        let id = ids.pop_first()?;
        if ids.is_empty() {
            self.by_label.remove(label);
        }
        let item = self.items.remove(&id)?;
        Some((id, item))
    }

    /// Removes an item by identity.
    pub fn remove(&mut self, id: ItemId) -> Option<Arc<Item>> {
        let item = self.items.remove(&id)?;
        if let Some(ids) = self.by_label.get_mut(item.label()) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_label.remove(item.label());
            }
        }
        Some(item)
    }

    /// Identity membership check.
    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.by_label.contains_key(label)
    }

    /// Live items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Arc<Item>)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn item(label: &str) -> Arc<Item> {
        Arc::new(Item::new(
            label,
            "test",
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    #[test]
    fn test_insert_and_take() {
        let mut store = ItemStore::new();
        store.insert(ItemId(1), item("milk"));

        let (id, taken) = store.take_by_label("milk").unwrap();
        assert_eq!(id, ItemId(1));
        assert_eq!(taken.label(), "milk");
        assert!(store.is_empty());
        assert!(!store.contains_label("milk"));
    }

    #[test]
    fn test_take_unknown_label() {
        let mut store = ItemStore::new();
        store.insert(ItemId(1), item("milk"));

        assert!(store.take_by_label("cheese").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicates_taken_oldest_first() {
        let mut store = ItemStore::new();
        store.insert(ItemId(1), item("milk"));
        store.insert(ItemId(2), item("bread"));
        store.insert(ItemId(3), item("milk"));

        assert_eq!(store.take_by_label("milk").unwrap().0, ItemId(1));
        assert!(!store.contains(ItemId(1)));
        assert!(store.contains(ItemId(3)));
        assert_eq!(store.take_by_label("milk").unwrap().0, ItemId(3));
        assert!(store.take_by_label("milk").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_by_identity_keeps_duplicates() {
        let mut store = ItemStore::new();
        store.insert(ItemId(1), item("milk"));
        store.insert(ItemId(2), item("milk"));

        assert!(store.remove(ItemId(2)).is_some());
        assert!(store.remove(ItemId(2)).is_none());
        assert!(store.contains_label("milk"));
        assert_eq!(store.take_by_label("milk").unwrap().0, ItemId(1));
        assert!(!store.contains_label("milk"));
    }

    #[test]
    fn test_iter_in_insertion_order() {
        let mut store = ItemStore::new();
        for (i, label) in ["c", "a", "b"].iter().enumerate() {
            store.insert(ItemId(i as u64), item(label));
        }

        let labels: Vec<_> = store.iter().map(|(_, item)| item.label().to_owned()).collect();
        assert_eq!(labels, vec!["c", "a", "b"]);
    }
}
