//! The Inventory's Consistency Domain
//!
//! [`InventoryCore`] owns the item store, the expiration index and the
//! scheduler, and is the only code that mutates them. It is plain
//! synchronous state: the facade wraps it in a mutex so that an add, a
//! remove, or a whole firing pass (including its reschedule) runs as one
//! critical section.
//!
//! Every path removes an item from both structures before producing the
//! notification for it, and an item leaves the store exactly once, so it
//! can never be both removed and expired.

use crate::error::{InventoryError, Result};
use crate::notification::Notification;
use crate::scheduler::{Scheduler, SchedulerState, Timer, Wakeup};
use crate::storage::{ExpirationIndex, IndexKey, Item, ItemId, ItemStore};
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use tracing::{debug, error, trace};

#[derive(Debug)]
pub struct InventoryCore {
    store: ItemStore,
    index: ExpirationIndex,
    scheduler: Scheduler,
    next_id: u64,
    precision: SecondsFormat,
}

impl InventoryCore {
    pub fn new(timer: Box<dyn Timer>, precision: SecondsFormat) -> Self {
        Self {
            store: ItemStore::new(),
            index: ExpirationIndex::new(),
            scheduler: Scheduler::new(timer),
            next_id: 0,
            precision,
        }
    }

    /// Inserts an item into both views, re-arming if it is now the earliest.
    ///
    /// Any label is accepted, the empty string included. Only an absent
    /// item (`None`) is rejected.
    pub fn add(&mut self, item: impl Into<Option<Item>>) -> Result<ItemId> {
        let Some(item) = item.into() else {
            return Err(InventoryError::InvalidArgument(
                "no item to add".to_string(),
            ));
        };

        let id = ItemId(self.next_id);
        self.next_id += 1;

        let item = Arc::new(item);
        let expiration = item.expiration();
        self.store.insert(id, Arc::clone(&item));
        let indexed = self.index.insert(id, item);
        debug_assert!(indexed, "fresh item id {id} already indexed");

        let is_earliest = self
            .index
            .peek_earliest()
            .is_some_and(|(key, _)| key.id == id);
        if is_earliest {
            self.scheduler.reschedule(Some(expiration));
        }

        debug!(id = %id, expiration = %expiration, earliest = is_earliest, "Item added");
        Ok(id)
    }

    /// Takes out the earliest-inserted item with `label`.
    ///
    /// Returns the item and its removal notification, or `None` if no live
    /// item carries the label.
    pub fn remove(&mut self, label: &str) -> Option<(Arc<Item>, Notification)> {
        let (id, item) = self.store.take_by_label(label)?;
        let key = IndexKey::new(item.expiration(), id);

        let was_earliest = self
            .index
            .peek_earliest()
            .is_some_and(|(earliest, _)| *earliest == key);

        if self.index.remove(&key).is_none() {
            error!(id = %id, label = label, "Removed item was missing from the expiration index");
            debug_assert!(false, "item {id} missing from the expiration index");
        }

        let notification = Notification::removed(Arc::clone(&item), self.precision);

        if was_earliest {
            self.scheduler.reschedule(self.index.earliest_expiration());
        }

        debug!(id = %id, label = label, earliest = was_earliest, "Item removed");
        Some((item, notification))
    }

    /// Runs an expiry pass for a delivered wake-up.
    ///
    /// Returns `None` for a stale wake-up (one that was cancelled or
    /// superseded), otherwise the expiry notifications in ascending
    /// `(expiration, insertion)` order. The scheduler is re-armed for the
    /// next earliest entry, or goes idle, before returning.
    pub fn fire(&mut self, wakeup: Wakeup, now: DateTime<Utc>) -> Option<Vec<Notification>> {
        if !self.scheduler.claim(wakeup) {
            trace!(ticket = wakeup.ticket, "Discarding stale wake-up");
            return None;
        }

        let due = self.index.pop_all_due_by(now);
        let mut expired = Vec::with_capacity(due.len());
        for (key, item) in due {
            if self.store.remove(key.id).is_none() {
                error!(id = %key.id, "Expired item was missing from the item store");
                debug_assert!(false, "item {} missing from the item store", key.id);
            }
            expired.push(Notification::expired(item, self.precision));
        }

        self.scheduler.reschedule(self.index.earliest_expiration());
        Some(expired)
    }

    /// Checks that the store and index hold the same items and that the
    /// scheduler is armed for exactly the earliest one (idle when empty).
    pub fn verify(&self) -> Result<()> {
        if self.store.len() != self.index.len() {
            return Err(InventoryError::InternalInconsistency(format!(
                "store holds {} items but index holds {}",
                self.store.len(),
                self.index.len()
            )));
        }

        for key in self.index.keys() {
            if !self.store.contains(key.id) {
                return Err(InventoryError::InternalInconsistency(format!(
                    "item {} is indexed but not stored",
                    key.id
                )));
            }
        }

        for (id, item) in self.store.iter() {
            if !self.index.contains(&IndexKey::new(item.expiration(), id)) {
                return Err(InventoryError::InternalInconsistency(format!(
                    "item {id} is stored but not indexed"
                )));
            }
        }

        let earliest = self.index.earliest_expiration();
        let armed = self.scheduler.armed_at();
        if earliest != armed {
            return Err(InventoryError::InternalInconsistency(format!(
                "scheduler armed for {armed:?} but earliest expiration is {earliest:?}"
            )));
        }

        Ok(())
    }

    /// Live items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<Item>> {
        self.store.iter().map(|(_, item)| item)
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.store.contains_label(label)
    }

    pub fn next_expiration(&self) -> Option<DateTime<Utc>> {
        self.index.earliest_expiration()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
