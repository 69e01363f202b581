//! Notification Log
//!
//! An append-only record of what happened to items: explicit removals and
//! expirations. Entries are appended in the order the inventory serialized
//! the events that caused them and are never reordered or deleted.
//!
//! Readers only ever get a snapshot, never a live view, so the scheduler
//! can keep appending while a caller holds the result.
//!
//! ## Text Format
//!
//! ```text
//! Item removed: <label>, <type>, <expiration>
//! Item expired: <label>, <type>, <expiration>
//! ```
//!
//! `<expiration>` is RFC 3339 in UTC.

use crate::storage::Item;
use chrono::SecondsFormat;
use std::fmt;
use std::sync::Arc;

/// What happened to the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// Taken out by a caller
    Removed,
    /// Its expiration instant elapsed while it was still in the inventory
    Expired,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Removed => "removed",
            NotificationKind::Expired => "expired",
        }
    }
}

/// A single log record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    kind: NotificationKind,
    item: Arc<Item>,
    text: String,
}

impl Notification {
    pub fn removed(item: Arc<Item>, precision: SecondsFormat) -> Self {
        Self::new(NotificationKind::Removed, item, precision)
    }

    pub fn expired(item: Arc<Item>, precision: SecondsFormat) -> Self {
        Self::new(NotificationKind::Expired, item, precision)
    }

    fn new(kind: NotificationKind, item: Arc<Item>, precision: SecondsFormat) -> Self {
        let text = format!("Item {}: {}", kind.as_str(), item.describe(precision));
        Self { kind, item, text }
    }

    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    pub fn item(&self) -> &Item {
        &self.item
    }

    /// The rendered, human-readable record.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Append-only, insertion-ordered sequence of notifications.
///
/// No deduplication, capping or eviction: the log grows for the lifetime
/// of the inventory.
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, notification: Notification) {
        self.entries.push(notification);
    }

    /// Copy of all rendered records appended so far.
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().map(|n| n.text.clone()).collect()
    }

    /// Copy of all typed records appended so far.
    pub fn records(&self) -> Vec<Notification> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
