//! Storage Module
//!
//! The two views of the inventory and the item they share.
//!
//! ## Architecture
//!
//! ```text
//!                ┌──────────────────────┐
//!                │      Arc<Item>       │
//!                └──────────┬───────────┘
//!                  ┌────────┴────────┐
//!                  ▼                 ▼
//! ┌──────────────────────┐  ┌──────────────────────────┐
//! │      ItemStore       │  │     ExpirationIndex      │
//! │  insertion order     │  │  (expiration, id) order  │
//! │  label -> ids        │  │  earliest / drain due    │
//! └──────────────────────┘  └──────────────────────────┘
//! ```
//!
//! Neither structure is synchronized on its own. They are only ever mutated
//! together, from inside the inventory's single critical section.
//!
//! ## Example
//!
//! ```
//! use perishables::storage::{ExpirationIndex, Item, ItemId, ItemStore};
//! use chrono::{Duration, Utc};
//! use std::sync::Arc;
//!
//! let now = Utc::now();
//! let item = Arc::new(Item::new("milk", "dairy", now + Duration::seconds(5)));
//!
//! let mut store = ItemStore::new();
//! let mut index = ExpirationIndex::new();
//! store.insert(ItemId(0), Arc::clone(&item));
//! index.insert(ItemId(0), item);
//!
//! assert!(index.pop_all_due_by(now).is_empty());
//! assert_eq!(index.pop_all_due_by(now + Duration::seconds(5)).len(), 1);
//! ```

pub mod index;
pub mod item;
pub mod store;

// Re-export commonly used types
pub use index::{ExpirationIndex, IndexKey};
pub use item::{Item, ItemId};
pub use store::ItemStore;
