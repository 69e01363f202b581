//! # Perishables - An Expiring Inventory with Notifications
//!
//! Perishables tracks items that go off. Callers add items and take them out
//! by label; the inventory records a notification whenever an item is taken
//! out, and another whenever an item's expiration instant passes, even if
//! nobody touches the inventory again.
//!
//! ## Features
//!
//! - **Two Consistent Views**: an insertion-ordered store and an
//!   expiration-ordered index, always holding the same items
//! - **Exactly One Wake-up**: the scheduler keeps a single timer armed for
//!   the soonest expiration, no polling
//! - **Batch Expiry**: one wake-up expires every item that is due, ties included
//! - **Append-only Log**: notifications in the order they were serialized,
//!   plus a live broadcast stream
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                              Inventory                                  │
//! │                                                                         │
//! │  add / remove ──────┐                                                   │
//! │                     ▼                                                   │
//! │  ┌──────────────────────────────────────────────┐   ┌────────────────┐  │
//! │  │          Mutex<InventoryCore>                │──>│ RwLock<Log>    │  │
//! │  │  ┌───────────┐ ┌─────────────────┐ ┌───────┐ │   │ + broadcast    │  │
//! │  │  │ ItemStore │ │ ExpirationIndex │ │Sched. │ │   └────────────────┘  │
//! │  │  └───────────┘ └─────────────────┘ └───┬───┘ │                       │
//! │  └────────────────────────────────────────┼─────┘                       │
//! │                     ▲                     │ arm / cancel                │
//! │                     │ fire                ▼                             │
//! │               ┌─────┴───────────────────────────────┐                   │
//! │               │           TokioTimer                │                   │
//! │               │      (Background Tokio Task)        │                   │
//! │               └─────────────────────────────────────┘                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use perishables::{Inventory, Item};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> perishables::Result<()> {
//!     let inventory = Inventory::new()?;
//!
//!     inventory.add(Item::expiring_in("milk", "dairy", Duration::from_secs(1)))?;
//!     inventory.add(Item::expiring_in("bread", "bakery", Duration::from_secs(60)))?;
//!
//!     inventory.remove("bread");
//!     tokio::time::sleep(Duration::from_millis(1100)).await;
//!
//!     for line in inventory.list_notifications() {
//!         println!("{line}");
//!     }
//!     // Item removed: bread, bakery, <RFC 3339 expiration>
//!     // Item expired: milk, dairy, <RFC 3339 expiration>
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`storage`]: items, the item store and the expiration index
//! - [`scheduler`]: the wake-up state machine, timers and clocks
//! - [`notification`]: notification records and the append-only log
//! - [`inventory`]: the consistency domain and the public facade
//!
//! ## Design Highlights
//!
//! ### Tie-broken Ordering
//!
//! The expiration index is keyed by `(expiration, insertion id)`. Items that
//! expire at the same instant never collapse into one slot.
//!
//! ### Tickets
//!
//! Each armed wake-up carries a ticket. Cancelling re-arms with a new ticket,
//! so a wake-up that was already in flight when it got cancelled is
//! recognized and dropped instead of running a second expiry pass.

pub mod error;
pub mod inventory;
pub mod notification;
pub mod scheduler;
pub mod storage;

// Re-export commonly used types for convenience
pub use error::{InventoryError, Result};
pub use inventory::{Inventory, InventoryConfig, InventoryStats};
pub use notification::{Notification, NotificationKind};
pub use scheduler::{Clock, ManualClock, ManualTimer, SystemClock, Timer, TokioTimer, Wakeup};
pub use storage::{Item, ItemId};

/// Version of Perishables
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
