//! Inventory Facade
//!
//! [`Inventory`] is the public surface: `add`, `remove`, and
//! `list_notifications`, plus a few read-only helpers. It is a cheap,
//! clonable handle; all clones share one inventory.
//!
//! ## Locking
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Shared                            │
//! │  Mutex<InventoryCore>      store + index + scheduler     │
//! │  RwLock<NotificationLog>   appended under the core lock  │
//! │  broadcast::Sender         live subscribers              │
//! └──────────────────────────────────────────────────────────┘
//!        ▲ add / remove (caller threads)    ▲ fire (timer task)
//! ```
//!
//! Callers and the timer take the core mutex for a whole operation. Log
//! appends happen while that mutex is still held, so the log order is the
//! order in which operations were serialized. Reading the log only takes
//! the log's read lock.

use crate::error::{InventoryError, Result};
use crate::inventory::{InventoryConfig, InventoryCore};
use crate::notification::{Notification, NotificationLog};
use crate::scheduler::{Clock, OnFire, SchedulerState, SystemClock, Timer, TokioTimer, Wakeup};
use crate::storage::Item;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tracing::debug;

/// Inventory statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryStats {
    pub live_items: u64,
    pub notifications: u64,
    pub added: u64,
    pub removed: u64,
    pub expired: u64,
    pub expiry_passes: u64,
    pub stale_wakeups: u64,
}

#[derive(Debug, Default)]
struct Counters {
    added: AtomicU64,
    removed: AtomicU64,
    expired: AtomicU64,
    expiry_passes: AtomicU64,
    stale_wakeups: AtomicU64,
}

struct Shared {
    core: Mutex<InventoryCore>,
    log: RwLock<NotificationLog>,
    events: broadcast::Sender<Notification>,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl Shared {
    fn core(&self) -> MutexGuard<'_, InventoryCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends to the log and fans out to subscribers.
    ///
    /// Callers must hold the core lock.
    fn publish(&self, notifications: Vec<Notification>) {
        if notifications.is_empty() {
            return;
        }
        let mut log = self.log.write().unwrap_or_else(PoisonError::into_inner);
        for notification in notifications {
            // No subscribers is fine
            let _ = self.events.send(notification.clone());
            log.append(notification);
        }
    }

    /// Expiry pass for a wake-up delivered by the timer.
    fn fire(&self, wakeup: Wakeup) {
        let mut core = self.core();
        let now = self.clock.now();

        match core.fire(wakeup, now) {
            Some(expired) => {
                let count = expired.len() as u64;
                self.counters.expiry_passes.fetch_add(1, Ordering::Relaxed);
                self.counters.expired.fetch_add(count, Ordering::Relaxed);
                self.publish(expired);

                if count > 0 {
                    debug!(
                        expired = count,
                        remaining = core.len(),
                        "Expired items cleaned up"
                    );
                }
            }
            None => {
                self.counters.stale_wakeups.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// A thread-safe inventory of perishable items.
///
/// # Example
///
/// ```
/// use perishables::{Inventory, Item};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> perishables::Result<()> {
///     let inventory = Inventory::new()?;
///
///     inventory.add(Item::expiring_in("milk", "dairy", Duration::from_secs(3600)))?;
///     let milk = inventory.remove("milk").expect("milk was just added");
///     assert_eq!(milk.kind(), "dairy");
///
///     let notes = inventory.list_notifications();
///     assert!(notes[0].starts_with("Item removed: milk, dairy, "));
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Inventory {
    shared: Arc<Shared>,
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let core = self.shared.core();
        f.debug_struct("Inventory")
            .field("items", &core.len())
            .field("scheduler", &core.scheduler_state())
            .finish()
    }
}

impl Inventory {
    /// Creates an inventory driven by the system clock and a Tokio timer.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::RuntimeUnavailable`] when called outside a
    /// Tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_config(InventoryConfig::default())
    }

    /// Same as [`Inventory::new`] with custom configuration.
    pub fn with_config(config: InventoryConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| InventoryError::RuntimeUnavailable)?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let timer_clock = Arc::clone(&clock);

        Ok(Self::with_timer(config, clock, move |on_fire| {
            TokioTimer::spawn(&runtime, timer_clock, on_fire)
        }))
    }

    /// Creates an inventory with an explicit clock and timer.
    ///
    /// `make_timer` receives the callback the timer must invoke when an
    /// armed wake-up elapses.
    pub fn with_timer<T, F>(config: InventoryConfig, clock: Arc<dyn Clock>, make_timer: F) -> Self
    where
        T: Timer,
        F: FnOnce(OnFire) -> T,
    {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let shared = Arc::new_cyclic(|weak: &Weak<Shared>| {
            let weak = weak.clone();
            let on_fire: OnFire = Arc::new(move |wakeup: Wakeup| {
                if let Some(shared) = weak.upgrade() {
                    shared.fire(wakeup);
                }
            });
            let timer = make_timer(on_fire);

            Shared {
                core: Mutex::new(InventoryCore::new(Box::new(timer), config.timestamp_precision)),
                log: RwLock::new(NotificationLog::new()),
                events,
                clock,
                counters: Counters::default(),
            }
        });

        Self { shared }
    }

    /// Adds an item.
    ///
    /// # Errors
    ///
    /// Returns [`InventoryError::InvalidArgument`] when `item` is `None`.
    /// Nothing is changed in that case. Every label is accepted.
    pub fn add(&self, item: impl Into<Option<Item>>) -> Result<()> {
        let mut core = self.shared.core();
        core.add(item)?;
        self.shared.counters.added.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Takes out the earliest-inserted item with `label`.
    ///
    /// Returns `None`, and records nothing, if no live item has the label.
    pub fn remove(&self, label: &str) -> Option<Item> {
        let mut core = self.shared.core();
        let (item, notification) = core.remove(label)?;
        self.shared.counters.removed.fetch_add(1, Ordering::Relaxed);
        self.shared.publish(vec![notification]);
        Some(Item::clone(&item))
    }

    /// Snapshot of the notification log as text, oldest first.
    pub fn list_notifications(&self) -> Vec<String> {
        self.read_log().snapshot()
    }

    /// Snapshot of the notification log as typed records, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.read_log().records()
    }

    /// Live stream of notifications appended from now on.
    ///
    /// A subscriber that falls more than `event_capacity` records behind
    /// gets `RecvError::Lagged`; the log itself is never affected.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.events.subscribe()
    }

    /// Live items in insertion order.
    pub fn items(&self) -> Vec<Item> {
        self.shared.core().items().map(|item| Item::clone(item)).collect()
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.shared.core().contains_label(label)
    }

    /// Expiration instant of the soonest-expiring live item.
    pub fn next_expiration(&self) -> Option<DateTime<Utc>> {
        self.shared.core().next_expiration()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.shared.core().scheduler_state()
    }

    pub fn len(&self) -> usize {
        self.shared.core().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.core().is_empty()
    }

    /// Checks the store/index/scheduler invariants.
    pub fn verify(&self) -> Result<()> {
        self.shared.core().verify()
    }

    pub fn stats(&self) -> InventoryStats {
        let counters = &self.shared.counters;
        // Log appends happen under the core lock, so holding it pins both counts.
        let core = self.shared.core();
        let live_items = core.len() as u64;
        let notifications = self.read_log().len() as u64;

        let stats = InventoryStats {
            live_items,
            notifications,
            added: counters.added.load(Ordering::Relaxed),
            removed: counters.removed.load(Ordering::Relaxed),
            expired: counters.expired.load(Ordering::Relaxed),
            expiry_passes: counters.expiry_passes.load(Ordering::Relaxed),
            stale_wakeups: counters.stale_wakeups.load(Ordering::Relaxed),
        };
        drop(core);
        stats
    }

    fn read_log(&self) -> std::sync::RwLockReadGuard<'_, NotificationLog> {
        self.shared.log.read().unwrap_or_else(PoisonError::into_inner)
    }
}
