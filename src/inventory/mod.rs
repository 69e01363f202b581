//! Inventory Module
//!
//! The operation surface and the consistency domain behind it.
//!
//! ## Data Flow
//!
//! ```text
//! add(item)      ─> store.insert ─> index.insert ─> [new earliest?] reschedule
//!
//! remove(label)  ─> store.take_by_label ─> index.remove ─> log "Item removed"
//!                                                       ─> [was earliest?] reschedule
//!
//! wake-up        ─> [ticket current?] index.pop_all_due_by(now)
//!                ─> store.remove each ─> log "Item expired" each ─> reschedule
//! ```
//!
//! - [`InventoryCore`]: synchronous state and algorithms
//! - [`Inventory`]: the thread-safe, clonable facade
//! - [`InventoryConfig`]: tuning knobs

pub mod config;
pub mod engine;
pub mod handle;

// Re-export commonly used types
pub use config::InventoryConfig;
pub use engine::InventoryCore;
pub use handle::{Inventory, InventoryStats};
