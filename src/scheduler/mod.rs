//! Expiry Scheduler Module
//!
//! Everything needed to wake up exactly when the soonest item expires, and
//! never otherwise.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────┐      arm / cancel     ┌─────────────────────┐
//! │          Scheduler            │ ────────────────────> │    dyn Timer        │
//! │  Idle | Armed(Wakeup)         │                       │  TokioTimer (task)  │
//! │  ticket counter               │ <──── on_fire ─────── │  ManualTimer (test) │
//! └───────────────────────────────┘     (via inventory)   └─────────┬───────────┘
//!                                                                   │ now()
//!                                                         ┌─────────▼───────────┐
//!                                                         │     dyn Clock       │
//!                                                         └─────────────────────┘
//! ```
//!
//! - [`Scheduler`]: the Idle/Armed state machine and stale-ticket filter
//! - [`Timer`]: the narrow `{ arm, cancel }` seam
//! - [`TokioTimer`]: production timer, one background task, no polling
//! - [`ManualTimer`]: test timer fired by hand
//! - [`Clock`]: wall-clock seam, [`SystemClock`] and [`ManualClock`]

pub mod clock;
pub mod manual;
pub mod state;
pub mod timer;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use manual::{ManualTimer, ManualTimerHandle};
pub use state::{Scheduler, SchedulerState};
pub use timer::{OnFire, Timer, TokioTimer, Wakeup};
