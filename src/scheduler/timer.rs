//! One-Shot Wake-up Timer
//!
//! The scheduler only needs two things from a timer: arm a single wake-up
//! for an instant, and cancel it. The [`Timer`] trait is exactly that, so the
//! scheduling algorithm can be driven by the real Tokio-backed timer in
//! production and by a manual one in tests.
//!
//! ## Design
//!
//! [`TokioTimer`] owns a `watch` channel holding the pending wake-up (or
//! `None`). A single background task:
//! 1. Reads the pending wake-up
//! 2. Sleeps until its instant, or until the pending value changes
//! 3. On elapse, calls the bound callback with the wake-up
//! 4. Waits for the re-arm (or cancel) the firing pass always performs
//!
//! There is no polling: with nothing armed, the task just waits on the
//! channel. Instants in the past give a zero-length sleep and fire at once.
//! Dropping the timer drops the sender, which ends the task.

use crate::scheduler::Clock;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// A single armed wake-up.
///
/// The ticket is unique per arming, so a wake-up that raced with a cancel
/// can be recognized as stale when it is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Wakeup {
    pub at: DateTime<Utc>,
    pub ticket: u64,
}

/// Callback a timer invokes when an armed wake-up elapses.
pub type OnFire = Arc<dyn Fn(Wakeup) + Send + Sync>;

/// A one-shot timer holding at most one pending wake-up.
///
/// The callback is bound when the timer is constructed.
pub trait Timer: Send + 'static {
    /// Schedules `wakeup`, replacing whatever was pending.
    fn arm(&mut self, wakeup: Wakeup);

    /// Drops the pending wake-up, if any. Idempotent.
    fn cancel(&mut self);
}

/// Timer backed by a Tokio task.
pub struct TokioTimer {
    pending_tx: watch::Sender<Option<Wakeup>>,
}

impl fmt::Debug for TokioTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioTimer")
            .field("pending", &*self.pending_tx.borrow())
            .finish()
    }
}

impl TokioTimer {
    /// Spawns the driver task on `runtime`.
    ///
    /// # Arguments
    ///
    /// * `runtime` - Where the driver task runs
    /// * `clock` - Used to turn absolute instants into sleep durations
    /// * `on_fire` - Invoked from the driver task for each elapsed wake-up
    pub fn spawn(runtime: &Handle, clock: Arc<dyn Clock>, on_fire: OnFire) -> Self {
        let (pending_tx, pending_rx) = watch::channel(None);

        runtime.spawn(driver_loop(pending_rx, clock, on_fire));

        info!("Expiry timer started");

        Self { pending_tx }
    }
}

impl Timer for TokioTimer {
    fn arm(&mut self, wakeup: Wakeup) {
        self.pending_tx.send_replace(Some(wakeup));
    }

    fn cancel(&mut self) {
        self.pending_tx.send_replace(None);
    }
}

impl Drop for TokioTimer {
    fn drop(&mut self) {
        info!("Expiry timer stopped");
    }
}

/// Time left until `at`, zero if it already passed.
fn delay_until(clock: &dyn Clock, at: DateTime<Utc>) -> Duration {
    (at - clock.now()).to_std().unwrap_or(Duration::ZERO)
}

/// The driver loop. Ends when the sending half is dropped.
async fn driver_loop(
    mut pending_rx: watch::Receiver<Option<Wakeup>>,
    clock: Arc<dyn Clock>,
    on_fire: OnFire,
) {
    loop {
        let pending = *pending_rx.borrow_and_update();

        let Some(wakeup) = pending else {
            if pending_rx.changed().await.is_err() {
                break;
            }
            continue;
        };

        let delay = delay_until(clock.as_ref(), wakeup.at);
        trace!(
            ticket = wakeup.ticket,
            delay_ms = delay.as_millis() as u64,
            "Waiting for wake-up"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {
                on_fire(wakeup);
                // A firing pass always re-arms or cancels, so this returns
                // as soon as the next state is published.
                if pending_rx.changed().await.is_err() {
                    break;
                }
            }
            result = pending_rx.changed() => {
                if result.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Expiry timer driver exiting");
}
