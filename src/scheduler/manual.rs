//! Manually driven timer.
//!
//! [`ManualTimer`] never fires on its own. It records what the scheduler
//! armed, and the paired [`ManualTimerHandle`] delivers the pending wake-up
//! through the bound callback when a test decides time has come. Combined
//! with [`ManualClock`](crate::scheduler::ManualClock) this makes the whole
//! expiry path deterministic.

use crate::scheduler::{OnFire, Timer, Wakeup};
use std::fmt;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct ManualState {
    pending: Option<Wakeup>,
    armed: u64,
    cancelled: u64,
}

/// The timer half, owned by the scheduler.
#[derive(Debug)]
pub struct ManualTimer {
    state: Arc<Mutex<ManualState>>,
}

/// The test half: inspects and fires the pending wake-up.
#[derive(Clone)]
pub struct ManualTimerHandle {
    state: Arc<Mutex<ManualState>>,
    on_fire: OnFire,
}

impl fmt::Debug for ManualTimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualTimerHandle")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl ManualTimer {
    pub fn new(on_fire: OnFire) -> (Self, ManualTimerHandle) {
        let state = Arc::new(Mutex::new(ManualState::default()));
        let handle = ManualTimerHandle {
            state: Arc::clone(&state),
            on_fire,
        };
        (Self { state }, handle)
    }
}

impl Timer for ManualTimer {
    fn arm(&mut self, wakeup: Wakeup) {
        let mut state = self.state.lock().unwrap();
        state.pending = Some(wakeup);
        state.armed += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.state.lock().unwrap();
        if state.pending.take().is_some() {
            state.cancelled += 1;
        }
    }
}

impl ManualTimerHandle {
    /// The wake-up currently armed, if any.
    pub fn pending(&self) -> Option<Wakeup> {
        self.state.lock().unwrap().pending
    }

    /// Number of times a wake-up was armed.
    pub fn armed_count(&self) -> u64 {
        self.state.lock().unwrap().armed
    }

    /// Number of cancels that actually dropped a pending wake-up.
    pub fn cancel_count(&self) -> u64 {
        self.state.lock().unwrap().cancelled
    }

    /// Consumes the pending wake-up and delivers it. Returns what was fired.
    pub fn fire(&self) -> Option<Wakeup> {
        // The callback re-arms through `Timer::arm`, so the lock must be
        // released before it runs.
        let wakeup = self.state.lock().unwrap().pending.take()?;
        (self.on_fire)(wakeup);
        Some(wakeup)
    }

    /// Delivers an arbitrary wake-up, as a timer racing a cancel would.
    pub fn deliver(&self, wakeup: Wakeup) {
        (self.on_fire)(wakeup);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_arm_cancel_fire() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&fired);
        let (mut timer, handle) = ManualTimer::new(Arc::new(move |w: Wakeup| sink.lock().unwrap().push(w)));

        assert!(handle.fire().is_none());

        let wakeup = Wakeup { at: Utc::now(), ticket: 1 };
        timer.arm(wakeup);
        assert_eq!(handle.pending(), Some(wakeup));

        timer.cancel();
        timer.cancel();
        assert_eq!(handle.cancel_count(), 1);
        assert!(handle.fire().is_none());

        timer.arm(wakeup);
        assert_eq!(handle.fire(), Some(wakeup));
        assert!(handle.pending().is_none());
        assert_eq!(handle.armed_count(), 2);
        assert_eq!(fired.lock().unwrap().len(), 1);
    }
}
