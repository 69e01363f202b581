//! Scheduler State Machine
//!
//! ```text
//!          insert when earliest
//!   Idle ───────────────────────> Armed ──┐ structural change:
//!    ▲                              │ ▲   │ cancel + re-arm
//!    │ index empty                  │ └───┘
//!    └──────────────────────────────┤
//!                                   │ wake-up elapses
//!                                   ▼
//!                                Firing ── reschedule ──> Armed | Idle
//! ```
//!
//! Firing happens inside the inventory's critical section, so it is never
//! observable as a resting state here. What the scheduler does own is the
//! ticket counter: each arming gets a fresh ticket, and a delivered wake-up
//! is only honoured if its ticket is the one currently armed.

use crate::scheduler::{Timer, Wakeup};
use chrono::{DateTime, Utc};
use std::fmt;
use tracing::debug;

/// Resting state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Nothing to expire, no wake-up pending
    Idle,
    /// A wake-up is pending for the earliest expiration
    Armed(Wakeup),
}

/// Keeps zero or one wake-up outstanding, for the soonest expiration.
pub struct Scheduler {
    timer: Box<dyn Timer>,
    state: SchedulerState,
    next_ticket: u64,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("state", &self.state)
            .field("next_ticket", &self.next_ticket)
            .finish()
    }
}

impl Scheduler {
    pub fn new(timer: Box<dyn Timer>) -> Self {
        Self {
            timer,
            state: SchedulerState::Idle,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Instant the pending wake-up is armed for.
    pub fn armed_at(&self) -> Option<DateTime<Utc>> {
        match self.state {
            SchedulerState::Armed(wakeup) => Some(wakeup.at),
            SchedulerState::Idle => None,
        }
    }

    /// Cancels whatever is pending, then arms for `earliest` or goes idle.
    ///
    /// Must be called after every structural change that can move the
    /// earliest entry of the index.
    pub fn reschedule(&mut self, earliest: Option<DateTime<Utc>>) {
        if let SchedulerState::Armed(previous) = self.state {
            self.timer.cancel();
            debug!(ticket = previous.ticket, "Cancelled pending wake-up");
        }

        match earliest {
            Some(at) => {
                self.next_ticket += 1;
                let wakeup = Wakeup {
                    at,
                    ticket: self.next_ticket,
                };
                self.timer.arm(wakeup);
                self.state = SchedulerState::Armed(wakeup);
                debug!(ticket = wakeup.ticket, at = %at, "Armed wake-up");
            }
            None => {
                self.state = SchedulerState::Idle;
                debug!("Scheduler idle");
            }
        }
    }

    /// Returns true if `wakeup` is the one currently armed.
    ///
    /// Anything else is a stale delivery from before a cancel and must be
    /// ignored.
    pub fn claim(&self, wakeup: Wakeup) -> bool {
        matches!(self.state, SchedulerState::Armed(current) if current.ticket == wakeup.ticket)
    }
}
