//! Per-invocation deadline enforcement.
//!
//! ```text
//!          arm(deadline)           task finished
//!   Idle ────────────────▶ Armed ─────────────────▶ Completed
//!                            │
//!                            │ deadline passed
//!                            ▼
//!                         Expired  (task aborted, never awaited again)
//! ```
//!
//! The application call runs on its own tokio task. [`Watchdog::supervise`]
//! races that task's `JoinHandle` against `sleep_until(deadline)`; on
//! expiry the task is aborted and the loop moves on without waiting for
//! it to unwind.
//!
//! Cancellation is cooperative. A task blocked inside synchronous code is
//! only dropped at its next `.await`; the expiry is still reported on time.

use std::any::Any;

use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    Idle,
    Armed,
    Completed,
    Expired,
}

/// How a supervised task ended.
#[derive(Debug)]
pub enum Supervised<T> {
    Finished(T),
    Panicked(String),
    Expired,
}

/// A single-use deadline guard for one invocation.
#[derive(Debug)]
pub struct Watchdog {
    state: WatchdogState,
    deadline: Option<Instant>,
}

impl Watchdog {
    pub fn new() -> Self {
        Self {
            state: WatchdogState::Idle,
            deadline: None,
        }
    }

    pub fn state(&self) -> WatchdogState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Record the deadline and start the clock.
    ///
    /// Once a deadline is recorded it is never moved: arming again returns
    /// the original deadline.
    pub fn arm(&mut self, deadline: Instant) -> Instant {
        if let Some(existing) = self.deadline {
            return existing;
        }
        self.deadline = Some(deadline);
        self.state = WatchdogState::Armed;
        deadline
    }

    /// The work finished in time. No-op unless armed.
    pub fn disarm(&mut self) {
        if self.state == WatchdogState::Armed {
            self.state = WatchdogState::Completed;
        }
    }

    fn expire(&mut self) {
        if self.state == WatchdogState::Armed {
            self.state = WatchdogState::Expired;
        }
    }

    /// Wait for `task` or the deadline, whichever comes first.
    pub async fn supervise<T>(&mut self, deadline: Instant, mut task: JoinHandle<T>) -> Supervised<T> {
        let deadline = self.arm(deadline);
        tokio::select! {
            biased;
            joined = &mut task => {
                self.disarm();
                match joined {
                    Ok(value) => Supervised::Finished(value),
                    Err(e) => Supervised::Panicked(join_error_message(e)),
                }
            }
            _ = tokio::time::sleep_until(deadline) => {
                task.abort();
                self.expire();
                debug!("execution deadline passed, application task aborted");
                Supervised::Expired
            }
        }
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new()
    }
}

fn join_error_message(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
