//! Cooperative cancellation for background loops.
//!
//! A [`CancellationToken`] is shared between a controller and the thread it
//! supervises. The controller calls [`cancel`](CancellationToken::cancel);
//! the background thread sleeps between units of work with
//! [`wait_timeout`](CancellationToken::wait_timeout), which returns as soon
//! as cancellation is requested instead of blocking for the full duration.
//!
//! # Example
//!
//! ```
//! use netchange_core::cancellation::{CancellationToken, WaitOutcome};
//! use std::time::Duration;
//!
//! let token = CancellationToken::new();
//! let worker_token = token.clone();
//!
//! let handle = std::thread::spawn(move || {
//!     let mut ticks = 0;
//!     while worker_token.wait_timeout(Duration::from_millis(10)) != WaitOutcome::Cancelled {
//!         ticks += 1;
//!     }
//!     ticks
//! });
//!
//! std::thread::sleep(Duration::from_millis(50));
//! token.cancel();
//! let _ticks = handle.join().unwrap();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Why a call to [`CancellationToken::wait_timeout`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    /// Cancellation was requested, before or during the wait.
    Cancelled,
    /// [`CancellationToken::wake`] interrupted the wait.
    Woken,
    /// The full timeout elapsed.
    TimedOut,
}

/// A cancellation token for cooperative shutdown of a background thread.
///
/// Clones share the same state. Cancellation is one-way and idempotent: once
/// cancelled, a token stays cancelled.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    inner: Arc<CancellationState>,
}

#[derive(Debug)]
struct CancellationState {
    cancelled: AtomicBool,
    wait: Mutex<WaitState>,
    condvar: Condvar,
}

#[derive(Debug, Default)]
struct WaitState {
    cancelled: bool,
    wake_pending: bool,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancellationState {
                cancelled: AtomicBool::new(false),
                wait: Mutex::new(WaitState::default()),
                condvar: Condvar::new(),
            }),
        }
    }

    /// Check if cancellation has been requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Request cancellation and wake every thread blocked in
    /// [`wait_timeout`](Self::wait_timeout).
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::AcqRel) {
            // Flag and notify under the lock so a waiter cannot miss the wakeup.
            let mut state = self.inner.wait.lock();
            state.cancelled = true;
            self.inner.condvar.notify_all();
        }
    }

    /// Interrupt the current (or next) wait without cancelling.
    ///
    /// Used to make a periodic loop run its next iteration early, for example
    /// when the OS reports that something worth re-checking happened.
    pub fn wake(&self) {
        let mut state = self.inner.wait.lock();
        state.wake_pending = true;
        self.inner.condvar.notify_all();
    }

    /// Block for up to `timeout`, returning early on cancellation or wake.
    ///
    /// Cancellation takes precedence over a pending wake. A pending wake is
    /// consumed by the call that observes it.
    pub fn wait_timeout(&self, timeout: Duration) -> WaitOutcome {
        let deadline = Instant::now().checked_add(timeout);
        let mut state = self.inner.wait.lock();

        loop {
            if state.cancelled {
                return WaitOutcome::Cancelled;
            }
            if std::mem::take(&mut state.wake_pending) {
                return WaitOutcome::Woken;
            }

            match deadline {
                Some(deadline) => {
                    if self
                        .inner
                        .condvar
                        .wait_until(&mut state, deadline)
                        .timed_out()
                    {
                        return if state.cancelled {
                            WaitOutcome::Cancelled
                        } else if std::mem::take(&mut state.wake_pending) {
                            WaitOutcome::Woken
                        } else {
                            WaitOutcome::TimedOut
                        };
                    }
                }
                // Timeout too large to represent as an Instant: wait until notified.
                None => self.inner.condvar.wait(&mut state),
            }
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
