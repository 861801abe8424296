/*!
 * Wait Group
 * Counting fan-in barrier built on parking_lot::{Mutex, Condvar}
 */

use super::traits::{FanIn, WaitOutcome};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::error;

/// Counting fan-in barrier
///
/// Producers call [`add`](WaitGroup::add) before starting work and
/// [`done`](WaitGroup::done) when finished; a waiter blocks until the pending
/// count drops to zero. Supports a native timed wait, so bounded waits on a
/// `WaitGroup` never leave a thread behind.
///
/// # Examples
///
/// ```
/// use agentos_sync::core::sync::{FanIn, WaitGroup};
/// use std::sync::Arc;
/// use std::thread;
///
/// let wg = Arc::new(WaitGroup::new(2));
/// for _ in 0..2 {
///     let wg = wg.clone();
///     thread::spawn(move || wg.done());
/// }
/// wg.wait();
/// assert_eq!(wg.pending(), 0);
/// ```
pub struct WaitGroup {
    pending: Mutex<usize>,
    condvar: Condvar,
}

impl WaitGroup {
    /// Create a wait group expecting `parties` completions
    pub fn new(parties: usize) -> Self {
        Self {
            pending: Mutex::new(parties),
            condvar: Condvar::new(),
        }
    }

    /// Register `n` more parties
    pub fn add(&self, n: usize) {
        let mut pending = self.pending.lock();
        *pending = match pending.checked_add(n) {
            Some(total) => total,
            None => panic!("WaitGroup pending count overflow"),
        };
    }

    /// Signal that one party has finished
    ///
    /// # Panics
    ///
    /// Panics if called more times than parties were added.
    pub fn done(&self) {
        let mut pending = self.pending.lock();
        if *pending == 0 {
            drop(pending);
            error!("WaitGroup::done called with no pending parties");
            panic!("WaitGroup::done called with no pending parties");
        }

        *pending -= 1;
        if *pending == 0 {
            self.condvar.notify_all();
        }
    }

    /// Parties still outstanding (racy, for diagnostics)
    pub fn pending(&self) -> usize {
        *self.pending.lock()
    }
}

impl Default for WaitGroup {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for WaitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitGroup")
            .field("pending", &self.pending())
            .finish()
    }
}

impl FanIn for WaitGroup {
    fn wait(&self) {
        let mut pending = self.pending.lock();
        while *pending > 0 {
            self.condvar.wait(&mut pending);
        }
    }

    fn wait_native(&self, timeout: Duration) -> Option<WaitOutcome> {
        // Bounds too large to represent as an Instant mean "no bound"
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait();
            return Some(WaitOutcome::Completed);
        };
        let mut pending = self.pending.lock();

        while *pending > 0 {
            if self.condvar.wait_until(&mut pending, deadline).timed_out() {
                // Completion may have raced the deadline
                return Some(if *pending == 0 {
                    WaitOutcome::Completed
                } else {
                    WaitOutcome::TimedOut
                });
            }
        }
        Some(WaitOutcome::Completed)
    }
}
