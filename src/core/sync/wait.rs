/*!
 * Bounded Wait
 *
 * Waits on a fan-in barrier for at most a fixed duration.
 *
 * # Design: Native Path First, Observer Thread Second
 *
 * Barriers that implement `FanIn::wait_native` (like `WaitGroup`) are waited
 * on directly with a timed condvar wait. Anything else gets an observer
 * thread that blocks in `FanIn::wait` and reports over a one-shot flume
 * channel while the caller waits on the channel with a deadline.
 *
 * Fan-in barriers cannot be cancelled, so on timeout the observer is
 * abandoned: it keeps running until the barrier completes, and its signal is
 * dropped. A barrier that never completes leaks that thread for the life of
 * the process. The wait itself never affects the barrier's own completion.
 *
 * Two callers bounding the same barrier concurrently each get their own
 * deadline only if the barrier supports multiple waiters (`WaitGroup` does).
 */

use super::config::WaitConfig;
use super::traits::{FanIn, WaitOutcome};
use crate::core::errors::{SyncError, SyncResult};
use flume::RecvTimeoutError;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Bounded waiter over a fan-in barrier
///
/// # Examples
///
/// ```
/// use agentos_sync::core::sync::{BoundedWait, WaitGroup};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let wg = Arc::new(WaitGroup::new(1));
/// let bound = BoundedWait::new(Duration::from_millis(20));
///
/// // Nobody calls done(): the bound elapses
/// assert!(bound.wait(&wg));
///
/// wg.done();
/// assert!(!bound.wait(&wg));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BoundedWait {
    config: WaitConfig,
}

impl BoundedWait {
    /// Bound waits to `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self::with_config(WaitConfig::with_timeout(timeout))
    }

    pub fn with_config(config: WaitConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Wait for the barrier, returning `true` if the bound elapsed first
    ///
    /// A bound too large to represent as a deadline (e.g. `Duration::MAX`)
    /// waits without limit. If a barrier without a native timed wait needs an
    /// observer thread and the thread cannot be spawned, this returns `true`
    /// immediately, without waiting out the bound: completion can no longer
    /// be observed.
    #[inline]
    pub fn wait<B>(&self, barrier: &Arc<B>) -> bool
    where
        B: FanIn + 'static,
    {
        self.wait_outcome(barrier).timed_out()
    }

    /// `Result`-shaped form of [`wait`](BoundedWait::wait)
    pub fn wait_checked<B>(&self, barrier: &Arc<B>) -> SyncResult<()>
    where
        B: FanIn + 'static,
    {
        match self.wait_outcome(barrier) {
            WaitOutcome::Completed => Ok(()),
            WaitOutcome::TimedOut => Err(SyncError::Timeout(self.config.timeout)),
        }
    }

    /// Wait for the barrier and report how the wait ended
    pub fn wait_outcome<B>(&self, barrier: &Arc<B>) -> WaitOutcome
    where
        B: FanIn + 'static,
    {
        let start = Instant::now();
        let outcome = match barrier.wait_native(self.config.timeout) {
            Some(outcome) => outcome,
            None => self.observe(barrier),
        };

        debug!(
            ?outcome,
            elapsed_us = start.elapsed().as_micros() as u64,
            timeout_ms = self.config.timeout.as_millis() as u64,
            "bounded wait finished"
        );
        outcome
    }

    /// Async form for tokio callers
    ///
    /// The blocking wait runs on tokio's blocking pool. For barriers without a
    /// native timed wait, an abandoned blocking task keeps the runtime from
    /// shutting down until the barrier completes.
    pub async fn wait_async<B>(&self, barrier: &Arc<B>) -> bool
    where
        B: FanIn + 'static,
    {
        let timeout = self.config.timeout;
        let observed = Arc::clone(barrier);
        let handle = tokio::task::spawn_blocking(move || {
            observed.wait_native(timeout).unwrap_or_else(|| {
                observed.wait();
                WaitOutcome::Completed
            })
        });

        match tokio::time::timeout(timeout, handle).await {
            Ok(Ok(outcome)) => outcome.timed_out(),
            Ok(Err(e)) => {
                error!(error = %e, "fan-in observer task failed");
                true
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "bounded wait elapsed, abandoning fan-in observer task"
                );
                true
            }
        }
    }

    fn observe<B>(&self, barrier: &Arc<B>) -> WaitOutcome
    where
        B: FanIn + 'static,
    {
        let (done_tx, done_rx) = flume::bounded::<()>(1);
        let observed = Arc::clone(barrier);

        let spawned = thread::Builder::new()
            .name(self.config.observer_name.to_string())
            .spawn(move || {
                observed.wait();
                // Receiver is gone if the waiter already timed out
                let _ = done_tx.send(());
            });

        if let Err(e) = spawned {
            error!(error = %e, "failed to spawn fan-in observer");
            return WaitOutcome::TimedOut;
        }

        let received = match Instant::now().checked_add(self.config.timeout) {
            Some(deadline) => done_rx.recv_deadline(deadline),
            None => done_rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(()) => WaitOutcome::Completed,
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_ms = self.config.timeout.as_millis() as u64,
                    "bounded wait elapsed, abandoning fan-in observer"
                );
                WaitOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                error!("fan-in observer exited without signalling completion");
                WaitOutcome::TimedOut
            }
        }
    }
}

/// Wait on `barrier` for at most `timeout`; `true` means timed out
pub fn wait_timeout<B>(barrier: &Arc<B>, timeout: Duration) -> bool
where
    B: FanIn + 'static,
{
    BoundedWait::new(timeout).wait(barrier)
}
