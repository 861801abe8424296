/*!
 * Synchronization Traits
 *
 * Abstraction over fan-in barriers: N parties signal "done", one party waits.
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Terminal outcome of a bounded wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    /// Every party finished within the bound
    Completed,
    /// The bound elapsed first
    TimedOut,
}

impl WaitOutcome {
    #[inline(always)]
    pub fn timed_out(&self) -> bool {
        matches!(self, WaitOutcome::TimedOut)
    }
}

/// A fan-in barrier
///
/// Implementations must be:
/// - **Thread-safe**: `wait` may be called from any thread
/// - **Completion-only**: there is no way to cancel a `wait` in progress
pub trait FanIn: Send + Sync {
    /// Block until every party has signalled completion
    fn wait(&self);

    /// Timed wait, for barriers that support one natively
    ///
    /// Returns `None` when unsupported. `BoundedWait` then falls back to an
    /// observer thread that is abandoned on timeout and lives until the
    /// barrier completes.
    fn wait_native(&self, _timeout: Duration) -> Option<WaitOutcome> {
        None
    }
}
