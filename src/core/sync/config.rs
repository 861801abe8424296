/*!
 * Bounded Wait Configuration
 *
 * Constructor arguments for `BoundedWait`. Nothing here is read from the
 * environment; callers pick a preset or fill the struct.
 */

use std::time::Duration;

/// Bounded wait configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for the barrier
    pub timeout: Duration,
    /// Name given to observer threads spawned for barriers without a native timed wait
    pub observer_name: &'static str,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(1),
            observer_name: "fan-in-observer",
        }
    }
}

impl WaitConfig {
    /// Wait with the given timeout and default observer name
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            observer_name: "fan-in-observer",
        }
    }

    /// Configuration for short waits (tests, fast shutdown paths)
    pub const fn short() -> Self {
        Self::with_timeout(Duration::from_millis(100))
    }

    /// Configuration for long waits (draining worker pools)
    pub const fn long() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }
}
