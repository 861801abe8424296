/*!
 * Synchronization Primitives
 *
 * Small, independent building blocks for higher-level kernel code:
 * - `ReentrantLock`: recursive mutex keyed on the caller's `OwnerId`
 * - `AtomicFlag`: lock-free bit with an exactly-once claim
 * - `AtomicCounter`: lock-free i32 counter
 * - `BoundedWait`: deadline over a fan-in barrier (`WaitGroup` or any `FanIn`)
 * - `GuardedRandom`: seeded generator safe to share across threads
 *
 * None of these depend on each other.
 */

mod config;
mod counter;
mod flag;
mod random;
mod reentrant;
mod traits;
mod wait;
mod wait_group;

pub use config::WaitConfig;
pub use counter::AtomicCounter;
pub use flag::AtomicFlag;
pub use random::GuardedRandom;
pub use reentrant::{ReentrantGuard, ReentrantLock};
pub use traits::{FanIn, WaitOutcome};
pub use wait::{wait_timeout, BoundedWait};
pub use wait_group::WaitGroup;
