/*!
 * AgentOS Sync
 * Concurrency primitives shared by kernel subsystems
 */

pub mod core;
pub mod monitoring;

// Re-exports
pub use crate::core::errors::{SyncError, SyncResult};
pub use crate::core::id::OwnerId;
pub use crate::core::sync::{
    wait_timeout, AtomicCounter, AtomicFlag, BoundedWait, FanIn, GuardedRandom, ReentrantGuard,
    ReentrantLock, WaitConfig, WaitGroup, WaitOutcome,
};
pub use monitoring::init_tracing;
