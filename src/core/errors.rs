/*!
 * Error Types
 * Recoverable errors for the sync primitives, with thiserror, miette, and serde support
 *
 * Ownership violations on `ReentrantLock` and over-release of a `WaitGroup` are
 * not represented here. They panic at the call site.
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Result type for fallible sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// Recoverable sync errors with serialization support
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum SyncError {
    #[error("Invalid bound {bound}: bounded draws require a positive bound")]
    #[diagnostic(
        code(sync::invalid_bound),
        help("Pass a bound greater than zero to int63n/intn.")
    )]
    InvalidBound { bound: i64 },

    #[error("Bounded wait timed out after {0:?}")]
    #[diagnostic(
        code(sync::timeout),
        help("Not every party signalled completion in time. The barrier itself is unaffected.")
    )]
    Timeout(Duration),
}

impl SyncError {
    /// Check if this error is a timeout
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, SyncError::Timeout(_))
    }
}
