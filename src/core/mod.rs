/*!
 * Core Module
 * Owner identity, error handling, and the sync primitives
 */

pub mod errors;
pub mod id;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use id::OwnerId;
