/*!
 * Monitoring
 * Structured tracing setup for binaries and tests that use the sync primitives
 */

mod tracer;

pub use tracer::init_tracing;
