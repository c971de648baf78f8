/*!
 * Monitoring
 * Process-wide structured logging setup
 */

mod tracer;

pub use tracer::{init_tracing, try_init_tracing};
