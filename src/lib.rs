/*!
 * Interval Ticker Library
 * Periodic kernel timer fan-out for any number of blocking waiter threads
 */

pub mod core;
pub mod monitoring;
pub mod ticker;

// Re-exports
pub use crate::core::{Backend, LifecycleState, TimerError, TimerResult, WaitOutcome};
pub use monitoring::{init_tracing, try_init_tracing};
pub use ticker::{
    CancelDeadline, DescriptorTicker, IntervalTimer, SignalTicker, TickSource, TickerConfig,
    TickerStatsSnapshot,
};
