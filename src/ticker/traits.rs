/*!
 * Tick Source Traits
 *
 * The capability interface both backends implement.
 *
 * # Design: Trait-Based Abstraction for Implementations
 *
 * `IntervalTimer` itself uses enum dispatch; this trait pins the shared
 * contract so the backends stay interchangeable and can be driven generically
 * in tests and benchmarks.
 */

use super::stats::TickerStatsSnapshot;
use crate::core::errors::TimerResult;
use crate::core::types::{LifecycleState, WaitOutcome};
use std::time::Duration;

/// Periodic tick distributor shared by any number of waiter threads
///
/// Methods taking `&mut self` need exclusive access, which is how the
/// "no waiter inside `wait_for_event`" precondition of `init` and `reset` is
/// enforced. Everything else is callable from any thread.
pub trait TickSource: Send + Sync {
    /// Allocate the kernel timer and channels
    ///
    /// On failure everything partially allocated is released and the
    /// instance stays `Uninitialized`.
    fn init(&mut self) -> TimerResult<()>;

    /// Arm (or re-arm) so the first tick fires one `period` from now
    fn start(&self, period: Duration) -> TimerResult<()>;

    /// Disarm; backlog and cancellation are untouched
    fn stop(&self) -> TimerResult<()>;

    /// Release every kernel resource and clear backlog and cancellation
    fn reset(&mut self);

    /// Block until a tick can be claimed or cancellation is observed
    fn wait_for_event(&self) -> TimerResult<WaitOutcome>;

    fn is_cancel_requested(&self) -> bool;

    fn pending_event_count(&self) -> u64;

    /// Latch cancellation and release all current and future waiters
    fn notify_cancel(&self) -> TimerResult<()>;

    fn state(&self) -> LifecycleState;

    fn stats(&self) -> TickerStatsSnapshot;

    /// Get backend name for debugging
    fn name(&self) -> &'static str;
}
