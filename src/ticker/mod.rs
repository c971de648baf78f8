/*!
 * Interval Tick Distributor
 *
 * Arms one periodic kernel timer and lets any number of threads block until
 * the next tick, with stop/resume and a latching cancellation that releases
 * every waiter, present and future.
 *
 * # Architecture
 *
 * Two backends implement the same `TickSource` contract:
 * - **Signal**: POSIX timer → notifier thread → condvar broadcast
 * - **Descriptor**: timerfd + eventfd polled by the waiters through epoll
 *
 * Both share the lock-free `EventCounter` (backlog, CAS claim) and
 * `CancelLatch` (one-way flag). `IntervalTimer` picks a backend at
 * construction time and dispatches without dynamic calls.
 *
 * # Guarantees
 *
 * - Ticks are fungible: only the count survives, never identity or order
 * - Every tick produced is claimed at most once
 * - The backlog is never observed negative
 */

mod config;
mod counter;
mod deadline;
mod descriptor;
mod latch;
mod lifecycle;
mod notifier;
mod period;
mod signal;
mod stats;
mod timer;
mod traits;

// Re-export public API
pub use config::TickerConfig;
pub use deadline::CancelDeadline;
pub use stats::TickerStatsSnapshot;
pub use timer::IntervalTimer;
pub use traits::TickSource;

// Re-export specific backends for advanced users
pub use counter::EventCounter;
pub use descriptor::DescriptorTicker;
pub use latch::CancelLatch;
pub use signal::SignalTicker;
