/*!
 * Limits and Constants
 *
 * Centralized location for tick source limits, tokens, and magic numbers.
 * Performance-critical constants are marked with [PERF],
 * Linux-compatible values with [LINUX-COMPAT].
 */

use std::time::Duration;

// =============================================================================
// DESCRIPTOR BACKEND
// =============================================================================

/// epoll token for the timerfd tick channel
pub const TICK_CHANNEL_TOKEN: u64 = 1;

/// epoll token for the eventfd cancellation channel
pub const CANCEL_CHANNEL_TOKEN: u64 = 2;

/// Default epoll batch size (one slot per registered channel)
pub const DEFAULT_MAX_EVENTS: usize = 2;

/// Size of one timerfd expiration counter read
/// [LINUX-COMPAT] timerfd(2) always reports a native-endian u64
pub const TIMERFD_READ_SIZE: usize = std::mem::size_of::<u64>();

// =============================================================================
// SIGNAL BACKEND
// =============================================================================

/// Name given to the per-instance notifier thread
pub const NOTIFIER_THREAD_NAME: &str = "ticker-notify";

/// Name given to `CancelDeadline` threads
pub const DEADLINE_THREAD_NAME: &str = "ticker-deadline";

/// si_code of a POSIX timer expiration
/// [LINUX-COMPAT] matches SI_TIMER in <asm-generic/siginfo.h>
pub const SI_TIMER: i32 = -2;

/// How long init waits for the notifier thread to report readiness
pub const NOTIFIER_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

// =============================================================================
// PERIODS
// =============================================================================

/// Smallest accepted period
/// A zero itimerspec disarms the timer instead of arming it
pub const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// Largest accepted period
/// [LINUX-COMPAT] keeps tv_sec inside a signed 32-bit time_t
pub const MAX_PERIOD: Duration = Duration::from_secs(i32::MAX as u64);

