/*!
 * Interval Timer
 *
 * Backend-agnostic tick distributor. The backend is chosen once, from
 * `TickerConfig`, when the timer is constructed.
 *
 * # Design: Enum Dispatch Over Trait Objects
 *
 * Both backends implement `TickSource`, but `IntervalTimer` holds them in an
 * enum rather than `Box<dyn TickSource>`, keeping `wait_for_event` free of
 * vtable calls and letting the hot path inline.
 */

use super::config::TickerConfig;
use super::descriptor::DescriptorTicker;
use super::signal::SignalTicker;
use super::stats::TickerStatsSnapshot;
use super::traits::TickSource;
use crate::core::errors::TimerResult;
use crate::core::types::{Backend, LifecycleState, WaitOutcome};
use std::time::Duration;

enum TickSourceImpl {
    Signal(SignalTicker),
    Descriptor(DescriptorTicker),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            TickSourceImpl::Signal($s) => $body,
            TickSourceImpl::Descriptor($s) => $body,
        }
    };
}

/// Periodic tick distributor
///
/// # Examples
///
/// ```no_run
/// use interval_ticker::{IntervalTimer, TickSource, TickerConfig};
/// use std::time::Duration;
///
/// let mut timer = IntervalTimer::new(TickerConfig::default());
/// timer.init()?;
/// timer.start(Duration::from_millis(100))?;
///
/// while !timer.is_cancel_requested() {
///     if timer.wait_for_event()?.is_consumed() {
///         // one tick of work
///     }
/// }
/// # Ok::<(), interval_ticker::TimerError>(())
/// ```
pub struct IntervalTimer {
    source: TickSourceImpl,
}

impl IntervalTimer {
    /// Create an uninitialized timer with the configured backend
    pub fn new(config: TickerConfig) -> Self {
        let source = match config.select_backend() {
            Backend::Signal => TickSourceImpl::Signal(SignalTicker::new(config.notify_signal)),
            Backend::Descriptor | Backend::Auto => {
                TickSourceImpl::Descriptor(DescriptorTicker::new())
            }
        };

        Self { source }
    }

    /// Create with default configuration (auto-selects the backend)
    pub fn with_defaults() -> Self {
        Self::new(TickerConfig::default())
    }

    /// Create and initialize in one step
    pub fn initialized(config: TickerConfig) -> TimerResult<Self> {
        let mut timer = Self::new(config);
        timer.init()?;
        Ok(timer)
    }

    /// Backend actually in use
    pub fn backend(&self) -> Backend {
        match self.source {
            TickSourceImpl::Signal(_) => Backend::Signal,
            TickSourceImpl::Descriptor(_) => Backend::Descriptor,
        }
    }
}

impl Default for IntervalTimer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TickSource for IntervalTimer {
    fn init(&mut self) -> TimerResult<()> {
        dispatch!(&mut self.source, s => s.init())
    }

    fn start(&self, period: Duration) -> TimerResult<()> {
        dispatch!(&self.source, s => s.start(period))
    }

    fn stop(&self) -> TimerResult<()> {
        dispatch!(&self.source, s => s.stop())
    }

    fn reset(&mut self) {
        dispatch!(&mut self.source, s => s.reset())
    }

    #[inline]
    fn wait_for_event(&self) -> TimerResult<WaitOutcome> {
        dispatch!(&self.source, s => s.wait_for_event())
    }

    #[inline]
    fn is_cancel_requested(&self) -> bool {
        dispatch!(&self.source, s => s.is_cancel_requested())
    }

    #[inline]
    fn pending_event_count(&self) -> u64 {
        dispatch!(&self.source, s => s.pending_event_count())
    }

    fn notify_cancel(&self) -> TimerResult<()> {
        dispatch!(&self.source, s => s.notify_cancel())
    }

    fn state(&self) -> LifecycleState {
        dispatch!(&self.source, s => s.state())
    }

    fn stats(&self) -> TickerStatsSnapshot {
        dispatch!(&self.source, s => s.stats())
    }

    fn name(&self) -> &'static str {
        dispatch!(&self.source, s => s.name())
    }
}
