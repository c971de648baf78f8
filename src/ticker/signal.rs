/*!
 * Signal-Driven Tick Source
 *
 * POSIX timer + notifier thread + parking_lot condvar.
 *
 * The notifier thread adds each delivery to the event counter and broadcasts
 * on the condvar. Waiters block until there is backlog or cancellation, then
 * race for one tick through the counter's CAS claim. The condvar mutex guards
 * no data; counter and cancellation live in atomics. If the notifier thread
 * dies, the failure is latched and every waiter gets it as `HardIo` until
 * `reset`.
 */

use super::counter::EventCounter;
use super::latch::CancelLatch;
use super::lifecycle::Lifecycle;
use super::notifier::Notifier;
use super::period::periodic_expiration;
use super::stats::{TickerStats, TickerStatsSnapshot};
use super::traits::TickSource;
use crate::core::errors::{TimerError, TimerResult};
use crate::core::types::{LifecycleState, WaitOutcome};
use nix::errno::Errno;
use nix::sys::signal::{SigEvent, SigevNotify, Signal};
use nix::sys::time::TimeSpec;
use nix::sys::timer::Timer;
use nix::sys::timerfd::{Expiration, TimerSetTimeFlags};
use nix::time::ClockId;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// State shared with the notifier thread
struct Shared {
    counter: EventCounter,
    cancel: CancelLatch,
    stats: TickerStats,
    /// Set once the notifier thread has died; waiters report it as `HardIo`
    faulted: AtomicBool,
    fault: Mutex<Option<TimerError>>,
    mutex: Mutex<()>,
    condvar: Condvar,
}

impl Shared {
    fn new() -> Self {
        Self {
            counter: EventCounter::new(),
            cancel: CancelLatch::new(),
            stats: TickerStats::new(),
            faulted: AtomicBool::new(false),
            fault: Mutex::new(None),
            mutex: Mutex::new(()),
            condvar: Condvar::new(),
        }
    }

    #[inline]
    fn should_wake(&self) -> bool {
        self.counter.has_backlog()
            || self.cancel.is_set()
            || self.faulted.load(Ordering::Acquire)
    }

    /// Called on the notifier thread for every signal delivery
    fn deliver(&self, ticks: u64) {
        self.stats.record_produced(ticks);
        self.counter.add(ticks);
        self.wake_all();
    }

    /// Called on the notifier thread when it can no longer deliver ticks
    fn fail(&self, errno: Errno) {
        *self.fault.lock() = Some(TimerError::io("notifier signalfd read", errno));
        self.stats.record_io_error();
        self.faulted.store(true, Ordering::Release);
        self.wake_all();
    }

    fn fault(&self) -> Option<TimerError> {
        if !self.faulted.load(Ordering::Acquire) {
            return None;
        }
        self.fault.lock().clone()
    }

    fn wake_all(&self) {
        // Taking the lock orders this wake after any waiter's predicate check
        drop(self.mutex.lock());
        self.condvar.notify_all();
    }

    fn clear(&self) {
        self.counter.clear();
        self.cancel.clear();
    }

    fn clear_fault(&self) {
        self.faulted.store(false, Ordering::Release);
        *self.fault.lock() = None;
    }
}

/// Kernel POSIX timer handle
struct PosixTimer(Timer);

// SAFETY: timer_t is a process-wide kernel timer id; timer_settime and
// timer_delete may be issued from any thread. Access is serialized by the
// mutex that owns this value.
unsafe impl Send for PosixTimer {}

impl PosixTimer {
    fn create(notifier: &Notifier) -> TimerResult<Self> {
        let sigevent = SigEvent::new(SigevNotify::SigevThreadId {
            signal: notifier.signal(),
            thread_id: notifier.thread_id().as_raw(),
            si_value: 0,
        });
        Timer::new(ClockId::CLOCK_MONOTONIC, sigevent)
            .map(PosixTimer)
            .map_err(|errno| TimerError::exhausted("timer_create", errno))
    }

    fn arm(&mut self, expiration: Expiration) -> TimerResult<()> {
        self.0
            .set(expiration, TimerSetTimeFlags::empty())
            .map_err(|errno| TimerError::io("timer_settime", errno))
    }

    fn disarm(&mut self) -> TimerResult<()> {
        // A zero one-shot disarms
        self.arm(Expiration::OneShot(TimeSpec::new(0, 0)))
    }
}

/// Tick source fed by a POSIX timer signal
///
/// `start` clears backlog and cancellation before arming, so a
/// `stop`→`start` cycle begins from a clean slate.
pub struct SignalTicker {
    shared: Arc<Shared>,
    lifecycle: Lifecycle,
    timer: Mutex<Option<PosixTimer>>,
    notifier: Option<Notifier>,
    signal: Signal,
}

impl SignalTicker {
    pub fn new(signal: Signal) -> Self {
        Self {
            shared: Arc::new(Shared::new()),
            lifecycle: Lifecycle::new(),
            timer: Mutex::new(None),
            notifier: None,
            signal,
        }
    }

    /// Signal the timer delivers to the notifier thread
    pub fn signal(&self) -> Signal {
        self.signal
    }
}

impl Default for SignalTicker {
    fn default() -> Self {
        Self::new(Signal::SIGALRM)
    }
}

impl TickSource for SignalTicker {
    fn init(&mut self) -> TimerResult<()> {
        if self.lifecycle.get().is_initialized() {
            self.reset();
        }

        let tick_shared = self.shared.clone();
        let fault_shared = self.shared.clone();
        let notifier = Notifier::spawn(
            self.signal,
            move |ticks| tick_shared.deliver(ticks),
            move |errno| fault_shared.fail(errno),
        )?;
        // On failure the notifier drops here and its thread is joined
        let timer = PosixTimer::create(&notifier)?;

        *self.timer.get_mut() = Some(timer);
        self.notifier = Some(notifier);
        self.lifecycle.set(LifecycleState::Initialized);

        info!(backend = self.name(), signal = ?self.signal, "Interval timer initialized");
        Ok(())
    }

    fn start(&self, period: Duration) -> TimerResult<()> {
        self.lifecycle.check_start()?;
        let expiration = periodic_expiration(period)?;

        let mut guard = self.timer.lock();
        let timer = guard
            .as_mut()
            .ok_or_else(|| TimerError::invalid_state("start", self.lifecycle.get()))?;

        timer.disarm()?;
        self.shared.clear();
        timer.arm(expiration)?;
        self.lifecycle.set(LifecycleState::Armed);

        info!(backend = self.name(), period_us = period.as_micros() as u64, "Interval timer armed");
        Ok(())
    }

    fn stop(&self) -> TimerResult<()> {
        self.lifecycle.check_stop()?;

        let mut guard = self.timer.lock();
        let timer = guard
            .as_mut()
            .ok_or_else(|| TimerError::invalid_state("stop", self.lifecycle.get()))?;

        timer.disarm()?;
        self.lifecycle.mark_stopped();

        debug!(
            backend = self.name(),
            pending = self.shared.counter.pending(),
            "Interval timer stopped"
        );
        Ok(())
    }

    fn reset(&mut self) {
        // Timer first, so nothing targets the notifier thread once it is gone
        *self.timer.get_mut() = None;
        self.notifier = None;

        self.shared.clear();
        self.shared.clear_fault();
        self.shared.stats.clear();

        if self.lifecycle.get().is_initialized() {
            debug!(backend = self.name(), "Interval timer reset");
        }
        self.lifecycle.set(LifecycleState::Uninitialized);
    }

    fn wait_for_event(&self) -> TimerResult<WaitOutcome> {
        // No notifier exists to ever wake this waiter
        let state = self.lifecycle.get();
        if !state.is_initialized() {
            return Err(TimerError::invalid_state("wait_for_event", state));
        }

        {
            let mut guard = self.shared.mutex.lock();
            while !self.shared.should_wake() {
                self.shared.condvar.wait(&mut guard);
            }
        }

        if let Some(error) = self.shared.fault() {
            return Err(error);
        }

        // Backlog may already be gone on a cancellation wake or a lost race
        let consumed = self.shared.counter.try_claim();
        self.shared.stats.record_wake(consumed);
        Ok(consumed.into())
    }

    fn is_cancel_requested(&self) -> bool {
        self.shared.cancel.is_set()
    }

    fn pending_event_count(&self) -> u64 {
        self.shared.counter.pending()
    }

    fn notify_cancel(&self) -> TimerResult<()> {
        if self.shared.cancel.trigger() {
            self.shared.wake_all();
            info!(backend = self.name(), "Interval timer cancellation requested");
        }
        Ok(())
    }

    fn state(&self) -> LifecycleState {
        self.lifecycle.get()
    }

    fn stats(&self) -> TickerStatsSnapshot {
        self.shared.stats.snapshot()
    }

    fn name(&self) -> &'static str {
        "signal"
    }
}

impl Drop for SignalTicker {
    fn drop(&mut self) {
        self.reset();
    }
}
