/*!
 * Descriptor-Driven Tick Source
 *
 * timerfd + eventfd + epoll, polled by the waiters themselves.
 *
 * # Design
 *
 * There is no producer thread. Whichever waiter reads the timerfd first gets
 * the overrun count `N`, keeps one tick and publishes `N - 1` to the event
 * counter for the others. Waiters that lose that race read zero and fall back
 * to claiming from the counter (the thundering herd is accepted).
 *
 * Cancellation writes a single token to an eventfd that is never read back,
 * so the channel stays readable and every later `epoll_wait` returns at once.
 */

use super::counter::EventCounter;
use super::latch::CancelLatch;
use super::lifecycle::Lifecycle;
use super::period::periodic_expiration;
use super::stats::{TickerStats, TickerStatsSnapshot};
use super::traits::TickSource;
use crate::core::errors::{TimerError, TimerResult};
use crate::core::limits::{
    CANCEL_CHANNEL_TOKEN, DEFAULT_MAX_EVENTS, TICK_CHANNEL_TOKEN, TIMERFD_READ_SIZE,
};
use crate::core::types::{LifecycleState, WaitOutcome};
use nix::errno::Errno;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags, EpollTimeout};
use nix::sys::eventfd::{EfdFlags, EventFd};
use nix::sys::timerfd::{ClockId, TimerFd, TimerFlags, TimerSetTimeFlags};
use nix::unistd;
use parking_lot::Mutex;
use std::os::fd::{AsFd, AsRawFd};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Kernel objects owned by one initialized instance
struct Channels {
    timer: TimerFd,
    cancel: EventFd,
    epoll: Epoll,
}

impl Channels {
    /// Allocate all three descriptors
    ///
    /// Each is an owned fd, so an early return closes whatever was created.
    fn open() -> TimerResult<Self> {
        let timer = TimerFd::new(
            ClockId::CLOCK_MONOTONIC,
            TimerFlags::TFD_NONBLOCK | TimerFlags::TFD_CLOEXEC,
        )
        .map_err(|errno| TimerError::exhausted("timerfd_create", errno))?;

        Self::with_timer(timer)
    }

    /// Build the cancel channel and epoll set around an existing tick channel
    fn with_timer(timer: TimerFd) -> TimerResult<Self> {
        let cancel = EventFd::from_flags(EfdFlags::EFD_NONBLOCK | EfdFlags::EFD_CLOEXEC)
            .map_err(|errno| TimerError::exhausted("eventfd", errno))?;

        let epoll = Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC)
            .map_err(|errno| TimerError::exhausted("epoll_create1", errno))?;

        epoll
            .add(&timer, EpollEvent::new(EpollFlags::EPOLLIN, TICK_CHANNEL_TOKEN))
            .map_err(|errno| TimerError::exhausted("epoll_ctl(timerfd)", errno))?;
        epoll
            .add(&cancel, EpollEvent::new(EpollFlags::EPOLLIN, CANCEL_CHANNEL_TOKEN))
            .map_err(|errno| TimerError::exhausted("epoll_ctl(eventfd)", errno))?;

        Ok(Self {
            timer,
            cancel,
            epoll,
        })
    }

    /// Non-blocking read of the expirations since the last drain
    ///
    /// `EAGAIN` means another waiter drained it first and reports zero.
    fn read_ticks(&self) -> TimerResult<u64> {
        let mut buf = [0u8; TIMERFD_READ_SIZE];
        loop {
            match unistd::read(self.timer.as_fd().as_raw_fd(), &mut buf) {
                Ok(n) if n == TIMERFD_READ_SIZE => return Ok(u64::from_ne_bytes(buf)),
                Ok(n) => {
                    return Err(TimerError::HardIo(format!(
                        "short timerfd read: {} of {} bytes",
                        n, TIMERFD_READ_SIZE
                    )))
                }
                Err(Errno::EINTR) => continue,
                Err(Errno::EAGAIN) => return Ok(0),
                Err(errno) => return Err(TimerError::io("timerfd read", errno)),
            }
        }
    }

    /// Write the single cancellation token
    fn signal_cancel(&self) -> TimerResult<()> {
        loop {
            match self.cancel.write(1) {
                Ok(_) => return Ok(()),
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(TimerError::io("eventfd write", errno)),
            }
        }
    }

    fn wait_ready(&self, events: &mut [EpollEvent]) -> TimerResult<usize> {
        loop {
            match self.epoll.wait(events, EpollTimeout::NONE) {
                Ok(n) => return Ok(n),
                Err(Errno::EINTR) => continue,
                Err(errno) => return Err(TimerError::io("epoll_wait", errno)),
            }
        }
    }
}

/// Tick source polled through timerfd and epoll
///
/// Unlike the signal backend, `start` keeps backlog and cancellation.
pub struct DescriptorTicker {
    channels: Option<Channels>,
    /// Serializes `start`/`stop` so the armed state matches the timerfd
    control: Mutex<()>,
    counter: EventCounter,
    cancel: CancelLatch,
    stats: TickerStats,
    lifecycle: Lifecycle,
}

impl DescriptorTicker {
    pub fn new() -> Self {
        Self {
            channels: None,
            control: Mutex::new(()),
            counter: EventCounter::new(),
            cancel: CancelLatch::new(),
            stats: TickerStats::new(),
            lifecycle: Lifecycle::new(),
        }
    }

    fn channels(&self, operation: &str) -> TimerResult<&Channels> {
        self.channels
            .as_ref()
            .ok_or_else(|| TimerError::invalid_state(operation, self.lifecycle.get()))
    }

    #[inline]
    fn claim(&self) -> bool {
        let consumed = self.counter.try_claim();
        self.stats.record_wake(consumed);
        consumed
    }

    /// Move kernel-side expirations into the counter before a re-arm drops them
    fn drain_into_backlog(&self, channels: &Channels) -> TimerResult<()> {
        let ticks = channels.read_ticks()?;
        if ticks > 0 {
            self.stats.record_produced(ticks);
            self.counter.add(ticks);
        }
        Ok(())
    }

    fn io_failure(&self, error: TimerError) -> TimerError {
        self.stats.record_io_error();
        warn!(backend = self.name(), error = %error, "Tick channel failure");
        error
    }
}

impl Default for DescriptorTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for DescriptorTicker {
    fn init(&mut self) -> TimerResult<()> {
        if self.lifecycle.get().is_initialized() {
            self.reset();
        }

        let channels = Channels::open()?;
        if self.cancel.is_set() {
            // Latched before the channel existed
            channels.signal_cancel()?;
        }

        self.channels = Some(channels);
        self.lifecycle.set(LifecycleState::Initialized);

        info!(backend = self.name(), "Interval timer initialized");
        Ok(())
    }

    fn start(&self, period: Duration) -> TimerResult<()> {
        self.lifecycle.check_start()?;
        let expiration = periodic_expiration(period)?;
        let channels = self.channels("start")?;
        let _control = self.control.lock();

        self.drain_into_backlog(channels)
            .map_err(|e| self.io_failure(e))?;
        channels
            .timer
            .set(expiration, TimerSetTimeFlags::empty())
            .map_err(|errno| TimerError::io("timerfd_settime", errno))?;
        self.lifecycle.set(LifecycleState::Armed);

        info!(
            backend = self.name(),
            period_us = period.as_micros() as u64,
            pending = self.counter.pending(),
            "Interval timer armed"
        );
        Ok(())
    }

    fn stop(&self) -> TimerResult<()> {
        self.lifecycle.check_stop()?;
        let channels = self.channels("stop")?;
        let _control = self.control.lock();

        self.drain_into_backlog(channels)
            .map_err(|e| self.io_failure(e))?;
        channels
            .timer
            .unset()
            .map_err(|errno| TimerError::io("timerfd_settime", errno))?;
        self.lifecycle.mark_stopped();

        debug!(
            backend = self.name(),
            pending = self.counter.pending(),
            "Interval timer stopped"
        );
        Ok(())
    }

    fn reset(&mut self) {
        self.channels = None;
        self.counter.clear();
        self.cancel.clear();
        self.stats.clear();

        if self.lifecycle.get().is_initialized() {
            debug!(backend = self.name(), "Interval timer reset");
        }
        self.lifecycle.set(LifecycleState::Uninitialized);
    }

    fn wait_for_event(&self) -> TimerResult<WaitOutcome> {
        let channels = self.channels("wait_for_event")?;

        // Fast path: backlog or cancellation needs no syscall
        if self.counter.has_backlog() || self.cancel.is_set() {
            return Ok(self.claim().into());
        }

        let mut events = [EpollEvent::empty(); DEFAULT_MAX_EVENTS];
        let ready = channels
            .wait_ready(&mut events)
            .map_err(|e| self.io_failure(e))?;

        let mut consumed = false;
        let mut saw_tick = false;
        for event in &events[..ready] {
            match event.data() {
                TICK_CHANNEL_TOKEN => {
                    saw_tick = true;
                    let ticks = channels.read_ticks().map_err(|e| self.io_failure(e))?;
                    if ticks > 0 {
                        self.stats.record_produced(ticks);
                        self.counter.add(ticks - 1);
                        self.stats.record_wake(true);
                        consumed = true;
                    } else {
                        consumed = self.claim();
                    }
                }
                CANCEL_CHANNEL_TOKEN => {
                    // Left unread so the channel stays readable for every waiter
                }
                other => {
                    warn!(backend = self.name(), token = other, "Unexpected epoll token");
                }
            }
        }

        if !saw_tick {
            self.stats.record_wake(false);
        }
        Ok(consumed.into())
    }

    fn is_cancel_requested(&self) -> bool {
        self.cancel.is_set()
    }

    fn pending_event_count(&self) -> u64 {
        self.counter.pending()
    }

    fn notify_cancel(&self) -> TimerResult<()> {
        if !self.cancel.trigger() {
            return Ok(());
        }

        info!(backend = self.name(), "Interval timer cancellation requested");
        match self.channels.as_ref() {
            Some(channels) => channels.signal_cancel().map_err(|e| self.io_failure(e)),
            // init writes the token once the channel exists
            None => Ok(()),
        }
    }

    fn state(&self) -> LifecycleState {
        self.lifecycle.get()
    }

    fn stats(&self) -> TickerStatsSnapshot {
        self.stats.snapshot()
    }

    fn name(&self) -> &'static str {
        "descriptor"
    }
}

impl Drop for DescriptorTicker {
    fn drop(&mut self) {
        self.reset();
    }
}
