/*!
 * Signal Notifier Thread
 *
 * Dedicated notification context for the signal-driven backend. The POSIX
 * timer is created with `SIGEV_THREAD_ID`, so every expiration is a
 * thread-directed signal aimed at this thread. The thread keeps that signal
 * blocked and drains it through a signalfd, handing `1 + overrun` ticks to
 * the closure it was spawned with.
 *
 * # Design: Closure Over Opaque Context
 *
 * The kernel never sees a pointer back into the ticker. The thread owns a
 * closure capturing the shared state, so there is nothing to reconstitute
 * from a `sigval`.
 */

use crate::core::errors::{TimerError, TimerResult};
use crate::core::limits::{NOTIFIER_STARTUP_TIMEOUT, NOTIFIER_THREAD_NAME, SI_TIMER};
use nix::errno::Errno;
use nix::sys::pthread::pthread_kill;
use nix::sys::signal::{SigSet, Signal};
use nix::sys::signalfd::{SfdFlags, SignalFd};
use nix::unistd::{gettid, Pid};
use std::os::unix::thread::JoinHandleExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Handle to a running notifier thread
///
/// Dropping it stops and joins the thread.
pub struct Notifier {
    handle: Option<JoinHandle<()>>,
    thread_id: Pid,
    signal: Signal,
    shutdown: Arc<AtomicBool>,
}

impl Notifier {
    /// Spawn the thread and wait until it has blocked `signal`
    ///
    /// `on_tick` runs on the notifier thread with the number of expirations
    /// carried by one signal delivery. `on_fault` runs once if the signalfd
    /// fails and the thread stops delivering ticks.
    pub fn spawn<F, E>(signal: Signal, on_tick: F, on_fault: E) -> TimerResult<Self>
    where
        F: Fn(u64) + Send + 'static,
        E: FnOnce(Errno) + Send + 'static,
    {
        Self::spawn_within(signal, NOTIFIER_STARTUP_TIMEOUT, on_tick, on_fault)
    }

    fn spawn_within<F, E>(
        signal: Signal,
        startup_timeout: Duration,
        on_tick: F,
        on_fault: E,
    ) -> TimerResult<Self>
    where
        F: Fn(u64) + Send + 'static,
        E: FnOnce(Errno) + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = flume::bounded(1);

        let thread_shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name(NOTIFIER_THREAD_NAME.to_string())
            .spawn(move || run(signal, thread_shutdown, ready_tx, on_tick, on_fault))
            .map_err(|e| {
                TimerError::ResourceExhaustion(format!("notifier thread spawn: {}", e))
            })?;

        match ready_rx.recv_timeout(startup_timeout) {
            Ok(Ok(thread_id)) => {
                debug!(tid = thread_id.as_raw(), signal = ?signal, "Notifier thread ready");
                Ok(Self {
                    handle: Some(handle),
                    thread_id,
                    signal,
                    shutdown,
                })
            }
            Ok(Err(errno)) => {
                let _ = handle.join();
                Err(TimerError::exhausted("notifier signalfd", errno))
            }
            Err(_) => {
                shutdown.store(true, Ordering::Release);
                // A late report means the signal is blocked there and the
                // thread may already sit in the signalfd read
                if let Ok(Ok(_)) = ready_rx.try_recv() {
                    if let Err(errno) = pthread_kill(handle.as_pthread_t(), signal) {
                        warn!(error = %errno, "Failed to wake late notifier thread");
                    }
                }
                // Otherwise the thread sees the closed channel or the flag
                // and exits on its own; it is left detached
                Err(TimerError::ResourceExhaustion(
                    "notifier thread did not start in time".to_string(),
                ))
            }
        }
    }

    /// Kernel thread id the timer must target
    #[inline]
    pub fn thread_id(&self) -> Pid {
        self.thread_id
    }

    #[inline]
    pub fn signal(&self) -> Signal {
        self.signal
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        self.shutdown.store(true, Ordering::Release);
        // Signal is blocked on that thread, so it stays pending until the signalfd read
        if let Err(errno) = pthread_kill(handle.as_pthread_t(), self.signal) {
            warn!(error = %errno, "Failed to wake notifier thread");
        }
        if handle.join().is_err() {
            error!("Notifier thread panicked");
        }
    }
}

impl Drop for Notifier {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run<F, E>(
    signal: Signal,
    shutdown: Arc<AtomicBool>,
    ready: flume::Sender<Result<Pid, Errno>>,
    on_tick: F,
    on_fault: E,
) where
    F: Fn(u64),
    E: FnOnce(Errno),
{
    let mut mask = SigSet::empty();
    mask.add(signal);

    let setup = mask
        .thread_block()
        .and_then(|_| SignalFd::with_flags(&mask, SfdFlags::SFD_CLOEXEC));
    let sfd = match setup {
        Ok(sfd) => sfd,
        Err(errno) => {
            let _ = ready.send(Err(errno));
            return;
        }
    };

    if ready.send(Ok(gettid())).is_err() || shutdown.load(Ordering::Acquire) {
        return;
    }

    loop {
        match sfd.read_signal() {
            Ok(Some(info)) => {
                if shutdown.load(Ordering::Acquire) {
                    break;
                }
                if info.ssi_signo != signal as u32 || info.ssi_code != SI_TIMER {
                    continue;
                }
                // ssi_overrun counts expirations coalesced into this delivery
                on_tick(1 + u64::from(info.ssi_overrun));
            }
            Ok(None) | Err(Errno::EINTR) => continue,
            Err(errno) => {
                error!(error = %errno, "Notifier signalfd read failed, no further ticks");
                on_fault(errno);
                break;
            }
        }
    }

    debug!("Notifier thread exiting");
}
