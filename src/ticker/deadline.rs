/*!
 * Cancel Deadline
 *
 * `wait_for_event` has no timeout. Callers that need a bounded wait arm a
 * deadline that calls `notify_cancel` on the shared timer when it elapses.
 */

use super::traits::TickSource;
use crate::core::errors::{TimerError, TimerResult};
use crate::core::limits::DEADLINE_THREAD_NAME;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeadlineState {
    Pending,
    Disarmed,
    Fired,
}

struct DeadlineShared {
    state: Mutex<DeadlineState>,
    condvar: Condvar,
}

/// Thread that cancels a tick source once a deadline passes
///
/// Dropping the deadline disarms it and joins the thread.
pub struct CancelDeadline {
    shared: Arc<DeadlineShared>,
    source: Arc<dyn TickSource>,
    handle: Option<JoinHandle<()>>,
}

impl CancelDeadline {
    /// Cancel `source` once `after` has elapsed
    pub fn arm<T>(source: Arc<T>, after: Duration) -> TimerResult<Self>
    where
        T: TickSource + 'static,
    {
        let shared = Arc::new(DeadlineShared {
            state: Mutex::new(DeadlineState::Pending),
            condvar: Condvar::new(),
        });
        let source: Arc<dyn TickSource> = source;
        let deadline = Instant::now() + after;

        let thread_shared = shared.clone();
        let thread_source = source.clone();
        let handle = thread::Builder::new()
            .name(DEADLINE_THREAD_NAME.to_string())
            .spawn(move || {
                let mut state = thread_shared.state.lock();
                while *state == DeadlineState::Pending {
                    if thread_shared
                        .condvar
                        .wait_until(&mut state, deadline)
                        .timed_out()
                    {
                        break;
                    }
                }
                if *state != DeadlineState::Pending {
                    return;
                }
                *state = DeadlineState::Fired;
                drop(state);

                debug!(after_ms = after.as_millis() as u64, "Cancel deadline elapsed");
                if let Err(e) = thread_source.notify_cancel() {
                    warn!(error = %e, "Cancel deadline could not cancel the timer");
                }
            })
            .map_err(|e| TimerError::ResourceExhaustion(format!("deadline thread spawn: {}", e)))?;

        Ok(Self {
            shared,
            source,
            handle: Some(handle),
        })
    }

    /// Prevent the deadline from firing
    ///
    /// Returns `false` if it already fired.
    pub fn disarm(&self) -> bool {
        let mut state = self.shared.state.lock();
        match *state {
            DeadlineState::Pending => {
                *state = DeadlineState::Disarmed;
                self.shared.condvar.notify_one();
                true
            }
            DeadlineState::Disarmed => true,
            DeadlineState::Fired => false,
        }
    }

    /// Cancel the source now instead of at the deadline
    pub fn fire_now(&self) -> TimerResult<()> {
        {
            let mut state = self.shared.state.lock();
            if *state == DeadlineState::Pending {
                *state = DeadlineState::Fired;
                self.shared.condvar.notify_one();
            }
        }
        self.source.notify_cancel()
    }

    pub fn has_fired(&self) -> bool {
        *self.shared.state.lock() == DeadlineState::Fired
    }
}

impl Drop for CancelDeadline {
    fn drop(&mut self) {
        self.disarm();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
