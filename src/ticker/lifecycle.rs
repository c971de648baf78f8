/*!
 * Lifecycle State Cell
 *
 * Atomic holder for `LifecycleState` plus the transition rules shared by both
 * backends. `init`/`reset` run with exclusive access; `start`/`stop` may race
 * with waiters, so the cell is atomic rather than a plain field.
 */

use crate::core::errors::{TimerError, TimerResult};
use crate::core::types::LifecycleState;
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Uninitialized as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// `start` is legal from Initialized, Armed, and Stopped
    pub fn check_start(&self) -> TimerResult<()> {
        match self.get() {
            LifecycleState::Uninitialized => {
                Err(TimerError::invalid_state("start", LifecycleState::Uninitialized))
            }
            _ => Ok(()),
        }
    }

    /// `stop` needs resources; on an unarmed instance it is a no-op
    pub fn check_stop(&self) -> TimerResult<()> {
        match self.get() {
            LifecycleState::Uninitialized => {
                Err(TimerError::invalid_state("stop", LifecycleState::Uninitialized))
            }
            _ => Ok(()),
        }
    }

    /// Record a successful disarm
    ///
    /// Only `Armed` moves to `Stopped`; `Initialized` stays as it was.
    pub fn mark_stopped(&self) {
        let _ = self.state.compare_exchange(
            LifecycleState::Armed as u8,
            LifecycleState::Stopped as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
