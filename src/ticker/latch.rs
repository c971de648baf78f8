/*!
 * Cancellation Latch
 *
 * One-way flag: false → true exactly once per armed lifetime, cleared only by
 * a full reset. The backend performs its wake side-effect only when
 * `trigger` reports that this caller made the transition.
 */

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct CancelLatch {
    cancelled: AtomicBool,
}

impl CancelLatch {
    pub const fn new() -> Self {
        Self {
            cancelled: AtomicBool::new(false),
        }
    }

    /// Set the latch
    ///
    /// Returns `true` only for the caller that flipped it.
    #[inline]
    pub fn trigger(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    #[inline]
    pub fn clear(&self) {
        self.cancelled.store(false, Ordering::Release);
    }
}
