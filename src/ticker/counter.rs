/*!
 * Event Counter
 *
 * Backlog of ticks delivered by the kernel but not yet claimed by a waiter.
 *
 * # Design: CAS Claim Instead of Decrement-Then-Undo
 *
 * A claim reads the counter and, only if it is positive, swaps in `value - 1`,
 * retrying on contention. A zero backlog is never mutated, so readers can
 * never observe a transient negative value. The counter is unsigned, which
 * makes "never negative" a property of the type.
 */

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free backlog counter shared by producers and waiters
#[derive(Debug, Default)]
#[repr(C, align(64))] // Cache-line aligned to prevent false sharing
pub struct EventCounter {
    pending: AtomicU64,
}

impl EventCounter {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU64::new(0),
        }
    }

    /// Record `n` newly delivered ticks
    #[inline]
    pub fn add(&self, n: u64) {
        if n > 0 {
            self.pending.fetch_add(n, Ordering::AcqRel);
        }
    }

    /// Claim one tick if any is pending
    ///
    /// Returns `false` without touching the counter when the backlog is empty.
    #[inline]
    pub fn try_claim(&self) -> bool {
        self.pending
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |value| {
                value.checked_sub(1)
            })
            .is_ok()
    }

    #[inline]
    pub fn has_backlog(&self) -> bool {
        self.pending.load(Ordering::Acquire) > 0
    }

    #[inline]
    pub fn pending(&self) -> u64 {
        self.pending.load(Ordering::Acquire)
    }

    /// Drop the whole backlog (reset and signal-backend start only)
    #[inline]
    pub fn clear(&self) {
        self.pending.store(0, Ordering::Release);
    }
}
