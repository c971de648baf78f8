/*!
 * Ticker Statistics
 * Lock-free counters describing what a tick source produced and handed out
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Relaxed counters; exact only once producers and waiters are quiescent
#[derive(Debug, Default)]
pub struct TickerStats {
    produced: AtomicU64,
    consumed: AtomicU64,
    not_consumed: AtomicU64,
    io_errors: AtomicU64,
}

impl TickerStats {
    pub const fn new() -> Self {
        Self {
            produced: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            not_consumed: AtomicU64::new(0),
            io_errors: AtomicU64::new(0),
        }
    }

    #[inline(always)]
    pub fn record_produced(&self, n: u64) {
        self.produced.fetch_add(n, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn record_wake(&self, consumed: bool) {
        if consumed {
            self.consumed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.not_consumed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline(always)]
    pub fn record_io_error(&self) {
        self.io_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TickerStatsSnapshot {
        TickerStatsSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
            not_consumed: self.not_consumed.load(Ordering::Relaxed),
            io_errors: self.io_errors.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.produced.store(0, Ordering::Relaxed);
        self.consumed.store(0, Ordering::Relaxed);
        self.not_consumed.store(0, Ordering::Relaxed);
        self.io_errors.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of `TickerStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerStatsSnapshot {
    /// Ticks the kernel reported, overruns included
    pub produced: u64,
    /// Ticks claimed by waiters
    pub consumed: u64,
    /// Wakes that ended without a claim (cancellation or lost race)
    pub not_consumed: u64,
    pub io_errors: u64,
}

impl TickerStatsSnapshot {
    /// Ticks produced but not yet claimed, as seen by this snapshot
    pub fn unclaimed(&self) -> u64 {
        self.produced.saturating_sub(self.consumed)
    }
}
