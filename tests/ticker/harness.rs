/*!
 * Shared waiter harness
 */

use interval_ticker::{IntervalTimer, TickSource, TickerConfig};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Both backends, for tests that must hold regardless of the mechanism
pub fn backends() -> [TickerConfig; 2] {
    [TickerConfig::signal(), TickerConfig::descriptor()]
}

pub fn ready_timer(config: TickerConfig) -> Arc<IntervalTimer> {
    Arc::new(IntervalTimer::initialized(config).expect("timer init"))
}

/// Let a delivery already in flight at `stop` land before counting
pub fn settle() {
    thread::sleep(Duration::from_millis(20));
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WaiterReport {
    pub events: u64,
    pub loops: u64,
}

/// Spawn a thread that waits for ticks until cancellation, sleeping `work`
/// after every consumed tick
pub fn spawn_waiter(timer: Arc<IntervalTimer>, work: Duration) -> JoinHandle<WaiterReport> {
    thread::spawn(move || {
        let mut report = WaiterReport::default();
        while !timer.is_cancel_requested() {
            report.loops += 1;
            if timer.wait_for_event().expect("wait failed").is_consumed() {
                report.events += 1;
                if !work.is_zero() {
                    thread::sleep(work);
                }
            }
        }
        report
    })
}

pub fn spawn_waiters(
    timer: &Arc<IntervalTimer>,
    count: usize,
    work: Duration,
) -> Vec<JoinHandle<WaiterReport>> {
    (0..count)
        .map(|_| spawn_waiter(timer.clone(), work))
        .collect()
}

pub fn join_all(handles: Vec<JoinHandle<WaiterReport>>) -> Vec<WaiterReport> {
    handles
        .into_iter()
        .map(|h| h.join().expect("waiter panicked"))
        .collect()
}

pub fn total_events(reports: &[WaiterReport]) -> u64 {
    reports.iter().map(|r| r.events).sum()
}
