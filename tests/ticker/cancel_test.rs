/*!
 * Cancellation tests
 */

use super::harness::*;
use interval_ticker::{CancelDeadline, TickSource, WaitOutcome};
use pretty_assertions::assert_eq;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_cancel_releases_blocked_waiters() {
    for config in backends() {
        let timer = ready_timer(config);
        let handles = spawn_waiters(&timer, 4, Duration::ZERO);
        thread::sleep(Duration::from_millis(50));

        let cancelled = Instant::now();
        timer.notify_cancel().unwrap();
        let reports = join_all(handles);

        assert!(cancelled.elapsed() < Duration::from_secs(1));
        assert_eq!(total_events(&reports), 0);
    }
}

#[test]
fn test_waits_after_cancel_return_immediately() {
    for config in backends() {
        let timer = ready_timer(config);
        timer.notify_cancel().unwrap();

        for _ in 0..10 {
            assert_eq!(timer.wait_for_event().unwrap(), WaitOutcome::NotConsumed);
        }
        assert!(timer.is_cancel_requested());
    }
}

#[test]
fn test_cancel_is_idempotent() {
    for config in backends() {
        let timer = ready_timer(config);
        timer.notify_cancel().unwrap();
        timer.notify_cancel().unwrap();
        timer.notify_cancel().unwrap();

        assert!(timer.is_cancel_requested());
        assert_eq!(timer.wait_for_event().unwrap(), WaitOutcome::NotConsumed);
        assert_eq!(timer.stats().not_consumed, 1);
    }
}

#[test]
fn test_backlog_drains_after_cancel() {
    for config in backends() {
        let timer = ready_timer(config);
        timer.start(Duration::from_millis(5)).unwrap();
        thread::sleep(Duration::from_millis(40));
        timer.stop().unwrap();
        timer.notify_cancel().unwrap();

        // Cancellation does not discard ticks already published
        let backlog = timer.pending_event_count();
        assert!(backlog > 0, "{}: no backlog", timer.name());
        for _ in 0..backlog {
            assert_eq!(timer.wait_for_event().unwrap(), WaitOutcome::Consumed);
        }
        assert_eq!(timer.wait_for_event().unwrap(), WaitOutcome::NotConsumed);
    }
}

#[test]
fn test_deadline_bounds_wait_on_idle_timer() {
    for config in backends() {
        let timer = ready_timer(config);
        let _deadline = CancelDeadline::arm(timer.clone(), Duration::from_millis(30)).unwrap();

        let started = Instant::now();
        assert_eq!(timer.wait_for_event().unwrap(), WaitOutcome::NotConsumed);
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
