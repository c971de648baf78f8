/*!
 * Backlog accounting under slow consumers
 */

use super::harness::*;
use interval_ticker::TickSource;
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
#[serial]
fn test_slow_waiters_accumulate_backlog() {
    for config in backends() {
        let timer = ready_timer(config);
        let handles = spawn_waiters(&timer, 8, Duration::from_millis(50));

        timer.start(Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(2500));
        timer.stop().unwrap();
        settle();
        timer.notify_cancel().unwrap();

        let reports = join_all(handles);
        let consumed = total_events(&reports);
        let stats = timer.stats();

        // Each waiter manages roughly one tick per 50ms
        assert!(
            (8 * 40..=8 * 52).contains(&consumed),
            "{}: consumed {}",
            timer.name(),
            consumed
        );
        assert_eq!(consumed + timer.pending_event_count(), stats.produced);
        assert!(timer.pending_event_count() > 1500);
    }
}

#[test]
#[serial]
fn test_pending_never_exceeds_produced() {
    for config in backends() {
        let timer = ready_timer(config);
        let handles = spawn_waiters(&timer, 8, Duration::ZERO);
        let done = Arc::new(AtomicBool::new(false));

        let observer = {
            let timer = timer.clone();
            let done = done.clone();
            thread::spawn(move || {
                let mut samples = 0u64;
                while !done.load(Ordering::Acquire) {
                    let pending = timer.pending_event_count();
                    let produced = timer.stats().produced;
                    // A wrapped counter would dwarf everything ever produced
                    assert!(pending <= produced, "pending {} produced {}", pending, produced);
                    samples += 1;
                }
                samples
            })
        };

        timer.start(Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(300));
        timer.notify_cancel().unwrap();
        join_all(handles);

        done.store(true, Ordering::Release);
        assert!(observer.join().unwrap() > 0);
    }
}
