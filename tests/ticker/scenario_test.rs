/*!
 * End-to-end tick distribution scenarios
 */

use super::harness::*;
use interval_ticker::{TickSource, TickerConfig};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::thread;
use std::time::Duration;

fn single_waiter_100ms(config: TickerConfig) {
    let timer = ready_timer(config);
    let handles = spawn_waiters(&timer, 1, Duration::ZERO);

    // Waiter blocks on an unarmed timer first
    thread::sleep(Duration::from_millis(200));
    assert_eq!(timer.pending_event_count(), 0);

    timer.start(Duration::from_millis(100)).unwrap();
    thread::sleep(Duration::from_millis(2510));
    timer.notify_cancel().unwrap();

    let reports = join_all(handles);
    let events = total_events(&reports);
    assert!(
        (24..=26).contains(&events),
        "{}: expected ~25 ticks, got {}",
        timer.name(),
        events
    );
}

#[test]
#[serial]
fn test_single_waiter_signal() {
    single_waiter_100ms(TickerConfig::signal());
}

#[test]
#[serial]
fn test_single_waiter_descriptor() {
    single_waiter_100ms(TickerConfig::descriptor());
}

fn eight_waiters_1ms(config: TickerConfig) {
    let timer = ready_timer(config);
    let handles = spawn_waiters(&timer, 8, Duration::ZERO);

    timer.start(Duration::from_millis(1)).unwrap();
    thread::sleep(Duration::from_millis(2500));
    timer.stop().unwrap();
    settle();
    timer.notify_cancel().unwrap();

    let reports = join_all(handles);
    let consumed = total_events(&reports);
    let stats = timer.stats();

    // Every produced tick is either consumed or still in the backlog
    assert_eq!(consumed + timer.pending_event_count(), stats.produced);
    assert_eq!(consumed, stats.consumed);
    assert!(
        (2400..=2600).contains(&stats.produced),
        "{}: expected ~2500 ticks, got {}",
        timer.name(),
        stats.produced
    );
    // Consumers keep up with a 1ms period
    assert!(timer.pending_event_count() <= 8);
}

#[test]
#[serial]
fn test_eight_waiters_signal() {
    eight_waiters_1ms(TickerConfig::signal());
}

#[test]
#[serial]
fn test_eight_waiters_descriptor() {
    eight_waiters_1ms(TickerConfig::descriptor());
}

#[test]
#[serial]
fn test_ticks_spread_across_waiters() {
    for config in backends() {
        let timer = ready_timer(config);
        let handles = spawn_waiters(&timer, 4, Duration::from_millis(5));

        timer.start(Duration::from_millis(2)).unwrap();
        thread::sleep(Duration::from_millis(500));
        timer.notify_cancel().unwrap();

        let reports = join_all(handles);
        let busy = reports.iter().filter(|r| r.events > 0).count();
        assert!(busy >= 2, "{}: only {} waiters saw ticks", timer.name(), busy);
    }
}
