/*!
 * Lifecycle transitions against a live timer
 */

use super::harness::*;
use interval_ticker::{IntervalTimer, LifecycleState, TickSource, TickerConfig, TimerError};
use pretty_assertions::assert_eq;
use serial_test::serial;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_start_before_init_is_rejected() {
    for config in backends() {
        let timer = IntervalTimer::new(config);
        let err = timer.start(Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, TimerError::InvalidState { .. }));
        assert_eq!(timer.state(), LifecycleState::Uninitialized);
    }
}

#[test]
fn test_wait_before_init_is_rejected() {
    for config in backends() {
        let timer = IntervalTimer::new(config);
        match timer.wait_for_event() {
            Err(TimerError::InvalidState { operation, state }) => {
                assert_eq!(operation, "wait_for_event");
                assert_eq!(state, LifecycleState::Uninitialized);
            }
            other => panic!("{}: expected InvalidState, got {:?}", timer.name(), other),
        }
    }
}

#[test]
fn test_wait_after_reset_is_rejected() {
    for config in backends() {
        let mut timer = IntervalTimer::initialized(config).unwrap();
        timer.reset();
        assert!(matches!(
            timer.wait_for_event(),
            Err(TimerError::InvalidState { .. })
        ));
    }
}

#[test]
fn test_zero_period_is_configuration_error() {
    for config in backends() {
        let timer = ready_timer(config);
        let err = timer.start(Duration::ZERO).unwrap_err();
        assert!(matches!(err, TimerError::Configuration(_)));
        assert_eq!(timer.state(), LifecycleState::Initialized);
    }
}

#[test]
#[serial]
fn test_stop_halts_production() {
    for config in backends() {
        let timer = ready_timer(config);
        timer.start(Duration::from_millis(100)).unwrap();
        thread::sleep(Duration::from_millis(250));
        timer.stop().unwrap();
        assert_eq!(timer.state(), LifecycleState::Stopped);

        let after_stop = timer.pending_event_count();
        assert!(
            (1..=3).contains(&after_stop),
            "{}: expected ~2 ticks, got {}",
            timer.name(),
            after_stop
        );

        thread::sleep(Duration::from_millis(250));
        assert_eq!(timer.pending_event_count(), after_stop);
    }
}

#[test]
#[serial]
fn test_start_stop_start_resumes() {
    for config in backends() {
        let timer = ready_timer(config);

        timer.start(Duration::from_millis(50)).unwrap();
        assert!(timer.wait_for_event().unwrap().is_consumed());
        timer.stop().unwrap();

        // Drop whatever the first run left behind
        while timer.pending_event_count() > 0 {
            timer.wait_for_event().unwrap();
        }

        let started = Instant::now();
        timer.start(Duration::from_millis(50)).unwrap();
        assert_eq!(timer.state(), LifecycleState::Armed);
        assert!(timer.wait_for_event().unwrap().is_consumed());
        assert!(started.elapsed() >= Duration::from_millis(40));
        timer.stop().unwrap();
    }
}

#[test]
fn test_stop_is_idempotent() {
    for config in backends() {
        let timer = ready_timer(config);
        timer.stop().unwrap();
        timer.start(Duration::from_secs(1)).unwrap();
        timer.stop().unwrap();
        timer.stop().unwrap();
        assert_eq!(timer.state(), LifecycleState::Stopped);
    }
}

#[test]
#[serial]
fn test_reset_then_reinit() {
    for config in backends() {
        let mut timer = IntervalTimer::initialized(config).unwrap();
        timer.start(Duration::from_millis(5)).unwrap();
        thread::sleep(Duration::from_millis(30));
        timer.notify_cancel().unwrap();

        timer.reset();
        assert_eq!(timer.state(), LifecycleState::Uninitialized);
        assert_eq!(timer.pending_event_count(), 0);
        assert!(!timer.is_cancel_requested());

        timer.init().unwrap();
        timer.start(Duration::from_millis(20)).unwrap();
        assert!(timer.wait_for_event().unwrap().is_consumed());
    }
}

#[test]
fn test_reset_on_uninitialized_is_noop() {
    let mut timer = IntervalTimer::new(TickerConfig::descriptor());
    timer.reset();
    timer.reset();
    assert_eq!(timer.state(), LifecycleState::Uninitialized);
}
