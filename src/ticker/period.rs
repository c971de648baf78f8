/*!
 * Period Conversion
 *
 * Validates a requested tick period and converts it to the kernel timer
 * representation: first expiration one period out, then every period.
 */

use crate::core::errors::{TimerError, TimerResult};
use crate::core::limits::{MAX_PERIOD, MIN_PERIOD};
use nix::sys::time::TimeSpec;
use nix::sys::timerfd::Expiration;
use std::time::Duration;

/// Build the periodic expiration for `period`
///
/// Rejects zero (which would disarm) and periods past `MAX_PERIOD`.
pub fn periodic_expiration(period: Duration) -> TimerResult<Expiration> {
    if period < MIN_PERIOD {
        return Err(TimerError::Configuration(format!(
            "period must be strictly positive, got {:?}",
            period
        )));
    }
    if period > MAX_PERIOD {
        return Err(TimerError::Configuration(format!(
            "period {:?} exceeds maximum {:?}",
            period, MAX_PERIOD
        )));
    }

    Ok(Expiration::Interval(TimeSpec::from_duration(period)))
}
