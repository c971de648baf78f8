/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::LifecycleState;
use miette::Diagnostic;
use nix::errno::Errno;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for interval timer operations
pub type TimerResult<T> = Result<T, TimerError>;

/// Interval timer errors with serialization support
///
/// Cancellation is not an error: it is a normal terminal signal,
/// observed through `is_cancel_requested`, not a failure.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum TimerError {
    #[error("Kernel resource allocation failed: {0}")]
    #[diagnostic(
        code(ticker::resource_exhaustion),
        help("The instance stays uninitialized and init can be retried. Check fd and timer limits.")
    )]
    ResourceExhaustion(String),

    #[error("Invalid timer configuration: {0}")]
    #[diagnostic(
        code(ticker::configuration),
        help("The period must be strictly positive. Armed state was left unchanged.")
    )]
    Configuration(String),

    #[error("Tick channel I/O failed: {0}")]
    #[diagnostic(
        code(ticker::hard_io),
        help("Tick accounting is no longer reliable. Call reset and init before reuse.")
    )]
    HardIo(String),

    #[error("Cannot {operation} while {state}")]
    #[diagnostic(
        code(ticker::invalid_state),
        help("Call init before start, and reset before re-initializing a broken instance.")
    )]
    InvalidState {
        operation: String,
        state: LifecycleState,
    },
}

impl TimerError {
    pub(crate) fn exhausted(what: &str, errno: Errno) -> Self {
        TimerError::ResourceExhaustion(format!("{}: {}", what, errno.desc()))
    }

    pub(crate) fn io(what: &str, errno: Errno) -> Self {
        TimerError::HardIo(format!("{}: {}", what, errno.desc()))
    }

    pub(crate) fn invalid_state(operation: &str, state: LifecycleState) -> Self {
        TimerError::InvalidState {
            operation: operation.to_string(),
            state,
        }
    }

    /// Whether the instance must be reset before its counts can be trusted again
    pub fn is_fatal(&self) -> bool {
        matches!(self, TimerError::HardIo(_))
    }
}
