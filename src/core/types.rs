/*!
 * Core Types
 * Common types shared by both tick source backends
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a tick source instance
///
/// `Uninitialized → Initialized → Armed ⇄ Stopped`, with `reset` returning
/// to `Uninitialized` from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum LifecycleState {
    Uninitialized = 0,
    Initialized = 1,
    Armed = 2,
    Stopped = 3,
}

impl LifecycleState {
    #[inline]
    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => LifecycleState::Initialized,
            2 => LifecycleState::Armed,
            3 => LifecycleState::Stopped,
            _ => LifecycleState::Uninitialized,
        }
    }

    /// Whether kernel resources are currently held
    #[inline]
    pub const fn is_initialized(self) -> bool {
        !matches!(self, LifecycleState::Uninitialized)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Armed => "armed",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Result of one `wait_for_event` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitOutcome {
    /// This caller claimed exactly one tick
    Consumed,
    /// Woken by cancellation, or another waiter claimed the tick first
    NotConsumed,
}

impl WaitOutcome {
    #[inline(always)]
    pub fn is_consumed(self) -> bool {
        matches!(self, WaitOutcome::Consumed)
    }
}

impl From<bool> for WaitOutcome {
    #[inline(always)]
    fn from(consumed: bool) -> Self {
        if consumed {
            WaitOutcome::Consumed
        } else {
            WaitOutcome::NotConsumed
        }
    }
}

/// Tick source backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// POSIX timer delivering a signal to a dedicated notifier thread
    Signal,
    /// timerfd polled by the waiters themselves through epoll
    Descriptor,
    /// Pick the backend for the current platform
    Auto,
}

impl std::str::FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "signal" => Ok(Backend::Signal),
            "descriptor" | "fd" => Ok(Backend::Descriptor),
            "auto" => Ok(Backend::Auto),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}
