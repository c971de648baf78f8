/*!
 * Ticker Configuration
 *
 * Construction-time configuration for backend selection
 */

use crate::core::types::Backend;
use nix::sys::signal::Signal;

/// Interval timer configuration
#[derive(Debug, Clone)]
pub struct TickerConfig {
    /// Preferred backend
    pub backend: Backend,
    /// Signal the POSIX timer aims at the notifier thread (signal backend only)
    pub notify_signal: Signal,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            notify_signal: Signal::SIGALRM,
        }
    }
}

impl TickerConfig {
    /// Notification-driven backend with the default signal
    pub const fn signal() -> Self {
        Self {
            backend: Backend::Signal,
            notify_signal: Signal::SIGALRM,
        }
    }

    /// Readiness-polled backend
    pub const fn descriptor() -> Self {
        Self {
            backend: Backend::Descriptor,
            notify_signal: Signal::SIGALRM,
        }
    }

    /// Override the timer signal
    pub fn with_signal(mut self, signal: Signal) -> Self {
        self.notify_signal = signal;
        self
    }

    /// Resolve `Auto` to a concrete backend
    ///
    /// The descriptor backend needs no extra thread, so it is preferred.
    pub fn select_backend(&self) -> Backend {
        match self.backend {
            Backend::Auto => Backend::Descriptor,
            other => other,
        }
    }
}
