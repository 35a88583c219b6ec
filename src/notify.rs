//! User-facing notification sink
//!
//! Notifications are fire-and-forget and never influence control flow.
//! Errors are always delivered; success and warning messages are dropped by
//! the manager when `sync.quiet` is set.

use std::fmt;
use tracing::{error, info, warn};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Success,
    Warn,
    Error,
}

impl fmt::Display for NotifyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyLevel::Success => write!(f, "success"),
            NotifyLevel::Warn => write!(f, "warn"),
            NotifyLevel::Error => write!(f, "error"),
        }
    }
}

/// Receiver of short user-facing messages
pub trait Notifier: Send + Sync {
    /// Deliver a message
    fn notify(&self, level: NotifyLevel, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotifyLevel::Success, message);
    }

    fn warn(&self, message: &str) {
        self.notify(NotifyLevel::Warn, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotifyLevel::Error, message);
    }
}

/// Notifier that writes messages to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, level: NotifyLevel, message: &str) {
        match level {
            NotifyLevel::Success => info!(notification = %level, "{}", message),
            NotifyLevel::Warn => warn!(notification = %level, "{}", message),
            NotifyLevel::Error => error!(notification = %level, "{}", message),
        }
    }
}
