//! Outbound ports.

use std::sync::Arc;

/// Clock abstraction so retry schedules are testable without sleeping.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> u64;

    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> u64 {
        self.now_millis() / 1000
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_millis(&self) -> u64 {
        self.as_ref().now_millis()
    }
}
