//! Time source port.

use chrono::{DateTime, Utc};

/// Source of the current wall-clock time.
///
/// Market timestamps and idempotency expiry both read from a clock so tests
/// can move time explicitly.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
