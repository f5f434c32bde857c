use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Handlers read the time once per request and pass it down; use cases never
/// call `Utc::now()` themselves.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
