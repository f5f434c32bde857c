use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use inkpost_core::clock::Clock;

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// 2025-01-15T12:00:00Z.
    pub fn fixed() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}
