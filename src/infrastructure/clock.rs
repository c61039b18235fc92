use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

/// Source of time for the throttle (monotonic) and for stored records (wall).
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    fn utc_now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug)]
struct MockTime {
    instant: Instant,
    utc: DateTime<Utc>,
}

/// Clock that only moves when told to. Clones share the same time, and both
/// readings advance together.
#[derive(Debug, Clone)]
pub struct MockClock {
    current: Arc<Mutex<MockTime>>,
}

impl MockClock {
    pub fn new(start: Instant) -> Self {
        Self::starting_at(start, Utc::now())
    }

    pub fn starting_at(instant: Instant, utc: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(MockTime { instant, utc })),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut time = self.current.lock();
        time.instant += by;
        if let Ok(delta) = TimeDelta::from_std(by) {
            time.utc += delta;
        }
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new(Instant::now())
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.current.lock().instant
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.current.lock().utc
    }
}
