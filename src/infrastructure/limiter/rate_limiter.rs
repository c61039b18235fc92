use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use dashmap::{DashMap, mapref::entry::Entry};

use crate::{
    clock::{Clock, SystemClock},
    errors::ThrottleError,
};

/// Share of `max_tracked` freed at once when the table is full of live windows.
const EVICTION_BATCH_DIVISOR: usize = 10;

/// Attempts recorded for one identifier in the current fixed window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottleWindow {
    pub identifier: String,
    pub count: u32,
    pub window_started_at: Instant,
}

impl ThrottleWindow {
    fn start(identifier: &str, now: Instant) -> Self {
        Self {
            identifier: identifier.to_string(),
            count: 1,
            window_started_at: now,
        }
    }

    fn is_expired(&self, now: Instant, interval: Duration) -> bool {
        now.saturating_duration_since(self.window_started_at) >= interval
    }

    fn reset_in(&self, now: Instant, interval: Duration) -> Duration {
        interval.saturating_sub(now.saturating_duration_since(self.window_started_at))
    }
}

/// Outcome of an admitted attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allowed {
    /// Attempts still available in this window
    pub remaining: u32,
    pub reset_in: Duration,
}

/// --- Fixed-window throttle ---
///
/// Counts attempts per identifier and rejects once `limit` is reached inside
/// the window. The window resets entirely at `window_started_at + interval`,
/// so up to `2 * limit` attempts can pass across a boundary.
///
/// State is local to this process. Two instances, or two processes, keep
/// independent counts.
pub struct RequestThrottle {
    windows: DashMap<String, ThrottleWindow>,
    interval: Duration,
    limit: u32,
    max_tracked: Option<usize>,
    clock: Arc<dyn Clock>,
}

impl RequestThrottle {
    pub fn new(interval: Duration, limit: u32) -> Self {
        Self::with_clock(interval, limit, Arc::new(SystemClock))
    }

    /// `limit` is clamped to at least one attempt per window.
    pub fn with_clock(interval: Duration, limit: u32, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            interval,
            limit: limit.max(1),
            max_tracked: None,
            clock,
        }
    }

    /// Bound the number of identifiers tracked at once.
    pub fn max_tracked_identifiers(mut self, max: usize) -> Self {
        self.max_tracked = Some(max.max(1));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Record an attempt for `identifier`, or reject it if the window is full.
    ///
    /// A rejected attempt leaves the count and the window start untouched.
    pub fn allow(&self, identifier: &str) -> Result<Allowed, ThrottleError> {
        let now = self.clock.now();

        if let Some(max) = self.max_tracked {
            // Must run before `entry` takes the shard lock.
            if !self.windows.contains_key(identifier) && self.windows.len() >= max {
                self.make_room(now, max);
            }
        }

        match self.windows.entry(identifier.to_string()) {
            Entry::Occupied(mut entry) => {
                let window = entry.get_mut();

                if window.is_expired(now, self.interval) {
                    *window = ThrottleWindow::start(identifier, now);
                    return Ok(self.admitted(window, now));
                }

                if window.count >= self.limit {
                    tracing::debug!(identifier, count = window.count, "throttle rejected attempt");
                    return Err(ThrottleError::RateLimitExceeded {
                        retry_after: window.reset_in(now, self.interval),
                    });
                }

                window.count += 1;
                Ok(self.admitted(window, now))
            }
            Entry::Vacant(entry) => {
                let window = entry.insert(ThrottleWindow::start(identifier, now));
                Ok(self.admitted(&window, now))
            }
        }
    }

    fn admitted(&self, window: &ThrottleWindow, now: Instant) -> Allowed {
        Allowed {
            remaining: self.limit.saturating_sub(window.count),
            reset_in: window.reset_in(now, self.interval),
        }
    }

    /// Drop every expired window. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(self.clock.now())
    }

    fn sweep_at(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, window| !window.is_expired(now, self.interval));
        before.saturating_sub(self.windows.len())
    }

    fn make_room(&self, now: Instant, max: usize) {
        self.sweep_at(now);
        if self.windows.len() < max {
            return;
        }

        // Free a whole batch so the next admissions skip this scan.
        let target = self.windows.len().saturating_sub(max) + (max / EVICTION_BATCH_DIVISOR).max(1);
        let mut starts: Vec<(Instant, String)> = self
            .windows
            .iter()
            .map(|entry| (entry.value().window_started_at, entry.key().clone()))
            .collect();

        if target < starts.len() {
            starts.select_nth_unstable_by_key(target, |(started_at, _)| *started_at);
            starts.truncate(target);
        }

        for (_, key) in &starts {
            self.windows.remove(key);
        }

        tracing::warn!(evicted = starts.len(), max, "throttle at capacity, evicted oldest windows");
    }

    /// Snapshot of the window for `identifier`, if one is tracked.
    pub fn window(&self, identifier: &str) -> Option<ThrottleWindow> {
        self.windows.get(identifier).map(|w| w.value().clone())
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.windows.len()
    }
}
