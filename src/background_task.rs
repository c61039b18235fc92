use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::limiter::rate_limiter::RequestThrottle;

/// Drops expired throttle windows so idle identifiers don't pile up.
///
/// Runs once per shortest window so no expired entry outlives its window by
/// more than one interval.
pub async fn start_sweep_task(throttles: Vec<Arc<RequestThrottle>>) {
    let period = throttles
        .iter()
        .map(|t| t.interval())
        .min()
        .unwrap_or(Duration::from_secs(60))
        .max(Duration::from_secs(1));

    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let removed: usize = throttles.iter().map(|t| t.sweep()).sum();
        if removed > 0 {
            tracing::debug!("Swept {} expired throttle windows", removed);
        }
    }
}
