use std::sync::Arc;

use crate::{
    clock::{Clock, SystemClock},
    entities::subscription::{normalize_identity, SubscriptionRecord},
    errors::GuardError,
    repositories::subscription::SubscriptionStore,
};

/// Turns a repeated one-time action into `AlreadyExists` instead of a
/// second side effect.
///
/// Only the store's `insert_if_absent` makes this safe under concurrency;
/// the `exists` lookup is an early exit.
pub struct SubscriptionGuard<S>
where
    S: SubscriptionStore,
{
    pub store: S,
    clock: Arc<dyn Clock>,
}

impl<S> SubscriptionGuard<S>
where
    S: SubscriptionStore,
{
    pub fn new(store: S) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// `recorded_at` is read from `clock`.
    pub fn with_clock(store: S, clock: Arc<dyn Clock>) -> Self {
        SubscriptionGuard { store, clock }
    }

    /// Records `identity` unless it is already recorded. Never retries.
    pub async fn register_if_new(
        &self,
        identity: &str,
        source: &str,
    ) -> Result<SubscriptionRecord, GuardError> {
        let identity = normalize_identity(identity);

        if self.store.exists(&identity).await? {
            return Err(GuardError::AlreadyExists);
        }

        let record = SubscriptionRecord::new(&identity, source, self.clock.utc_now());
        if self.store.insert_if_absent(&record).await? {
            Ok(record)
        } else {
            tracing::debug!("Lost registration race for an existing identity");
            Err(GuardError::AlreadyExists)
        }
    }
}
