use std::sync::Arc;

use crate::repositories::{
    contact::ContactRepository,
    memory::{InMemoryContactRepo, InMemorySubscriptionStore},
    sqlx_repo::{SqlxContactRepo, SqlxSubscriptionRepo},
    subscription::SubscriptionStore,
};

pub type SharedContactRepo = Arc<dyn ContactRepository>;
pub type SharedSubscriptionStore = Arc<dyn SubscriptionStore>;

#[derive(Clone)]
pub struct SharedRepositories {
    pub contact_repo: SharedContactRepo,
    pub subscription_store: SharedSubscriptionStore,
}

impl SharedRepositories {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SharedRepositories {
            contact_repo: Arc::new(SqlxContactRepo::new(pool.clone())),
            subscription_store: Arc::new(SqlxSubscriptionRepo::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        SharedRepositories {
            contact_repo: Arc::new(InMemoryContactRepo::new()),
            subscription_store: Arc::new(InMemorySubscriptionStore::new()),
        }
    }
}
