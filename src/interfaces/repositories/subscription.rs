use std::sync::Arc;

use async_trait::async_trait;
use sqlx::Row;

use crate::{
    entities::subscription::SubscriptionRecord,
    errors::DatabaseError,
    repositories::sqlx_repo::SqlxSubscriptionRepo,
};

/// Persistent record of completed one-time actions, keyed by normalized identity.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn check_connection(&self) -> Result<(), DatabaseError>;
    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError>;
    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DatabaseError>;

    /// Inserts unless a record for the identity exists. Returns whether it inserted.
    ///
    /// The default is check-then-insert and is not atomic; stores that can
    /// enforce uniqueness should override it.
    async fn insert_if_absent(&self, record: &SubscriptionRecord) -> Result<bool, DatabaseError> {
        if self.exists(&record.identity).await? {
            return Ok(false);
        }
        match self.insert(record).await {
            Ok(()) => Ok(true),
            Err(DatabaseError::ConstraintViolation(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl<T> SubscriptionStore for Arc<T>
where
    T: SubscriptionStore + ?Sized,
{
    async fn check_connection(&self) -> Result<(), DatabaseError> {
        (**self).check_connection().await
    }

    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError> {
        (**self).exists(identity).await
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DatabaseError> {
        (**self).insert(record).await
    }

    async fn insert_if_absent(&self, record: &SubscriptionRecord) -> Result<bool, DatabaseError> {
        (**self).insert_if_absent(record).await
    }
}

impl SqlxSubscriptionRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxSubscriptionRepo { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SqlxSubscriptionRepo {
    async fn check_connection(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(DatabaseError::from)
    }

    async fn exists(&self, identity: &str) -> Result<bool, DatabaseError> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM newsletter_subscriptions WHERE identity = LOWER($1)) AS found"
        )
        .bind(identity)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get::<bool, _>("found")?)
    }

    async fn insert(&self, record: &SubscriptionRecord) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO newsletter_subscriptions (identity, recorded_at, source)
            VALUES ($1, $2, $3)
            "#
        )
        .bind(&record.identity)
        .bind(record.recorded_at)
        .bind(&record.source)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_if_absent(&self, record: &SubscriptionRecord) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            r#"
            INSERT INTO newsletter_subscriptions (identity, recorded_at, source)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity) DO NOTHING
            "#
        )
        .bind(&record.identity)
        .bind(record.recorded_at)
        .bind(&record.source)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
