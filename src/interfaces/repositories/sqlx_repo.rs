use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxContactRepo {
    pub pool: PgPool,
}

#[derive(Clone)]
pub struct SqlxSubscriptionRepo {
    pub pool: PgPool,
}
