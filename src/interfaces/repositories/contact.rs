use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Row};

use crate::{
    entities::contact::{ContactStatus, ContactSubmission},
    errors::DatabaseError,
    repositories::sqlx_repo::SqlxContactRepo,
};

#[async_trait]
pub trait ContactRepository: Send + Sync {
    async fn check_connection(&self) -> Result<(), DatabaseError>;
    async fn create_submission(&self, submission: &ContactSubmission) -> Result<(), DatabaseError>;
    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, DatabaseError>;
    async fn count_submissions(&self) -> Result<i64, DatabaseError>;
}

#[async_trait]
impl<T> ContactRepository for Arc<T>
where
    T: ContactRepository + ?Sized,
{
    async fn check_connection(&self) -> Result<(), DatabaseError> {
        (**self).check_connection().await
    }

    async fn create_submission(&self, submission: &ContactSubmission) -> Result<(), DatabaseError> {
        (**self).create_submission(submission).await
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, DatabaseError> {
        (**self).list_submissions().await
    }

    async fn count_submissions(&self) -> Result<i64, DatabaseError> {
        (**self).count_submissions().await
    }
}

impl SqlxContactRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxContactRepo { pool }
    }
}

fn submission_from_row(row: PgRow) -> Result<ContactSubmission, DatabaseError> {
    let status: String = row.try_get("status")?;

    Ok(ContactSubmission {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        email: row.try_get("email")?,
        project_type: row.try_get("project_type")?,
        priority: row.try_get("priority")?,
        project_scope: row.try_get("project_scope")?,
        implementation_timeframe: row.try_get("implementation_timeframe")?,
        project_scale: row.try_get("project_scale")?,
        service: row.try_get("service")?,
        status: status.parse::<ContactStatus>().map_err(DatabaseError::QueryError)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl ContactRepository for SqlxContactRepo {
    async fn check_connection(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(DatabaseError::from)
    }

    async fn create_submission(&self, submission: &ContactSubmission) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO contact_submissions (
                id,
                full_name,
                email,
                project_type,
                priority,
                project_scope,
                implementation_timeframe,
                project_scale,
                service,
                status,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#
        )
        .bind(submission.id)
        .bind(&submission.full_name)
        .bind(&submission.email)
        .bind(&submission.project_type)
        .bind(&submission.priority)
        .bind(&submission.project_scope)
        .bind(&submission.implementation_timeframe)
        .bind(&submission.project_scale)
        .bind(&submission.service)
        .bind(submission.status.to_string())
        .bind(submission.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_submissions(&self) -> Result<Vec<ContactSubmission>, DatabaseError> {
        sqlx::query(r#"SELECT * FROM contact_submissions ORDER BY created_at DESC"#)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(submission_from_row)
            .collect()
    }

    async fn count_submissions(&self) -> Result<i64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM contact_submissions"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
