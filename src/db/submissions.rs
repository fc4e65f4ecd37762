use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NormalizedSubmission, StoredSubmission};

/// Durable sink for validated submissions.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn insert(&self, record: &NormalizedSubmission) -> Result<StoredSubmission, StoreError>;
}

/// PostgreSQL-backed store. Each insert checks a connection out of the pool
/// for the duration of the statement only.
#[derive(Debug, Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubmissionStore for PgSubmissionStore {
    async fn insert(&self, record: &NormalizedSubmission) -> Result<StoredSubmission, StoreError> {
        Ok(create(&self.pool, record).await?)
    }
}

pub async fn create(pool: &PgPool, record: &NormalizedSubmission) -> Result<StoredSubmission, sqlx::Error> {
    sqlx::query_as::<_, StoredSubmission>(
        "INSERT INTO form_submissions (id, name, email, message, submitted_at)
         VALUES ($1, $2, $3, $4, $5::timestamptz) RETURNING *",
    )
    .bind(Uuid::now_v7())
    .bind(&record.name)
    .bind(&record.email)
    .bind(&record.message)
    .bind(&record.submitted_at)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<StoredSubmission>, sqlx::Error> {
    sqlx::query_as::<_, StoredSubmission>("SELECT * FROM form_submissions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM form_submissions")
        .fetch_one(pool)
        .await?;
    Ok(row.0)
}
