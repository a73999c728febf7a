use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::analysis::{AnalysisRow, NewAnalysis};

/// Persistence seam for completed analyses. Rows are insert-only; nothing
/// in the service updates or deletes a stored analysis.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn insert(&self, new: NewAnalysis) -> Result<AnalysisRow, AppError>;
}

pub struct PgAnalysisStore {
    pool: PgPool,
}

impl PgAnalysisStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalysisStore for PgAnalysisStore {
    async fn insert(&self, new: NewAnalysis) -> Result<AnalysisRow, AppError> {
        // Single statement so all generated fields land together; `id` and
        // `created_at` come back from the database.
        let row = sqlx::query_as::<_, AnalysisRow>(
            r#"
            INSERT INTO resume_analyses
                (resume_text, job_description, feedback, optimized_resume, cover_letter)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&new.resume_text)
        .bind(&new.job_description)
        .bind(&new.feedback)
        .bind(&new.optimized_resume)
        .bind(&new.cover_letter)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
