use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One completed analysis, as stored in `resume_analyses`.
/// Rows are written once and never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AnalysisRow {
    pub id: Uuid,
    pub resume_text: String,
    /// Empty string when the caller supplied no job description.
    pub job_description: String,
    pub feedback: String,
    pub optimized_resume: Option<String>,
    pub cover_letter: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a new analysis row. `id` and `created_at` are
/// assigned by the database.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub resume_text: String,
    pub job_description: String,
    pub feedback: String,
    pub optimized_resume: Option<String>,
    pub cover_letter: Option<String>,
}
