use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the `resume_analyses` table on first boot. Rows are insert-only;
/// there is no migration tooling here.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS resume_analyses (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            resume_text TEXT NOT NULL,
            job_description TEXT NOT NULL DEFAULT '',
            feedback TEXT NOT NULL,
            optimized_resume TEXT,
            cover_letter TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Schema ready (resume_analyses)");
    Ok(())
}
