//! Axum route handlers for the analysis API.

use axum::extract::{Multipart, State};
use axum::Json;

use crate::analysis::pipeline::{run_analysis, AnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

/// POST /analyze/
///
/// Multipart form: `resume` (PDF file, required) and `job_description`
/// (text, optional, defaults to empty). Returns the generated texts; the
/// stored row is not part of the response contract.
pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut resume_bytes: Option<Vec<u8>> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().map(|n| n.to_string());
        match name.as_deref() {
            Some("resume") => {
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("failed to read resume upload: {e}"))
                })?;
                resume_bytes = Some(bytes.to_vec());
            }
            Some("job_description") => {
                job_description = field.text().await.map_err(|e| {
                    AppError::Validation(format!("failed to read job_description: {e}"))
                })?;
            }
            // Unknown parts are ignored.
            _ => {}
        }
    }

    let resume_bytes = resume_bytes
        .ok_or_else(|| AppError::Validation("multipart field 'resume' is required".to_string()))?;

    let outcome = run_analysis(
        state.store.as_ref(),
        &state.llm,
        state.config.prompt_set,
        &resume_bytes,
        &job_description,
    )
    .await?;

    Ok(Json(outcome.result))
}
