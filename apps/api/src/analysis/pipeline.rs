//! Analysis pipeline — orchestrates extraction, prompting, and persistence.
//!
//! Flow: extract_resume_text → build_prompts → one chat session, prompts
//! sent in order → insert one row → return the in-memory result.
//!
//! Each step is a hard sequence point. The insert happens only after every
//! model call has succeeded, so a failed run leaves no row behind.

use serde::Serialize;
use tracing::info;

use crate::analysis::extract::extract_resume_text;
use crate::analysis::prompts::{build_prompts, PromptSet, Slot, ANALYSIS_SYSTEM};
use crate::analysis::store::AnalysisStore;
use crate::errors::AppError;
use crate::llm_client::{ChatSession, ChatTransport};
use crate::models::analysis::{AnalysisRow, NewAnalysis};

/// Generated texts for one analysis, as returned to the caller. Built from
/// the in-memory responses, never read back from the stored row.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimized_resume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
}

/// A completed pipeline run: the response payload plus the persisted row.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    pub record: AnalysisRow,
}

/// Full pipeline: extract → generate → persist → respond.
pub async fn run_analysis(
    store: &dyn AnalysisStore,
    transport: &dyn ChatTransport,
    prompt_set: PromptSet,
    document: &[u8],
    job_description: &str,
) -> Result<AnalysisOutcome, AppError> {
    let resume_text = extract_resume_text(document)?;
    info!("Extracted {} chars of resume text", resume_text.len());

    analyze_text(store, transport, prompt_set, resume_text, job_description).await
}

async fn analyze_text(
    store: &dyn AnalysisStore,
    transport: &dyn ChatTransport,
    prompt_set: PromptSet,
    resume_text: String,
    job_description: &str,
) -> Result<AnalysisOutcome, AppError> {
    let result = run_generation(transport, prompt_set, &resume_text, job_description).await?;

    let record = store
        .insert(NewAnalysis {
            resume_text,
            job_description: job_description.to_string(),
            feedback: result.feedback.clone(),
            optimized_resume: result.optimized_resume.clone(),
            cover_letter: result.cover_letter.clone(),
        })
        .await?;

    info!("Stored analysis {}", record.id);

    Ok(AnalysisOutcome { result, record })
}

/// Generation only: sends each prompt in order through one chat session and
/// binds every reply to its slot. Any send failure aborts the run and the
/// partial replies are discarded.
pub async fn run_generation(
    transport: &dyn ChatTransport,
    prompt_set: PromptSet,
    resume_text: &str,
    job_description: &str,
) -> Result<AnalysisResult, AppError> {
    let prompts = build_prompts(prompt_set, resume_text, job_description);

    let mut session = ChatSession::new(transport, ANALYSIS_SYSTEM);
    let mut feedback = None;
    let mut optimized_resume = None;
    let mut cover_letter = None;

    for prompt in &prompts {
        let reply = session.send(&prompt.text).await?;
        match prompt.slot {
            Slot::Feedback => feedback = Some(reply),
            Slot::OptimizedResume => optimized_resume = Some(reply),
            Slot::CoverLetter => cover_letter = Some(reply),
        }
    }

    // Every prompt set opens with a feedback prompt.
    let feedback = feedback.ok_or_else(|| {
        AppError::Internal(anyhow::anyhow!("prompt set produced no feedback prompt"))
    })?;

    Ok(AnalysisResult {
        feedback,
        optimized_resume,
        cover_letter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::llm_client::{ChatMessage, LlmError};

    /// Replays a fixed script of replies and records the prompt of each call.
    struct ScriptedTransport {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        prompts_seen: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(replies: Vec<Result<String, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                prompts_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatTransport for ScriptedTransport {
        async fn complete(
            &self,
            _system: &str,
            messages: &[ChatMessage],
        ) -> Result<String, LlmError> {
            let prompt = messages.last().expect("at least one message").content.clone();
            self.prompts_seen.lock().unwrap().push(prompt);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("transport called more times than scripted")
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<AnalysisRow>>,
    }

    #[async_trait]
    impl AnalysisStore for MemoryStore {
        async fn insert(&self, new: NewAnalysis) -> Result<AnalysisRow, AppError> {
            let row = AnalysisRow {
                id: Uuid::new_v4(),
                resume_text: new.resume_text,
                job_description: new.job_description,
                feedback: new.feedback,
                optimized_resume: new.optimized_resume,
                cover_letter: new.cover_letter,
                created_at: Utc::now(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }

    fn ok(text: &str) -> Result<String, LlmError> {
        Ok(text.to_string())
    }

    #[tokio::test]
    async fn test_extended_generation_binds_slots_in_order() {
        let transport = ScriptedTransport::new(vec![
            ok("the feedback"),
            ok("the rewrite"),
            ok("the letter"),
        ]);

        let result = run_generation(&transport, PromptSet::Extended, "resume body", "backend role")
            .await
            .unwrap();

        assert_eq!(result.feedback, "the feedback");
        assert_eq!(result.optimized_resume.as_deref(), Some("the rewrite"));
        assert_eq!(result.cover_letter.as_deref(), Some("the letter"));

        let seen = transport.prompts_seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[1].contains("rewrite the following resume"));
        assert!(seen[2].contains("cover letter"));
    }

    #[tokio::test]
    async fn test_minimal_generation_leaves_optional_slots_empty() {
        let transport = ScriptedTransport::new(vec![ok("just feedback")]);

        let result = run_generation(&transport, PromptSet::Minimal, "resume body", "")
            .await
            .unwrap();

        assert_eq!(result.feedback, "just feedback");
        assert!(result.optimized_resume.is_none());
        assert!(result.cover_letter.is_none());
        assert_eq!(transport.prompts_seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_mid_session_persists_nothing() {
        let store = MemoryStore::default();
        let transport = ScriptedTransport::new(vec![
            ok("the feedback"),
            Err(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            }),
        ]);

        let err = analyze_text(
            &store,
            &transport,
            PromptSet::Extended,
            "resume body".to_string(),
            "backend role",
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::Llm(_)));
        assert!(store.rows.lock().unwrap().is_empty());
        // The third prompt was never sent.
        assert_eq!(transport.prompts_seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_success_round_trips_row_and_result() {
        let store = MemoryStore::default();
        let transport = ScriptedTransport::new(vec![ok("f"), ok("o"), ok("c")]);

        let outcome = analyze_text(
            &store,
            &transport,
            PromptSet::Extended,
            "Experienced engineer...".to_string(),
            "Backend role requiring Go",
        )
        .await
        .unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].resume_text, "Experienced engineer...");
        assert_eq!(rows[0].job_description, "Backend role requiring Go");
        assert_eq!(rows[0].feedback, outcome.result.feedback);
        assert_eq!(rows[0].optimized_resume, outcome.result.optimized_resume);
        assert_eq!(rows[0].cover_letter, outcome.result.cover_letter);
    }

    #[tokio::test]
    async fn test_malformed_document_never_reaches_model_or_store() {
        let store = MemoryStore::default();
        let transport = ScriptedTransport::new(vec![]);

        let err = run_analysis(&store, &transport, PromptSet::Minimal, b"not a pdf", "")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Document(_)));
        assert!(store.rows.lock().unwrap().is_empty());
        assert!(transport.prompts_seen.lock().unwrap().is_empty());
    }
}
