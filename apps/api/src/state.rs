use std::sync::Arc;

use crate::analysis::store::AnalysisStore;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for completed analyses. Insert-only.
    pub store: Arc<dyn AnalysisStore>,
    pub llm: LlmClient,
    pub config: Config,
}
