use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pipeline::audit::ContentAuditor;
use crate::redaction::Redactor;
use crate::store::JobStore;
use crate::tracking::UsageSink;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every component is constructed once at startup; tests build
/// the same state around fake store/sink/backend implementations.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Pending-job persistence between the analyze and generate phases.
    pub jobs: Arc<dyn JobStore>,
    pub usage: Arc<dyn UsageSink>,
    pub redactor: Redactor,
    pub auditor: ContentAuditor,
    pub config: Config,
}
