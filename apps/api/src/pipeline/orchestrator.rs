//! Pipeline orchestration — the two-phase job controller.
//!
//! Phase A persists the analyzed profile under an opaque job id; phase B
//! retrieves it and runs redact → adapt → audit, strictly in that order.
//! A repeated analyze call always creates a new independent job id; stored
//! profiles are never overwritten in place.

use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::extract::extract_text_from_upload;
use crate::pipeline::adapter;
use crate::pipeline::analyzer::{self, JobProfile};
use crate::pipeline::audit::AuditResult;
use crate::redaction::RedactionMapping;
use crate::state::AppState;
use crate::store::PendingJob;
use crate::tracking::{UsageTracker, ERROR_MARKER};

pub const ANALYZE_ENDPOINT: &str = "cv-boost/analyze_job";
pub const GENERATE_ENDPOINT: &str = "cv-boost/generate_cv/strict";

/// Result of the analysis phase.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeOutcome {
    pub job_id: String,
    pub extractor_json: JobProfile,
}

/// Input to the generation phase, decoded from the multipart request.
#[derive(Debug, Clone)]
pub struct GenerateCvInput {
    pub job_id: String,
    pub cv_filename: String,
    pub cv_content_type: Option<String>,
    pub cv_bytes: Bytes,
    /// Caller-confirmed keywords. When present they REPLACE the analyzer's
    /// list, they are not merged into it.
    pub confirm_keywords: Option<Vec<String>>,
    pub instructions: Option<String>,
}

/// The generation-phase response bundle.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateBundle {
    pub extractor_json: JobProfile,
    pub cv_markdown: String,
    pub postprocess_checks: AuditResult,
    pub obfuscation_mapping: RedactionMapping,
}

/// Phase A: analyze a job description, persist the profile, return the
/// opaque job id for the confirmation round-trip.
pub async fn analyze_job(
    state: &AppState,
    user_id: &str,
    job_description: &str,
    manual_keywords: &[String],
) -> Result<AnalyzeOutcome, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description is required".to_string(),
        ));
    }

    let tracker = UsageTracker::start();
    let result = run_analysis(state, job_description, manual_keywords).await;

    let outcome_text = match &result {
        Ok(outcome) => format!("job_id={}", outcome.job_id),
        Err(e) => format!("{ERROR_MARKER}{e}"),
    };
    tracker
        .log(
            state.usage.as_ref(),
            user_id,
            state.llm.model(),
            ANALYZE_ENDPOINT,
            outcome_text,
        )
        .await;

    result
}

async fn run_analysis(
    state: &AppState,
    job_description: &str,
    manual_keywords: &[String],
) -> Result<AnalyzeOutcome, AppError> {
    let mut profile = analyzer::analyze(job_description, &state.llm).await?;
    profile.merge_keywords(manual_keywords);

    // Fresh opaque id per analysis; concurrent analyses of the same posting
    // intentionally do not deduplicate.
    let job_id = Uuid::new_v4().simple().to_string();
    let pending = PendingJob {
        job_description: job_description.to_string(),
        extractor_json: profile.clone(),
    };
    state
        .jobs
        .create(&job_id, &pending)
        .await
        .map_err(AppError::Internal)?;

    info!(job_id = %job_id, parse_error = profile.is_parse_error(), "job analyzed");

    Ok(AnalyzeOutcome {
        job_id,
        extractor_json: profile,
    })
}

/// Phase B: load the persisted profile and run redact → adapt → audit.
///
/// Validation failures (unknown job id, unsupported upload, empty text)
/// surface before usage tracking starts; once the LLM is in play every
/// outcome, success or failure, leaves a usage record.
pub async fn generate_cv(
    state: &AppState,
    user_id: &str,
    input: GenerateCvInput,
) -> Result<GenerateBundle, AppError> {
    let pending = state
        .jobs
        .get(&input.job_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| {
            AppError::NotFound(format!("job '{}' not found or expired", input.job_id))
        })?;

    let mut profile = pending.extractor_json;
    if let Some(keywords) = input.confirm_keywords {
        profile.replace_keywords(keywords);
    }

    let original_text = extract_text_from_upload(
        &input.cv_filename,
        input.cv_content_type.as_deref(),
        input.cv_bytes,
        state.config.max_upload_bytes,
    )
    .await?;
    if original_text.trim().is_empty() {
        return Err(AppError::Validation(
            "CV is empty or no text could be extracted".to_string(),
        ));
    }

    let tracker = UsageTracker::start();
    let result = run_generation(state, profile, &original_text, input.instructions.as_deref()).await;

    let outcome_text = match &result {
        Ok(bundle) => bundle.cv_markdown.clone(),
        Err(e) => format!("{ERROR_MARKER}{e}"),
    };
    tracker
        .log(
            state.usage.as_ref(),
            user_id,
            state.llm.model(),
            GENERATE_ENDPOINT,
            outcome_text,
        )
        .await;

    result
}

async fn run_generation(
    state: &AppState,
    profile: JobProfile,
    original_text: &str,
    instructions: Option<&str>,
) -> Result<GenerateBundle, AppError> {
    // Redaction must precede the network call; the adapter only ever sees
    // the redacted text.
    let (redacted, mapping) = state.redactor.redact(original_text);
    info!(
        emails = mapping.emails.len(),
        phones = mapping.phones.len(),
        "CV redacted"
    );

    let cv_markdown = adapter::adapt(&redacted, &profile, instructions, &state.llm).await?;

    let checks = state.auditor.audit(original_text, &cv_markdown);
    if !checks.new_lines.is_empty() || !checks.suspicious_metrics.is_empty() {
        info!(
            new_lines = checks.new_lines.len(),
            suspicious_metrics = checks.suspicious_metrics.len(),
            "audit flagged generated content"
        );
    }

    Ok(GenerateBundle {
        extractor_json: profile,
        cv_markdown,
        postprocess_checks: checks,
        obfuscation_mapping: mapping,
    })
}
