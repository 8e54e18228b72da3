//! Axum route handlers for the CV-boost API.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Form, Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::errors::AppError;
use crate::pipeline::analyzer::JobProfile;
use crate::pipeline::orchestrator::{analyze_job, generate_cv, GenerateBundle, GenerateCvInput};
use crate::pipeline::prompts::ANALYZE_CONFIRM_MESSAGE;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeJobForm {
    pub job_description: String,
    /// Optional comma-separated manual keywords, merged ahead of the
    /// analyzer's list.
    pub keywords: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeJobResponse {
    pub job_id: String,
    pub extractor_json: JobProfile,
    pub message: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /cv-boost/analyze_job
///
/// Phase A: analyzes the posting and returns the profile plus the job id
/// the client must echo back on the generate call once keywords are
/// confirmed.
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Form(form): Form<AnalyzeJobForm>,
) -> Result<(StatusCode, Json<AnalyzeJobResponse>), AppError> {
    let manual_keywords = split_keywords(form.keywords.as_deref());
    let outcome = analyze_job(&state, &user.0, &form.job_description, &manual_keywords).await?;

    Ok((
        StatusCode::CREATED,
        Json(AnalyzeJobResponse {
            job_id: outcome.job_id,
            extractor_json: outcome.extractor_json,
            message: ANALYZE_CONFIRM_MESSAGE,
        }),
    ))
}

/// POST /cv-boost/generate_cv/strict
///
/// Phase B: multipart request carrying `job_id`, the `cv` file (PDF or
/// Markdown), optional `confirm_keywords`, and optional free-form
/// `instructions` for the adapter.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    multipart: Multipart,
) -> Result<Json<GenerateBundle>, AppError> {
    let input = decode_generate_request(multipart).await?;
    let bundle = generate_cv(&state, &user.0, input).await?;
    Ok(Json(bundle))
}

// ────────────────────────────────────────────────────────────────────────────
// Multipart decoding
// ────────────────────────────────────────────────────────────────────────────

struct UploadedCv {
    filename: String,
    content_type: Option<String>,
    bytes: Bytes,
}

async fn decode_generate_request(mut multipart: Multipart) -> Result<GenerateCvInput, AppError> {
    let mut job_id: Option<String> = None;
    let mut cv: Option<UploadedCv> = None;
    let mut confirm_keywords: Option<String> = None;
    let mut instructions: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_id" => job_id = Some(read_text(field).await?),
            "cv" => {
                let filename = field.file_name().unwrap_or("cv").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("could not read cv field: {e}")))?;
                cv = Some(UploadedCv {
                    filename,
                    content_type,
                    bytes,
                });
            }
            "confirm_keywords" => confirm_keywords = Some(read_text(field).await?),
            "instructions" => instructions = Some(read_text(field).await?),
            // Unknown fields are ignored, matching lenient form handling.
            _ => {}
        }
    }

    let job_id = job_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_id field is required".to_string()))?;
    let cv = cv.ok_or_else(|| AppError::Validation("cv file field is required".to_string()))?;

    let confirm_keywords = confirm_keywords
        .as_deref()
        .map(|raw| split_keywords(Some(raw)))
        .filter(|keywords| !keywords.is_empty());
    let instructions = instructions.filter(|i| !i.trim().is_empty());

    Ok(GenerateCvInput {
        job_id: job_id.trim().to_string(),
        cv_filename: cv.filename,
        cv_content_type: cv.content_type,
        cv_bytes: cv.bytes,
        confirm_keywords,
        instructions,
    })
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or("field").to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("could not read {name} field: {e}")))
}

/// Splits a comma-separated keyword string, trimming and dropping blanks.
pub fn split_keywords(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keywords_trims_and_drops_blanks() {
        let keywords = split_keywords(Some(" Python , PostgreSQL ,, , REST"));
        assert_eq!(keywords, vec!["Python", "PostgreSQL", "REST"]);
    }

    #[test]
    fn test_split_keywords_none_is_empty() {
        assert!(split_keywords(None).is_empty());
        assert!(split_keywords(Some("")).is_empty());
        assert!(split_keywords(Some("  ,  ")).is_empty());
    }
}
