//! CV Adapter — rewrites the redacted CV for a specific job profile via the
//! LLM. Returns the model's Markdown untouched; auditing the result is the
//! content auditor's job, not this module's.

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient};
use crate::pipeline::analyzer::JobProfile;
use crate::pipeline::guidance::{role_guidance, technology_hints};
use crate::pipeline::prompts::{ADAPT_PROMPT_TEMPLATE, ADAPT_SYSTEM};

const ADAPT_MAX_TOKENS: u32 = 1500;
const ADAPT_TEMPERATURE: f32 = 0.2;

/// Adapts the redacted CV text to the job profile.
///
/// The CV text MUST already be redacted — this function sends it to the
/// external LLM endpoint verbatim.
pub async fn adapt(
    redacted_cv: &str,
    profile: &JobProfile,
    custom_instructions: Option<&str>,
    llm: &LlmClient,
) -> Result<String, AppError> {
    let system = build_system_prompt(profile, custom_instructions);

    let profile_json = serde_json::to_string_pretty(profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    let keywords = match profile.keywords() {
        [] => "None".to_string(),
        keywords => keywords.join(", "),
    };

    let prompt = ADAPT_PROMPT_TEMPLATE
        .replace("{cv_text}", redacted_cv)
        .replace("{profile_json}", &profile_json)
        .replace("{keywords}", &keywords);

    let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];

    let markdown = llm
        .call_chat(&messages, ADAPT_MAX_TOKENS, ADAPT_TEMPERATURE)
        .await?;
    Ok(markdown)
}

/// Assembles the system prompt: base contract, then role/seniority guidance,
/// then technology-mapping hints, then caller-supplied instructions.
fn build_system_prompt(profile: &JobProfile, custom_instructions: Option<&str>) -> String {
    let mut system = ADAPT_SYSTEM.to_string();

    let guidance = role_guidance(profile);
    if !guidance.is_empty() {
        system.push_str("\n\n");
        system.push_str(&guidance);
    }

    let hints = technology_hints(profile);
    if !hints.is_empty() {
        system.push_str("\n\n");
        system.push_str(&hints);
    }

    if let Some(instructions) = custom_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        system.push_str("\n\nADDITIONAL CALLER INSTRUCTIONS:\n");
        system.push_str(instructions);
    }

    system
}
