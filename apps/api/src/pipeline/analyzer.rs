//! Job Analyzer — extracts a structured hiring profile from a raw job
//! description via the LLM, tolerating malformed model output.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::llm_client::{ChatMessage, LlmClient};
use crate::pipeline::prompts::{ANALYZE_PROMPT_TEMPLATE, ANALYZE_SYSTEM};

const ANALYZE_MAX_TOKENS: u32 = 1000;
/// Extraction must be deterministic.
const ANALYZE_TEMPERATURE: f32 = 0.0;

pub const PARSE_ERROR: &str = "parse_error";

/// Seniority level extracted from a posting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Seniority {
    Junior,
    Mid,
    Senior,
    Lead,
    #[default]
    Unknown,
}

/// A technology named by the posting, with extraction confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyEntry {
    pub name: String,
    #[serde(default)]
    pub confidence: f32,
}

/// Structured extraction of a job posting. Every field defaults so a
/// partially-shaped model reply still produces a usable profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub seniority: Seniority,
    #[serde(default)]
    pub technologies: Vec<TechnologyEntry>,
    #[serde(default)]
    pub hard_skills: Vec<String>,
    #[serde(default)]
    pub soft_skills: Vec<String>,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub preferred: Vec<String>,
    #[serde(default)]
    pub keywords_ats: Vec<String>,
    #[serde(default)]
    pub suggested_sections: Vec<String>,
    #[serde(default)]
    pub confidence: f32,
}

/// A job profile: either the parsed extraction, or the sentinel kept when
/// the model reply was not valid JSON. Callers must check for the sentinel.
///
/// Untagged, sentinel first: `ProfileData` accepts any object because all
/// its fields default, so the `{error, raw}` shape has to be tried before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobProfile {
    ParseError { error: String, raw: String },
    Parsed(ProfileData),
}

impl JobProfile {
    pub fn parse_error(raw: impl Into<String>) -> Self {
        JobProfile::ParseError {
            error: PARSE_ERROR.to_string(),
            raw: raw.into(),
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self, JobProfile::ParseError { .. })
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            JobProfile::Parsed(data) => &data.keywords_ats,
            JobProfile::ParseError { .. } => &[],
        }
    }

    /// Merges manually supplied keywords ahead of the analyzer's, removing
    /// duplicates by first occurrence. No-op on the sentinel shape.
    pub fn merge_keywords(&mut self, manual: &[String]) {
        if let JobProfile::Parsed(data) = self {
            let mut merged = manual.to_vec();
            merged.append(&mut data.keywords_ats);
            data.keywords_ats = dedup_first(merged);
        }
    }

    /// Replaces the keyword list outright (caller-confirmed keywords win
    /// over the analyzer's). No-op on the sentinel shape.
    pub fn replace_keywords(&mut self, keywords: Vec<String>) {
        if let JobProfile::Parsed(data) = self {
            data.keywords_ats = dedup_first(keywords);
        }
    }
}

/// Removes duplicates while preserving the first occurrence of each entry.
fn dedup_first(keywords: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    keywords
        .into_iter()
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Analyzes a job description into a structured profile.
///
/// Never fails for malformed model output — that degrades to the
/// `parse_error` sentinel. Only transport and configuration errors surface.
pub async fn analyze(job_text: &str, llm: &LlmClient) -> Result<JobProfile, AppError> {
    let prompt = ANALYZE_PROMPT_TEMPLATE.replace("{job_text}", job_text);
    let messages = [ChatMessage::system(ANALYZE_SYSTEM), ChatMessage::user(prompt)];

    let reply = llm
        .call_chat(&messages, ANALYZE_MAX_TOKENS, ANALYZE_TEMPERATURE)
        .await?;

    Ok(parse_profile(&reply))
}

/// Parses a model reply into a profile: direct parse first, then the first
/// top-level brace-delimited block, then the sentinel.
pub fn parse_profile(reply: &str) -> JobProfile {
    let candidate = strip_json_fences(reply);

    if let Ok(data) = serde_json::from_str::<ProfileData>(candidate) {
        return JobProfile::Parsed(data);
    }

    if let Some(block) = first_brace_block(candidate) {
        if let Ok(data) = serde_json::from_str::<ProfileData>(block) {
            return JobProfile::Parsed(data);
        }
    }

    JobProfile::parse_error(reply)
}

/// Returns the first balanced top-level `{...}` block in the text, skipping
/// braces inside string literals.
fn first_brace_block(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{ChatCompletions, LlmError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;

    const WELL_FORMED: &str = r#"{
        "role": "Backend Engineer",
        "seniority": "senior",
        "technologies": [{"name": "Python", "confidence": 0.95}],
        "hard_skills": ["API design"],
        "soft_skills": ["communication"],
        "required": ["5+ years backend"],
        "preferred": ["Kubernetes"],
        "keywords_ats": ["Python", "PostgreSQL"],
        "suggested_sections": ["Profile", "Experience"],
        "confidence": 0.9
    }"#;

    #[test]
    fn test_parse_well_formed_profile() {
        let profile = parse_profile(WELL_FORMED);
        match profile {
            JobProfile::Parsed(data) => {
                assert_eq!(data.role, "Backend Engineer");
                assert_eq!(data.seniority, Seniority::Senior);
                assert_eq!(data.technologies[0].name, "Python");
                assert_eq!(data.keywords_ats, vec!["Python", "PostgreSQL"]);
            }
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{WELL_FORMED}\n```");
        assert!(!parse_profile(&fenced).is_parse_error());
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let chatty = format!("Sure! Here is the extraction you asked for:\n{WELL_FORMED}\nHope that helps.");
        let profile = parse_profile(&chatty);
        match profile {
            JobProfile::Parsed(data) => assert_eq!(data.role, "Backend Engineer"),
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_degrades_to_sentinel() {
        let profile = parse_profile("I cannot help with that.");
        match &profile {
            JobProfile::ParseError { error, raw } => {
                assert_eq!(error, PARSE_ERROR);
                assert_eq!(raw, "I cannot help with that.");
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn test_partial_profile_fields_default() {
        let profile = parse_profile(r#"{"role": "DevOps Engineer"}"#);
        match profile {
            JobProfile::Parsed(data) => {
                assert_eq!(data.role, "DevOps Engineer");
                assert_eq!(data.seniority, Seniority::Unknown);
                assert!(data.keywords_ats.is_empty());
            }
            other => panic!("expected Parsed, got {other:?}"),
        }
    }

    #[test]
    fn test_sentinel_serde_shape() {
        let profile = JobProfile::parse_error("raw reply");
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value, json!({"error": "parse_error", "raw": "raw reply"}));

        // And the sentinel shape round-trips through the untagged enum.
        let back: JobProfile = serde_json::from_value(value).unwrap();
        assert!(back.is_parse_error());
    }

    #[test]
    fn test_merge_keywords_manual_first_dedup() {
        let mut profile = parse_profile(WELL_FORMED);
        profile.merge_keywords(&["Django".to_string(), "Python".to_string()]);
        assert_eq!(profile.keywords(), ["Django", "Python", "PostgreSQL"]);
    }

    #[test]
    fn test_replace_keywords_is_full_replacement() {
        let mut profile = parse_profile(WELL_FORMED);
        profile.replace_keywords(vec![
            "Rust".to_string(),
            "Tokio".to_string(),
            "Rust".to_string(),
        ]);
        assert_eq!(profile.keywords(), ["Rust", "Tokio"]);
    }

    #[test]
    fn test_merge_on_sentinel_is_noop() {
        let mut profile = JobProfile::parse_error("oops");
        profile.merge_keywords(&["Python".to_string()]);
        assert!(profile.is_parse_error());
        assert!(profile.keywords().is_empty());
    }

    #[test]
    fn test_first_brace_block_ignores_braces_in_strings() {
        let text = r#"note {"role": "Engineer {backend}", "confidence": 1.0} trailing"#;
        let block = first_brace_block(text).unwrap();
        assert!(serde_json::from_str::<ProfileData>(block).is_ok());
    }

    struct CannedBackend(serde_json::Value);

    #[async_trait]
    impl ChatCompletions for CannedBackend {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<serde_json::Value, LlmError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_analyze_returns_profile_with_posting_keywords() {
        let raw = json!({
            "choices": [{"message": {"content": WELL_FORMED}}]
        });
        let llm = LlmClient::with_backend(Arc::new(CannedBackend(raw)), "openrouter/auto");

        let profile = analyze("Senior backend engineer, Python, PostgreSQL", &llm)
            .await
            .unwrap();

        let keywords: Vec<String> = profile
            .keywords()
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        assert!(keywords.contains(&"python".to_string()));
        assert!(keywords.contains(&"postgresql".to_string()));
    }

    #[tokio::test]
    async fn test_analyze_never_errors_on_malformed_reply() {
        let raw = json!({"choices": [{"message": {"content": "not json"}}]});
        let llm = LlmClient::with_backend(Arc::new(CannedBackend(raw)), "openrouter/auto");

        let profile = analyze("any posting", &llm).await.unwrap();
        assert!(profile.is_parse_error());
    }
}
