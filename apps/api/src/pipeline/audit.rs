//! Content audit — flags generated content with no traceable basis in the
//! source CV. A heuristic surfaced for human judgement: false positives are
//! expected and nothing here ever rejects a document.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Generated lines below this length are treated as formatting noise.
const MIN_CLAIM_CHARS: usize = 10;

/// Audit findings: lines of the generated document absent from the source,
/// and numeric/percentage tokens that appear only in the generated text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub new_lines: Vec<String>,
    pub suspicious_metrics: Vec<String>,
}

/// Compares a generated document against the source it was adapted from.
#[derive(Debug, Clone)]
pub struct ContentAuditor {
    percent_re: Regex,
    number_re: Regex,
}

impl Default for ContentAuditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentAuditor {
    pub fn new() -> Self {
        Self {
            percent_re: Regex::new(r"\b\d{1,3}\s?%").expect("invalid percent pattern"),
            // Years and plain figures; deliberately coarse.
            number_re: Regex::new(r"\b\d{2,4}\b").expect("invalid number pattern"),
        }
    }

    /// Flags generated lines and metric tokens absent from the original.
    ///
    /// Lines are compared trimmed; markdown headers and short fragments are
    /// dropped from the report. Metric comparison is set-based, so a token
    /// anywhere in the original clears every occurrence in the output.
    pub fn audit(&self, original: &str, generated: &str) -> AuditResult {
        let original_lines: HashSet<&str> = original
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let new_lines = generated
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .filter(|l| !original_lines.contains(l))
            .filter(|l| !l.starts_with('#') && l.chars().count() >= MIN_CLAIM_CHARS)
            .map(str::to_owned)
            .collect();

        let original_metrics = self.metric_tokens(original);
        let suspicious_metrics = self
            .metric_tokens(generated)
            .into_iter()
            .filter(|m| !original_metrics.contains(m))
            .collect();

        AuditResult {
            new_lines,
            suspicious_metrics,
        }
    }

    /// Every percentage and bare 2-4 digit token in the text.
    /// BTreeSet keeps the report order stable.
    fn metric_tokens(&self, text: &str) -> BTreeSet<String> {
        self.percent_re
            .find_iter(text)
            .chain(self.number_re.find_iter(text))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
