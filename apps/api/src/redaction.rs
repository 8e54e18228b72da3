//! Personal-data redaction — strips emails and phone numbers from résumé
//! text before it is sent to any external service.
//!
//! ARCHITECTURAL RULE: résumé text MUST pass through `Redactor::redact`
//! before any network call. Job description text is not redacted; postings
//! are assumed to carry no candidate personal data.

use regex::Regex;
use serde::{Deserialize, Serialize};

pub const EMAIL_PLACEHOLDER: &str = "[EMAIL_REDACTED]";
pub const PHONE_PLACEHOLDER: &str = "[PHONE_REDACTED]";

/// Original substrings removed from a text, in encounter order per category.
/// Positionally reversible: the Nth placeholder of a category corresponds to
/// the Nth entry of its list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactionMapping {
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

impl RedactionMapping {
    pub fn total(&self) -> usize {
        self.emails.len() + self.phones.len()
    }
}

/// Scans text for personally identifying substrings and replaces them with
/// fixed placeholder tokens.
#[derive(Debug, Clone)]
pub struct Redactor {
    email_re: Regex,
    phone_re: Regex,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor {
    pub fn new() -> Self {
        Self {
            email_re: Regex::new(r"[A-Za-z0-9_.+-]+@[A-Za-z0-9-]+\.[A-Za-z0-9\-.]+")
                .expect("invalid email pattern"),
            phone_re: Regex::new(r"\+?\d{7,15}").expect("invalid phone pattern"),
        }
    }

    /// Replaces emails and phone numbers with placeholders and returns the
    /// redacted text plus the reversible mapping.
    ///
    /// Emails are replaced first; the phone pass runs on the already
    /// email-redacted text, so digit runs inside a replaced email can never
    /// be re-matched. Pure transformation, no side effects.
    pub fn redact(&self, text: &str) -> (String, RedactionMapping) {
        let mut mapping = RedactionMapping::default();

        let emails_pass = self.email_re.replace_all(text, |caps: &regex::Captures| {
            mapping.emails.push(caps[0].to_string());
            EMAIL_PLACEHOLDER
        });

        let phones_pass = self
            .phone_re
            .replace_all(&emails_pass, |caps: &regex::Captures| {
                mapping.phones.push(caps[0].to_string());
                PHONE_PLACEHOLDER
            });

        (phones_pass.into_owned(), mapping)
    }

    /// Reapplies a mapping to a redacted text, substituting each placeholder
    /// with the original substring at the same ordinal position.
    pub fn restore(&self, redacted: &str, mapping: &RedactionMapping) -> String {
        let mut text = redacted.to_string();
        for email in &mapping.emails {
            text = text.replacen(EMAIL_PLACEHOLDER, email, 1);
        }
        for phone in &mapping.phones {
            text = text.replacen(PHONE_PLACEHOLDER, phone, 1);
        }
        text
    }
}
