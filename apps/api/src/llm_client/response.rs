//! Defensive extraction of generated text from an untrusted completion
//! response. Library and proxy drift means the shape cannot be assumed, so
//! extraction is an ordered list of shape strategies (first success wins)
//! with a stringified dump as the last resort. Shape mismatches never error;
//! only the transport layer can fail a call.

use serde_json::Value;
use tracing::{debug, warn};

type Strategy = fn(&Value) -> Option<String>;

/// Extraction strategies in priority order.
const STRATEGIES: &[(&str, Strategy)] = &[
    ("choices[0].message.content", choice_message_content),
    ("choices[0].message.text", choice_message_text),
    ("choices[0].text", choice_text),
    ("content", top_level_content),
];

fn first_choice(raw: &Value) -> Option<&Value> {
    raw.get("choices")?.get(0)
}

fn choice_message_content(raw: &Value) -> Option<String> {
    first_choice(raw)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_owned)
}

fn choice_message_text(raw: &Value) -> Option<String> {
    first_choice(raw)?
        .get("message")?
        .get("text")?
        .as_str()
        .map(str::to_owned)
}

/// Legacy completions shape.
fn choice_text(raw: &Value) -> Option<String> {
    first_choice(raw)?.get("text")?.as_str().map(str::to_owned)
}

fn top_level_content(raw: &Value) -> Option<String> {
    raw.get("content")?.as_str().map(str::to_owned)
}

/// Pulls the generated text out of a raw completion response.
/// Falls back to dumping the whole value when no strategy matches.
pub fn extract_content(raw: &Value) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(text) = strategy(raw) {
            debug!(strategy = *name, "extracted completion content");
            return text;
        }
    }

    warn!("completion response matched no known shape, returning raw dump");
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_standard_chat_shape() {
        let raw = json!({
            "choices": [{"message": {"role": "assistant", "content": "adapted CV"}}],
            "usage": {"total_tokens": 42}
        });
        assert_eq!(extract_content(&raw), "adapted CV");
    }

    #[test]
    fn test_message_text_shape() {
        let raw = json!({"choices": [{"message": {"text": "variant text"}}]});
        assert_eq!(extract_content(&raw), "variant text");
    }

    #[test]
    fn test_legacy_completions_shape() {
        let raw = json!({"choices": [{"text": "legacy text"}]});
        assert_eq!(extract_content(&raw), "legacy text");
    }

    #[test]
    fn test_top_level_content_shape() {
        let raw = json!({"content": "bare content"});
        assert_eq!(extract_content(&raw), "bare content");
    }

    #[test]
    fn test_unknown_shape_falls_back_to_dump() {
        let raw = json!({"surprise": {"nested": true}});
        let dumped = extract_content(&raw);
        assert!(dumped.contains("surprise"));
    }

    #[test]
    fn test_priority_order_prefers_message_content() {
        // Both message.content and choice.text present: message.content wins.
        let raw = json!({
            "choices": [{"message": {"content": "primary"}, "text": "secondary"}]
        });
        assert_eq!(extract_content(&raw), "primary");
    }

    #[test]
    fn test_non_string_content_skipped() {
        // content is an array of blocks, not a string — falls through to dump.
        let raw = json!({"choices": [{"message": {"content": [{"type": "text"}]}}]});
        let dumped = extract_content(&raw);
        assert!(dumped.contains("choices"));
    }
}
