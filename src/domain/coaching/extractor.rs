//! Cleaning and JSON extraction for raw model output.

use serde_json::Value;
use thiserror::Error;

/// Longest model reply we are willing to store (100KB).
pub const MAX_RESPONSE_LENGTH: usize = 100_000;

/// Errors raised while sanitizing model text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SanitizationError {
    #[error("Response too long: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

const INJECTION_MARKERS: [&str; 11] = [
    "```system",
    "```assistant",
    "[INST]",
    "[/INST]",
    "<|system|>",
    "<|assistant|>",
    "<|user|>",
    "<|im_start|>",
    "<|im_end|>",
    "<<SYS>>",
    "<</SYS>>",
];

/// Cleans free text from the model before it enters the transcript.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseSanitizer;

impl ResponseSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects oversized text, drops control characters other than
    /// newline/tab/CR, strips role markers and trims the result.
    pub fn sanitize(&self, text: &str) -> Result<String, SanitizationError> {
        if text.len() > MAX_RESPONSE_LENGTH {
            return Err(SanitizationError::TooLong {
                max: MAX_RESPONSE_LENGTH,
                actual: text.len(),
            });
        }

        let mut cleaned: String = text
            .chars()
            .filter(|c| !c.is_control() || matches!(c, '\n' | '\t' | '\r'))
            .collect();

        for marker in INJECTION_MARKERS {
            cleaned = cleaned.replace(marker, "");
        }

        Ok(cleaned.trim().to_string())
    }
}

/// Finds the first JSON value embedded in model output.
///
/// A fenced ```` ```json ```` block wins if it parses. Otherwise every `{`
/// or `[` is tried in order and the first position from which a complete
/// value parses is returned; anything after that value is ignored.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Some(value) = fenced_json(text) {
        return Some(value);
    }

    text.char_indices()
        .filter(|(_, c)| *c == '{' || *c == '[')
        .find_map(|(i, _)| first_value_at(&text[i..]))
}

fn fenced_json(text: &str) -> Option<Value> {
    let mut rest = text;
    while let Some(start) = rest.find("```json") {
        let body = &rest[start + "```json".len()..];
        let end = body.find("```")?;
        if let Ok(value) = serde_json::from_str::<Value>(body[..end].trim()) {
            return Some(value);
        }
        rest = &body[end + 3..];
    }
    None
}

fn first_value_at(slice: &str) -> Option<Value> {
    let mut stream = serde_json::Deserializer::from_str(slice).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) if value.is_object() || value.is_array() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn sanitize_strips_control_chars_and_markers() {
        let s = ResponseSanitizer::new();
        let out = s.sanitize("  Hello\u{0007} <|im_start|>world\n ").unwrap();
        assert_eq!(out, "Hello world");
    }

    #[test]
    fn sanitize_rejects_oversized_text() {
        let big = "a".repeat(MAX_RESPONSE_LENGTH + 1);
        assert!(matches!(
            ResponseSanitizer::new().sanitize(&big),
            Err(SanitizationError::TooLong { .. })
        ));
    }

    #[test]
    fn extracts_fenced_json_block() {
        let text = "Sure!\n```json\n{\"status\": \"no_errors\"}\n```\nDone.";
        assert_eq!(extract_json(text), Some(json!({"status": "no_errors"})));
    }

    #[test]
    fn skips_broken_fence_and_falls_back_to_scan() {
        let text = "```json\n{oops\n```\nthen {\"a\": 1}";
        assert_eq!(extract_json(text), Some(json!({"a": 1})));
    }

    #[test]
    fn extracts_first_embedded_object_ignoring_trailing_text() {
        let text = "Here you go: {\"action\": \"ASK_QUESTION\"} hope that helps {\"b\": 2}";
        assert_eq!(extract_json(text), Some(json!({"action": "ASK_QUESTION"})));
    }

    #[test]
    fn skips_unparsable_brace_before_valid_array() {
        let text = "set {not json} then [1, 2]";
        assert_eq!(extract_json(text), Some(json!([1, 2])));
    }

    #[test]
    fn returns_none_without_json() {
        assert_eq!(extract_json("no structured data here"), None);
        assert_eq!(extract_json(""), None);
    }

    #[test]
    fn handles_multibyte_prefix() {
        let text = "Été ☀ {\"ok\": true}";
        assert_eq!(extract_json(text), Some(json!({"ok": true})));
    }

    proptest! {
        #[test]
        fn finds_object_after_arbitrary_prose(prose in "[a-zA-Z .,!?]{0,60}", n in 0i64..1000) {
            let text = format!("{} {{\"n\": {}}} trailing", prose, n);
            prop_assert_eq!(extract_json(&text), Some(json!({"n": n})));
        }

        #[test]
        fn never_panics_on_arbitrary_input(text in ".{0,200}") {
            let _ = extract_json(&text);
        }
    }
}
