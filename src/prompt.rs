//! Voice prompt attributes and their text rendering for the TTS service.
//!
//! A prompt is an ordered set of named attributes (identity, affect, tone, ...).
//! The TTS service receives them as one block of text:
//!
//! ```text
//! Identity: A professional speaker
//!
//! Affect: Authoritative and friendly
//! ```

use serde_json::{Map, Value};

/// Prompt attributes in caller order. Backed by serde_json's order-preserving map.
pub type Prompt = Map<String, Value>;

const DEFAULT_PROMPT: [(&str, &str); 6] = [
    ("identity", "A professional speaker"),
    (
        "affect",
        "Authoritative and friendly, displaying a wise and measured tone",
    ),
    (
        "tone",
        "Professional and formal, easy to understand and acceptable",
    ),
    (
        "emotion",
        "Confident and inspiring, conveying messages clearly",
    ),
    ("pronunciation", "Clear and precise, with good articulation"),
    (
        "pause",
        "Strategic pauses for emphasis and to give listeners time to digest key points",
    ),
];

/// Prompt shown pre-filled on the index page.
pub fn default_prompt() -> Prompt {
    DEFAULT_PROMPT
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

/// Render attributes as `Key: value` lines separated by a blank line.
///
/// Order is kept as supplied. Only the first character of each key is
/// uppercased; the rest of the key is left untouched.
pub fn render_prompt(prompt: &Prompt) -> String {
    prompt
        .iter()
        .map(|(key, value)| format!("{}: {}", capitalize(key), value_text(value)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
