//! Lenient parsing of JSON objects out of model responses.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref CODE_FENCE: Regex =
        Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid code fence regex");
}

/// Find a JSON object in `raw`. Accepts a bare object, an object inside a
/// fenced code block, an object surrounded by prose, and objects written
/// with single quotes.
pub fn parse_json_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    let body = CODE_FENCE
        .captures(trimmed)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    if let Some(object) = parse_object(body) {
        return Some(object);
    }

    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    let candidate = &body[start..=end];
    parse_object(candidate).or_else(|| parse_object(&candidate.replace('\'', "\"")))
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Flatten a JSON value into field text. Arrays become one item per line.
pub fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_text)
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Bool(_) | Value::Number(_) | Value::Object(_) => value.to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
