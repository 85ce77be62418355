//! Tolerant extraction of JSON from generation-model text.

use serde_json::Value;

const FENCE: &str = "```";

/// Parses model output that may be wrapped in a markdown code fence, with or without a language
/// tag. Returns `None` when the remaining text is not strict JSON.
pub fn parse_model_json(raw: &str) -> Option<Value> {
	serde_json::from_str(strip_code_fence(raw)).ok()
}

fn strip_code_fence(raw: &str) -> &str {
	let mut text = raw.trim();

	if let Some(rest) = text.strip_prefix(FENCE) {
		// The language tag, if any, runs to the end of the opening line.
		text = match rest.find('\n') {
			Some(newline) => &rest[newline + 1..],
			None => strip_inline_tag(rest),
		};
	}
	if let Some(rest) = text.trim_end().strip_suffix(FENCE) {
		text = rest;
	}

	text.trim()
}

/// Drops a language tag written on the same line as the payload, as in "```json{...}```". A word
/// that runs straight into the closing fence is the payload itself.
fn strip_inline_tag(rest: &str) -> &str {
	let tag_end = rest.find(|c: char| !c.is_ascii_alphanumeric()).unwrap_or(rest.len());

	match rest[tag_end..].chars().next() {
		Some(next) if tag_end > 0 && (next.is_whitespace() || next == '{' || next == '[') =>
			&rest[tag_end..],
		_ => rest,
	}
}
