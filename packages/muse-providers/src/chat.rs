use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use muse_config::ChatProviderConfig;

use crate::{Error, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
	pub prompt: String,
	#[serde(default)]
	pub system_prompt: Option<String>,
	#[serde(default)]
	pub temperature: Option<f32>,
	#[serde(default)]
	pub max_output_tokens: Option<u32>,
	#[serde(default)]
	pub model: Option<String>,
}
impl ChatRequest {
	pub fn new(prompt: impl Into<String>) -> Self {
		Self { prompt: prompt.into(), ..Default::default() }
	}

	pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
		self.system_prompt = Some(system_prompt.into());

		self
	}

	/// The model the request resolves to once provider defaults are applied.
	pub fn resolved_model<'a>(&'a self, cfg: &'a ChatProviderConfig) -> &'a str {
		self.model.as_deref().filter(|model| !model.trim().is_empty()).unwrap_or(&cfg.model)
	}
}

/// Sends one generate-text request and returns the first candidate's raw text.
pub async fn generate(
	client: &Client,
	cfg: &ChatProviderConfig,
	req: &ChatRequest,
) -> Result<String> {
	let body = request_body(cfg, req);
	let res = crate::post(
		client,
		&cfg.api_base,
		&cfg.path,
		cfg.timeout_ms,
		crate::auth_headers(&cfg.api_key, &cfg.default_headers)?,
	)
	.json(&body)
	.send()
	.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_chat_text(&json)
}

fn request_body(cfg: &ChatProviderConfig, req: &ChatRequest) -> Value {
	let temperature =
		req.temperature.filter(|t| t.is_finite()).unwrap_or(cfg.temperature).clamp(0.0, 1.0);
	let max_output_tokens =
		req.max_output_tokens.filter(|n| *n > 0).unwrap_or(cfg.max_output_tokens);
	let mut body = serde_json::json!({
		"prompt": req.prompt,
		"temperature": temperature,
		"maxOutputTokens": max_output_tokens,
		"model": req.resolved_model(cfg),
	});

	if let Some(system_prompt) = req.system_prompt.as_deref().filter(|s| !s.trim().is_empty()) {
		body["systemPrompt"] = Value::String(system_prompt.to_string());
	}

	body
}

fn parse_chat_text(json: &Value) -> Result<String> {
	let first = json.get("candidates").and_then(|v| v.as_array()).and_then(|arr| arr.first());

	if let Some(candidate) = first {
		let text = candidate.get("text").and_then(|t| t.as_str()).or_else(|| {
			candidate
				.get("content")
				.and_then(|c| c.get("parts"))
				.and_then(|p| p.as_array())
				.and_then(|parts| parts.first())
				.and_then(|part| part.get("text"))
				.and_then(|t| t.as_str())
		});

		return text
			.map(str::to_string)
			.ok_or_else(|| Error::invalid_response("Chat candidate is missing text."));
	}

	json.get("text")
		.and_then(|t| t.as_str())
		.map(str::to_string)
		.ok_or_else(|| Error::invalid_response("Chat response is missing candidates."))
}
