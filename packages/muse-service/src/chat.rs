use std::time::Instant;

use serde_json::Value;

use muse_providers::{chat::ChatRequest, response};

use crate::{MuseService, UsageLogEntry};

impl MuseService {
	/// Raw first-candidate text, or `None` when the call fails.
	pub async fn generate_text(&self, req: &ChatRequest, user_id: Option<&str>) -> Option<String> {
		let cfg = &self.cfg.providers.chat;
		let started = Instant::now();
		let result = self.providers.chat.generate(cfg, req).await;
		let mut chars = req.prompt.chars().count();

		if let Ok(text) = &result {
			chars += text.chars().count();
		}

		self.record_usage(
			UsageLogEntry::new("generate_text", req.resolved_model(cfg), started.elapsed())
				.with_user(user_id)
				.with_token_estimate(crate::estimate_tokens(chars))
				.with_cached(false),
		);

		match result {
			Ok(text) => Some(text),
			Err(err) => {
				tracing::warn!(error = %err, "Text generation failed.");

				None
			},
		}
	}

	/// Generates text and parses it as JSON, tolerating a Markdown code fence around it.
	pub async fn generate_structured(
		&self,
		req: &ChatRequest,
		user_id: Option<&str>,
	) -> Option<Value> {
		let text = self.generate_text(req, user_id).await?;
		let parsed = response::parse_model_json(&text);

		if parsed.is_none() {
			tracing::warn!(chars = text.chars().count(), "Model output is not valid JSON.");
		}

		parsed
	}
}
