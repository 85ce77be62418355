use reqwest::Client;
use serde_json::Value;

use muse_config::EmbeddingProviderConfig;

use crate::{Error, Result};

pub async fn embed(
	client: &Client,
	cfg: &EmbeddingProviderConfig,
	content: &str,
) -> Result<Vec<f32>> {
	let body = serde_json::json!({ "content": content, "model": cfg.model });
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

	parse_embedding_response(json)
}

fn parse_embedding_response(json: Value) -> Result<Vec<f32>> {
	let values = json
		.get("vector")
		.or_else(|| json.get("embedding"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::invalid_response("Embedding response is missing vector array."))?;
	let mut vec = Vec::with_capacity(values.len());

	for value in values {
		let number = value
			.as_f64()
			.ok_or_else(|| Error::invalid_response("Embedding value must be numeric."))?;

		vec.push(number as f32);
	}

	if vec.is_empty() {
		return Err(Error::invalid_response("Embedding vector is empty."));
	}

	Ok(vec)
}
