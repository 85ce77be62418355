use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use muse_config::SearchProviderConfig;
use muse_domain::EntityType;

use crate::Result;

/// Wire body of the semantic-search endpoint.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
	pub query: String,
	pub user_id: String,
	pub entity_types: Vec<EntityType>,
	pub limit: u32,
	pub threshold: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
	pub entity_type: EntityType,
	pub entity_id: Uuid,
	#[serde(default, deserialize_with = "null_as_default")]
	pub content_snippet: String,
	pub similarity: f32,
	#[serde(default)]
	pub metadata: Value,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
	/// Entries that do not decode are dropped; the rest are kept in endpoint order.
	#[serde(default, deserialize_with = "decodable_results")]
	pub results: Vec<SearchResult>,
	#[serde(default, deserialize_with = "null_as_default")]
	pub count: usize,
	/// Set by the endpoint when it could not score by vector similarity and used another strategy.
	#[serde(default, deserialize_with = "null_as_default")]
	pub fallback: bool,
}

pub async fn search(
	client: &Client,
	cfg: &SearchProviderConfig,
	req: &SearchRequest,
) -> Result<SearchResponse> {
	let res = crate::post(
		client,
		&cfg.api_base,
		&cfg.path,
		cfg.timeout_ms,
		crate::auth_headers(&cfg.api_key, &cfg.default_headers)?,
	)
	.json(req)
	.send()
	.await?;
	let json: Value = res.error_for_status()?.json().await?;

	Ok(serde_json::from_value(json)?)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn decodable_results<'de, D>(deserializer: D) -> std::result::Result<Vec<SearchResult>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;

	Ok(raw
		.unwrap_or_default()
		.into_iter()
		.filter_map(|value| serde_json::from_value(value).ok())
		.collect())
}
