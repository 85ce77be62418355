use std::time::Instant;

use serde::Deserialize;

use muse_domain::EntityType;
use muse_providers::search::{SearchRequest, SearchResponse};

use crate::{MuseService, UsageLogEntry};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchOptions {
	#[serde(default)]
	pub entity_types: Option<Vec<EntityType>>,
	#[serde(default)]
	pub limit: Option<u32>,
	#[serde(default)]
	pub threshold: Option<f32>,
}

impl MuseService {
	/// Semantic search over a user's memory.
	///
	/// Results come back in the order the endpoint ranked them, including its `fallback` flag.
	/// Any failure yields an empty response.
	pub async fn search(
		&self,
		query_text: &str,
		user_id: &str,
		options: SearchOptions,
	) -> SearchResponse {
		let query = query_text.trim();

		if query.is_empty() {
			return SearchResponse::default();
		}

		let req = self.build_search_request(query, user_id, options);
		let cfg = &self.cfg.providers.search;
		let started = Instant::now();
		let result = self.providers.search.search(cfg, &req).await;

		self.record_usage(
			UsageLogEntry::new("semantic_search", &cfg.provider_id, started.elapsed())
				.with_user(Some(user_id))
				.with_token_estimate(crate::estimate_tokens(query.chars().count())),
		);

		match result {
			Ok(response) => {
				tracing::debug!(
					user_id,
					count = response.results.len(),
					fallback = response.fallback,
					"Semantic search finished."
				);

				response
			},
			Err(err) => {
				tracing::warn!(user_id, error = %err, "Semantic search failed.");

				SearchResponse::default()
			},
		}
	}

	fn build_search_request(
		&self,
		query: &str,
		user_id: &str,
		options: SearchOptions,
	) -> SearchRequest {
		let memory = &self.cfg.memory;
		let mut entity_types = Vec::new();

		for entity_type in options.entity_types.unwrap_or_default() {
			if !entity_types.contains(&entity_type) {
				entity_types.push(entity_type);
			}
		}
		if entity_types.is_empty() {
			entity_types = EntityType::ALL.to_vec();
		}

		let limit = options
			.limit
			.unwrap_or(memory.search_default_limit)
			.clamp(1, memory.search_max_limit.max(1));
		let threshold = options
			.threshold
			.filter(|t| t.is_finite())
			.unwrap_or(memory.search_default_threshold)
			.clamp(0.0, 1.0);

		SearchRequest {
			query: query.to_string(),
			user_id: user_id.to_string(),
			entity_types,
			limit,
			threshold,
		}
	}
}
