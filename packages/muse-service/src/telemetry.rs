//! Usage telemetry for remote model calls.
//!
//! Each call appends one session event of type [`USAGE_EVENT_TYPE`]. Writes are detached and
//! their failures only reach the log. Reporting reads the rows back and aggregates in process.

use std::{collections::BTreeMap, time::Duration};

use serde::{Serialize, Serializer};
use time::{Date, OffsetDateTime, UtcOffset};

use muse_storage::models::{NewSessionEvent, SessionEvent};

use crate::MuseService;

/// Reserved event type carrying usage rows in the session event log.
pub const USAGE_EVENT_TYPE: &str = "ai_usage";
/// Owner of usage rows for calls made outside any user's request.
pub const SYSTEM_USER_ID: &str = "system";

#[derive(Clone, Debug, PartialEq)]
pub struct UsageLogEntry {
	pub function_name: String,
	pub user_id: Option<String>,
	pub model: String,
	pub token_estimate: Option<u64>,
	pub cached: Option<bool>,
	pub duration_ms: u64,
	pub timestamp: OffsetDateTime,
}
impl UsageLogEntry {
	pub fn new(function_name: &str, model: &str, duration: Duration) -> Self {
		Self {
			function_name: function_name.to_string(),
			user_id: None,
			model: model.to_string(),
			token_estimate: None,
			cached: None,
			duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
			timestamp: OffsetDateTime::now_utc(),
		}
	}

	pub fn with_user(mut self, user_id: Option<&str>) -> Self {
		self.user_id = user_id.map(str::to_string);

		self
	}

	pub fn with_token_estimate(mut self, tokens: u64) -> Self {
		self.token_estimate = Some(tokens);

		self
	}

	pub fn with_cached(mut self, cached: bool) -> Self {
		self.cached = Some(cached);

		self
	}

	fn to_event(&self) -> NewSessionEvent {
		NewSessionEvent {
			user_id: self.user_id.clone().unwrap_or_else(|| SYSTEM_USER_ID.to_string()),
			event_type: USAGE_EVENT_TYPE.to_string(),
			content: format!("{} via {}", self.function_name, self.model),
			project_id: None,
			entity_ref: None,
			metadata: serde_json::json!({
				"function_name": self.function_name,
				"user_id": self.user_id,
				"model": self.model,
				"token_estimate": self.token_estimate,
				"cached": self.cached,
				"duration_ms": self.duration_ms,
			}),
		}
	}
}

/// Usage aggregated per function, UTC day, and user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UsageSummary {
	pub function_name: String,
	#[serde(serialize_with = "serialize_day")]
	pub day: Date,
	pub user_id: Option<String>,
	pub calls: u64,
	pub cached_calls: u64,
	pub total_duration_ms: u64,
	pub total_tokens: u64,
}

impl MuseService {
	/// Appends one usage row in the background. Never blocks and never fails the caller.
	pub fn record_usage(&self, entry: UsageLogEntry) {
		if !self.cfg.memory.telemetry_enabled {
			return;
		}

		let events = self.stores.events.clone();

		tokio::spawn(async move {
			let event = entry.to_event();

			if let Err(err) = events.insert_event(&event, entry.timestamp).await {
				tracing::warn!(
					function_name = %entry.function_name,
					error = %err,
					"Usage telemetry write failed."
				);
			}
		});
	}

	/// Aggregates usage rows created at or after `since`. Returns an empty report when the log
	/// cannot be read.
	pub async fn usage_report(&self, since: OffsetDateTime) -> Vec<UsageSummary> {
		match self.stores.events.list_events(USAGE_EVENT_TYPE, since).await {
			Ok(events) => summarize_usage(&events),
			Err(err) => {
				tracing::warn!(error = %err, "Usage report read failed.");

				Vec::new()
			},
		}
	}
}

fn summarize_usage(events: &[SessionEvent]) -> Vec<UsageSummary> {
	let mut groups: BTreeMap<(Date, String, Option<String>), UsageSummary> = BTreeMap::new();

	for event in events {
		let metadata = &event.metadata;
		let Some(function_name) = metadata.get("function_name").and_then(|v| v.as_str()) else {
			tracing::debug!(
				event_id = %event.event_id,
				"Skipping usage row without function name."
			);

			continue;
		};
		let user_id = metadata.get("user_id").and_then(|v| v.as_str()).map(str::to_string);
		let day = event.created_at.to_offset(UtcOffset::UTC).date();
		let summary = groups
			.entry((day, function_name.to_string(), user_id.clone()))
			.or_insert_with(|| UsageSummary {
				function_name: function_name.to_string(),
				day,
				user_id,
				calls: 0,
				cached_calls: 0,
				total_duration_ms: 0,
				total_tokens: 0,
			});

		summary.calls += 1;

		if metadata.get("cached").and_then(|v| v.as_bool()).unwrap_or(false) {
			summary.cached_calls += 1;
		}

		summary.total_duration_ms +=
			metadata.get("duration_ms").and_then(|v| v.as_u64()).unwrap_or(0);
		summary.total_tokens +=
			metadata.get("token_estimate").and_then(|v| v.as_u64()).unwrap_or(0);
	}

	groups.into_values().collect()
}

fn serialize_day<S>(day: &Date, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.collect_str(day)
}
