//! Session memory: append an event row, then embed it in the background.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use uuid::Uuid;

use muse_domain::{EntityRef, EntityType};
use muse_storage::models::NewSessionEvent;

use crate::{Error, MuseService, Result, USAGE_EVENT_TYPE};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionContext {
	#[serde(default)]
	pub project_id: Option<Uuid>,
	#[serde(default)]
	pub entity_ref: Option<EntityRef>,
	#[serde(default)]
	pub metadata: Option<Value>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
	/// The row was written and its embedding was handed to a detached task.
	Recorded { event_id: Uuid },
	/// The row was not written. Nothing was embedded.
	Failed,
}

impl MuseService {
	/// Detached form of [`Self::record_now`]. Callers may drop the handle.
	pub fn record(
		&self,
		user_id: String,
		event_type: String,
		content: String,
		ctx: SessionContext,
	) -> JoinHandle<RecordOutcome> {
		let service = self.clone();

		tokio::spawn(async move { service.record_now(&user_id, &event_type, content, ctx).await })
	}

	/// Inserts the event row and, once it has an id, starts embedding its content without
	/// waiting for the result.
	pub async fn record_now(
		&self,
		user_id: &str,
		event_type: &str,
		content: String,
		ctx: SessionContext,
	) -> RecordOutcome {
		let event_id = match self.insert_session_event(user_id, event_type, &content, ctx).await {
			Ok(event_id) => event_id,
			Err(err) => {
				tracing::warn!(user_id, event_type, error = %err, "Session event write failed.");

				return RecordOutcome::Failed;
			},
		};

		tracing::debug!(%event_id, event_type, "Session event recorded.");

		drop(self.spawn_embedding(EntityType::SessionEvent, event_id, content));

		RecordOutcome::Recorded { event_id }
	}

	async fn insert_session_event(
		&self,
		user_id: &str,
		event_type: &str,
		content: &str,
		ctx: SessionContext,
	) -> Result<Uuid> {
		let event_type = event_type.trim();

		if user_id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "user_id must be non-empty.".to_string() });
		}
		if event_type.is_empty() {
			return Err(Error::InvalidRequest {
				message: "event_type must be non-empty.".to_string(),
			});
		}
		if event_type == USAGE_EVENT_TYPE {
			return Err(Error::InvalidRequest {
				message: format!("event_type {USAGE_EVENT_TYPE:?} is reserved for usage rows."),
			});
		}

		let event = NewSessionEvent {
			user_id: user_id.to_string(),
			event_type: event_type.to_string(),
			content: content.to_string(),
			project_id: ctx.project_id,
			entity_ref: ctx.entity_ref,
			metadata: ctx.metadata.unwrap_or_else(|| Value::Object(Default::default())),
		};

		self.stores.events.insert_event(&event, OffsetDateTime::now_utc()).await
	}
}
