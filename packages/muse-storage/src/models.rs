use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use muse_domain::{EntityRef, EntityType};

#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddingRecord {
	pub entity_ref: EntityRef,
	pub embedding_version: String,
	pub vec: Vec<f32>,
	pub created_at: OffsetDateTime,
}
impl EmbeddingRecord {
	pub fn dimension(&self) -> usize {
		self.vec.len()
	}
}

/// A session event before insertion; the log assigns `event_id` and `created_at`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewSessionEvent {
	pub user_id: String,
	pub event_type: String,
	pub content: String,
	pub project_id: Option<Uuid>,
	pub entity_ref: Option<EntityRef>,
	pub metadata: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionEvent {
	pub event_id: Uuid,
	pub user_id: String,
	pub event_type: String,
	pub content: String,
	pub project_id: Option<Uuid>,
	pub entity_ref: Option<EntityRef>,
	pub metadata: Value,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SessionEventRow {
	pub event_id: Uuid,
	pub user_id: String,
	pub event_type: String,
	pub content: String,
	pub project_id: Option<Uuid>,
	pub entity_type: Option<String>,
	pub entity_id: Option<Uuid>,
	pub metadata: Value,
	pub created_at: OffsetDateTime,
}
impl SessionEventRow {
	pub(crate) fn into_event(self) -> crate::Result<SessionEvent> {
		let entity_ref = match (self.entity_type, self.entity_id) {
			(Some(entity_type), Some(entity_id)) => {
				let entity_type: EntityType = entity_type
					.parse()
					.map_err(|err: muse_domain::ParseEntityTypeError| {
						crate::Error::CorruptRow(err.to_string())
					})?;

				Some(EntityRef::new(entity_type, entity_id))
			},
			_ => None,
		};

		Ok(SessionEvent {
			event_id: self.event_id,
			user_id: self.user_id,
			event_type: self.event_type,
			content: self.content,
			project_id: self.project_id,
			entity_ref,
			metadata: self.metadata,
			created_at: self.created_at,
		})
	}
}
