//! Postgres-backed implementations of the store seams.

use time::OffsetDateTime;
use uuid::Uuid;

use muse_domain::EntityRef;
use muse_storage::{
	db::Db,
	models::{EmbeddingRecord, NewSessionEvent, SessionEvent},
	queries,
};

use crate::{BoxFuture, EmbeddingStore, EventLog, Result};

impl EmbeddingStore for Db {
	fn upsert_embedding<'a>(&'a self, record: &'a EmbeddingRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move { Ok(queries::upsert_embedding(self, record).await?) })
	}

	fn delete_embedding(&self, entity_ref: EntityRef) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move { Ok(queries::delete_embedding(self, entity_ref).await?) })
	}
}

impl EventLog for Db {
	fn insert_event<'a>(
		&'a self,
		event: &'a NewSessionEvent,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Uuid>> {
		Box::pin(async move { Ok(queries::insert_session_event(self, event, now).await?) })
	}

	fn list_events<'a>(
		&'a self,
		event_type: &'a str,
		since: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<SessionEvent>>> {
		Box::pin(async move { Ok(queries::list_session_events(self, event_type, since).await?) })
	}
}
