//! Process-local store for development and tests. Same contract as Postgres: keyed upserts and an
//! append-only event log.

use std::{
	collections::HashMap,
	sync::{Mutex, MutexGuard},
};

use time::OffsetDateTime;
use uuid::Uuid;

use muse_domain::EntityRef;
use muse_storage::models::{EmbeddingRecord, NewSessionEvent, SessionEvent};

use crate::{BoxFuture, EmbeddingStore, EventLog, Result};

#[derive(Default)]
pub struct InMemoryStore {
	embeddings: Mutex<HashMap<EntityRef, EmbeddingRecord>>,
	events: Mutex<Vec<SessionEvent>>,
}
impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn embedding(&self, entity_ref: EntityRef) -> Option<EmbeddingRecord> {
		lock(&self.embeddings).get(&entity_ref).cloned()
	}

	pub fn embedding_count(&self) -> usize {
		lock(&self.embeddings).len()
	}

	/// Events in insertion order.
	pub fn events(&self) -> Vec<SessionEvent> {
		lock(&self.events).clone()
	}
}

impl EmbeddingStore for InMemoryStore {
	fn upsert_embedding<'a>(&'a self, record: &'a EmbeddingRecord) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			lock(&self.embeddings).insert(record.entity_ref, record.clone());

			Ok(())
		})
	}

	fn delete_embedding(&self, entity_ref: EntityRef) -> BoxFuture<'_, Result<bool>> {
		Box::pin(async move { Ok(lock(&self.embeddings).remove(&entity_ref).is_some()) })
	}
}

impl EventLog for InMemoryStore {
	fn insert_event<'a>(
		&'a self,
		event: &'a NewSessionEvent,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Uuid>> {
		Box::pin(async move {
			let event_id = Uuid::new_v4();

			lock(&self.events).push(SessionEvent {
				event_id,
				user_id: event.user_id.clone(),
				event_type: event.event_type.clone(),
				content: event.content.clone(),
				project_id: event.project_id,
				entity_ref: event.entity_ref,
				metadata: event.metadata.clone(),
				created_at: now,
			});

			Ok(event_id)
		})
	}

	fn list_events<'a>(
		&'a self,
		event_type: &'a str,
		since: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<SessionEvent>>> {
		Box::pin(async move {
			let mut events: Vec<SessionEvent> = lock(&self.events)
				.iter()
				.filter(|event| event.event_type == event_type && event.created_at >= since)
				.cloned()
				.collect();

			events.sort_by_key(|event| event.created_at);

			Ok(events)
		})
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(|err| err.into_inner())
}
