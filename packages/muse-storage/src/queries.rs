use time::OffsetDateTime;
use uuid::Uuid;

use muse_domain::EntityRef;

use crate::{
	Error, Result,
	db::Db,
	models::{EmbeddingRecord, NewSessionEvent, SessionEvent, SessionEventRow},
	vector,
};

/// Inserts or replaces the single embedding stored for `record.entity_ref`.
pub async fn upsert_embedding(db: &Db, record: &EmbeddingRecord) -> Result<()> {
	if record.vec.is_empty() {
		return Err(Error::InvalidArgument("Embedding vector must be non-empty.".to_string()));
	}

	let dim = i32::try_from(record.vec.len())
		.map_err(|_| Error::InvalidArgument("Embedding vector is too long.".to_string()))?;
	let vec_text = vector::vector_to_pg(&record.vec);

	sqlx::query(
		"\
INSERT INTO entity_embeddings (
	entity_type,
	entity_id,
	embedding_version,
	embedding_dim,
	vec,
	created_at
)
VALUES ($1, $2, $3, $4, $5::text::vector, $6)
ON CONFLICT (entity_type, entity_id) DO UPDATE
SET
	embedding_version = EXCLUDED.embedding_version,
	embedding_dim = EXCLUDED.embedding_dim,
	vec = EXCLUDED.vec,
	created_at = EXCLUDED.created_at",
	)
	.bind(record.entity_ref.entity_type.as_str())
	.bind(record.entity_ref.entity_id)
	.bind(record.embedding_version.as_str())
	.bind(dim)
	.bind(vec_text.as_str())
	.bind(record.created_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn get_embedding(db: &Db, entity_ref: EntityRef) -> Result<Option<EmbeddingRecord>> {
	let row: Option<(String, String, OffsetDateTime)> = sqlx::query_as(
		"\
SELECT embedding_version, vec::text, created_at
FROM entity_embeddings
WHERE entity_type = $1 AND entity_id = $2",
	)
	.bind(entity_ref.entity_type.as_str())
	.bind(entity_ref.entity_id)
	.fetch_optional(&db.pool)
	.await?;
	let Some((embedding_version, vec_text, created_at)) = row else {
		return Ok(None);
	};

	Ok(Some(EmbeddingRecord {
		entity_ref,
		embedding_version,
		vec: vector::parse_pg_vector(&vec_text)?,
		created_at,
	}))
}

/// Returns whether a record existed.
pub async fn delete_embedding(db: &Db, entity_ref: EntityRef) -> Result<bool> {
	let result =
		sqlx::query("DELETE FROM entity_embeddings WHERE entity_type = $1 AND entity_id = $2")
			.bind(entity_ref.entity_type.as_str())
			.bind(entity_ref.entity_id)
			.execute(&db.pool)
			.await?;

	Ok(result.rows_affected() > 0)
}

/// Appends one event and returns its generated id. Events are never updated afterwards.
pub async fn insert_session_event(
	db: &Db,
	event: &NewSessionEvent,
	now: OffsetDateTime,
) -> Result<Uuid> {
	let event_id: Uuid = sqlx::query_scalar(
		"\
INSERT INTO session_events (
	event_id,
	user_id,
	event_type,
	content,
	project_id,
	entity_type,
	entity_id,
	metadata,
	created_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING event_id",
	)
	.bind(Uuid::new_v4())
	.bind(event.user_id.as_str())
	.bind(event.event_type.as_str())
	.bind(event.content.as_str())
	.bind(event.project_id)
	.bind(event.entity_ref.map(|r| r.entity_type.as_str()))
	.bind(event.entity_ref.map(|r| r.entity_id))
	.bind(&event.metadata)
	.bind(now)
	.fetch_one(&db.pool)
	.await?;

	Ok(event_id)
}

/// Lists events of one type created at or after `since`, oldest first.
pub async fn list_session_events(
	db: &Db,
	event_type: &str,
	since: OffsetDateTime,
) -> Result<Vec<SessionEvent>> {
	let rows: Vec<SessionEventRow> = sqlx::query_as(
		"\
SELECT
	event_id,
	user_id,
	event_type,
	content,
	project_id,
	entity_type,
	entity_id,
	metadata,
	created_at
FROM session_events
WHERE event_type = $1 AND created_at >= $2
ORDER BY created_at ASC, event_id ASC",
	)
	.bind(event_type)
	.bind(since)
	.fetch_all(&db.pool)
	.await?;

	rows.into_iter().map(SessionEventRow::into_event).collect()
}
