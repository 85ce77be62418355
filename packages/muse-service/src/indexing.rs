//! Entity create and update hooks: canonical content in, stored vector out.

use serde_json::Value;
use tokio::task::JoinHandle;
use uuid::Uuid;

use muse_domain::{Entity, NoteMemory};
use muse_providers::chat::ChatRequest;

use crate::{BatchReport, EmbedOutcome, EmbeddingItem, MuseService};

const NOTE_MEMORY_SYSTEM_PROMPT: &str = "You summarize a musician's notes. Reply with JSON only: \
	{\"summary\": string, \"concepts\": [string]}. Keep the summary under 40 words and list at \
	most 8 short concepts.";

impl MuseService {
	/// Canonicalizes `entity` and embeds it in the background.
	pub fn index_entity(&self, entity_id: Uuid, entity: &Entity) -> JoinHandle<EmbedOutcome> {
		self.spawn_embedding(entity.entity_type(), entity_id, muse_domain::canonicalize(entity))
	}

	pub async fn index_entities(&self, entities: Vec<(Uuid, Entity)>) -> BatchReport {
		let items = entities
			.into_iter()
			.map(|(entity_id, entity)| EmbeddingItem {
				entity_type: entity.entity_type(),
				entity_id,
				content: muse_domain::canonicalize(&entity),
			})
			.collect();

		self.generate_embeddings_batch(items).await
	}

	/// Asks the generation model for a summary and key concepts of a note.
	///
	/// Returns `None` for empty input, a failed call, or output without a usable summary.
	pub async fn extract_note_memory(
		&self,
		note_text: &str,
		user_id: Option<&str>,
	) -> Option<NoteMemory> {
		let note_text = note_text.trim();

		if note_text.is_empty() {
			return None;
		}

		let req = ChatRequest::new(format!("Note:\n{note_text}"))
			.with_system_prompt(NOTE_MEMORY_SYSTEM_PROMPT);
		let value = self.generate_structured(&req, user_id).await?;
		let memory = note_memory_from_value(&value);

		if memory.is_none() {
			tracing::warn!("Note memory output is missing a summary.");
		}

		memory
	}
}

fn note_memory_from_value(value: &Value) -> Option<NoteMemory> {
	let summary = value.get("summary")?.as_str()?.trim();

	if summary.is_empty() {
		return None;
	}

	let concepts = value
		.get("concepts")
		.and_then(|v| v.as_array())
		.map(|items| {
			items
				.iter()
				.filter_map(|item| item.as_str())
				.map(str::trim)
				.filter(|item| !item.is_empty())
				.map(str::to_string)
				.collect()
		})
		.unwrap_or_default();

	Some(NoteMemory { transcript: None, summary: Some(summary.to_string()), concepts })
}
