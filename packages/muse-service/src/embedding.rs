use std::time::Instant;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use uuid::Uuid;

use muse_domain::{EntityRef, EntityType};
use muse_storage::models::EmbeddingRecord;

use crate::{Error, MuseService, Result, UsageLogEntry};

/// Result of one embedding attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedOutcome {
	/// A vector was generated and upserted.
	Stored,
	/// Content was empty after trimming; nothing to embed.
	Skipped,
	/// The attempt failed and was logged. There is no retry.
	Failed,
}
impl EmbedOutcome {
	pub fn succeeded(self) -> bool {
		!matches!(self, Self::Failed)
	}
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingItem {
	pub entity_type: EntityType,
	pub entity_id: Uuid,
	pub content: String,
}

impl MuseService {
	/// Embeds `content` and upserts it under `(entity_type, entity_id)`.
	///
	/// Never fails: every error is logged and reported as [`EmbedOutcome::Failed`].
	pub async fn generate_embedding(
		&self,
		entity_type: EntityType,
		entity_id: Uuid,
		content: &str,
	) -> EmbedOutcome {
		let content = content.trim();

		if content.is_empty() {
			tracing::debug!(%entity_type, %entity_id, "Skipping embedding for empty content.");

			return EmbedOutcome::Skipped;
		}

		match self.try_generate_embedding(EntityRef::new(entity_type, entity_id), content).await {
			Ok(()) => EmbedOutcome::Stored,
			Err(err) => {
				tracing::warn!(
					%entity_type,
					%entity_id,
					error = %err,
					"Embedding generation failed."
				);

				EmbedOutcome::Failed
			},
		}
	}

	/// Detached form of [`Self::generate_embedding`]. Dropping the handle does not cancel the work.
	pub fn spawn_embedding(
		&self,
		entity_type: EntityType,
		entity_id: Uuid,
		content: String,
	) -> JoinHandle<EmbedOutcome> {
		let service = self.clone();

		tokio::spawn(
			async move { service.generate_embedding(entity_type, entity_id, &content).await },
		)
	}

	/// Drops the stored vector of an entity that no longer exists. Returns `false` on failure.
	pub async fn remove_embedding(&self, entity_ref: EntityRef) -> bool {
		match self.stores.embeddings.delete_embedding(entity_ref).await {
			Ok(existed) => {
				tracing::debug!(%entity_ref, existed, "Embedding removed.");

				true
			},
			Err(err) => {
				tracing::warn!(%entity_ref, error = %err, "Embedding removal failed.");

				false
			},
		}
	}

	async fn try_generate_embedding(&self, entity_ref: EntityRef, content: &str) -> Result<()> {
		let cfg = &self.cfg.providers.embedding;
		let started = Instant::now();
		let result = self.providers.embedding.embed(cfg, content).await;

		self.record_usage(
			UsageLogEntry::new("generate_embedding", &cfg.model, started.elapsed())
				.with_token_estimate(crate::estimate_tokens(content.chars().count())),
		);

		let vec = result?;

		if vec.len() != cfg.dimensions as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding vector dimension mismatch: expected {}, got {}.",
					cfg.dimensions,
					vec.len()
				),
			});
		}

		let record = EmbeddingRecord {
			entity_ref,
			embedding_version: crate::embedding_version(&self.cfg),
			vec,
			created_at: OffsetDateTime::now_utc(),
		};

		self.stores.embeddings.upsert_embedding(&record).await
	}
}
