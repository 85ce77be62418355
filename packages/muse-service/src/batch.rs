use futures::future;
use serde::{Deserialize, Serialize};

use crate::{EmbeddingItem, MuseService};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
	pub success: usize,
	pub failed: usize,
}
impl BatchReport {
	pub fn total(&self) -> usize {
		self.success + self.failed
	}
}

impl MuseService {
	/// Embeds every item in windows of `memory.batch_window`.
	///
	/// Items inside one window run concurrently and the whole window settles before the next one
	/// starts, so at most one window of remote calls is ever in flight. Failures are counted and
	/// never abort the remaining items.
	pub async fn generate_embeddings_batch(&self, items: Vec<EmbeddingItem>) -> BatchReport {
		let window = (self.cfg.memory.batch_window as usize).max(1);
		let mut report = BatchReport::default();

		for chunk in items.chunks(window) {
			let outcomes = future::join_all(chunk.iter().map(|item| {
				self.generate_embedding(item.entity_type, item.entity_id, &item.content)
			}))
			.await;

			for outcome in outcomes {
				if outcome.succeeded() {
					report.success += 1;
				} else {
					report.failed += 1;
				}
			}
		}

		tracing::info!(
			items = items.len(),
			success = report.success,
			failed = report.failed,
			window,
			"Embedding batch finished."
		);

		report
	}
}
