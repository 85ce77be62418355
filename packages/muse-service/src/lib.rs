pub mod batch;
pub mod chat;
pub mod embedding;
pub mod indexing;
pub mod memory_store;
pub mod search;
pub mod session;
pub mod stores;
pub mod telemetry;

mod error;

pub use batch::BatchReport;
pub use embedding::{EmbedOutcome, EmbeddingItem};
pub use error::{Error, Result};
pub use memory_store::InMemoryStore;
pub use search::SearchOptions;
pub use session::{RecordOutcome, SessionContext};
pub use telemetry::{USAGE_EVENT_TYPE, UsageLogEntry, UsageSummary};

use std::{future::Future, pin::Pin, sync::Arc};

use time::OffsetDateTime;
use uuid::Uuid;

use muse_config::{ChatProviderConfig, Config, EmbeddingProviderConfig, SearchProviderConfig};
use muse_domain::EntityRef;
use muse_providers::{
	chat::ChatRequest,
	search::{SearchRequest, SearchResponse},
};
use muse_storage::{
	db::Db,
	models::{EmbeddingRecord, NewSessionEvent, SessionEvent},
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		content: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		req: &'a ChatRequest,
	) -> BoxFuture<'a, Result<String>>;
}

pub trait SearchProvider
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		req: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchResponse>>;
}

/// Keyed embedding storage. Upserts replace any prior vector for the same [`EntityRef`].
pub trait EmbeddingStore
where
	Self: Send + Sync,
{
	fn upsert_embedding<'a>(&'a self, record: &'a EmbeddingRecord) -> BoxFuture<'a, Result<()>>;

	fn delete_embedding(&self, entity_ref: EntityRef) -> BoxFuture<'_, Result<bool>>;
}

/// Append-only session event log.
pub trait EventLog
where
	Self: Send + Sync,
{
	fn insert_event<'a>(
		&'a self,
		event: &'a NewSessionEvent,
		now: OffsetDateTime,
	) -> BoxFuture<'a, Result<Uuid>>;

	fn list_events<'a>(
		&'a self,
		event_type: &'a str,
		since: OffsetDateTime,
	) -> BoxFuture<'a, Result<Vec<SessionEvent>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
	pub search: Arc<dyn SearchProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		chat: Arc<dyn ChatProvider>,
		search: Arc<dyn SearchProvider>,
	) -> Self {
		Self { embedding, chat, search }
	}

	/// Remote providers sharing one HTTP client.
	pub fn http(client: reqwest::Client) -> Self {
		let provider = Arc::new(HttpProviders { client });

		Self { embedding: provider.clone(), chat: provider.clone(), search: provider }
	}
}

#[derive(Clone)]
pub struct Stores {
	pub embeddings: Arc<dyn EmbeddingStore>,
	pub events: Arc<dyn EventLog>,
}
impl Stores {
	pub fn new(embeddings: Arc<dyn EmbeddingStore>, events: Arc<dyn EventLog>) -> Self {
		Self { embeddings, events }
	}

	pub fn postgres(db: Db) -> Self {
		let db = Arc::new(db);

		Self { embeddings: db.clone(), events: db }
	}

	pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
		Self { embeddings: store.clone(), events: store }
	}
}

/// Entry point of the semantic memory pipeline.
///
/// Cloning is cheap; detached work holds its own clone.
#[derive(Clone)]
pub struct MuseService {
	pub cfg: Arc<Config>,
	pub providers: Providers,
	pub stores: Stores,
}
impl MuseService {
	pub fn new(cfg: Config, db: Db) -> Result<Self> {
		let client = muse_providers::build_client()?;

		Ok(Self::with_parts(cfg, Providers::http(client), Stores::postgres(db)))
	}

	pub fn with_parts(cfg: Config, providers: Providers, stores: Stores) -> Self {
		Self { cfg: Arc::new(cfg), providers, stores }
	}
}

struct HttpProviders {
	client: reqwest::Client,
}
impl EmbeddingProvider for HttpProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		content: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		Box::pin(
			async move { Ok(muse_providers::embedding::embed(&self.client, cfg, content).await?) },
		)
	}
}
impl ChatProvider for HttpProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		req: &'a ChatRequest,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(muse_providers::chat::generate(&self.client, cfg, req).await?) })
	}
}
impl SearchProvider for HttpProviders {
	fn search<'a>(
		&'a self,
		cfg: &'a SearchProviderConfig,
		req: &'a SearchRequest,
	) -> BoxFuture<'a, Result<SearchResponse>> {
		Box::pin(async move { Ok(muse_providers::search::search(&self.client, cfg, req).await?) })
	}
}

pub(crate) fn embedding_version(cfg: &Config) -> String {
	format!(
		"{}:{}:{}",
		cfg.providers.embedding.provider_id,
		cfg.providers.embedding.model,
		cfg.providers.embedding.dimensions
	)
}

/// Rough token count used for usage telemetry.
pub(crate) fn estimate_tokens(chars: usize) -> u64 {
	chars.div_ceil(4) as u64
}
