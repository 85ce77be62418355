use std::sync::Arc;

use muse_service::MuseService;
use muse_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<MuseService>,
	pub auth_token: Option<Arc<str>>,
}
impl AppState {
	pub async fn new(config: muse_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		let auth_token = config.security.api_auth_token.clone();
		let service = MuseService::new(config, db)?;

		Ok(Self::with_service(service, auth_token))
	}

	pub fn with_service(service: MuseService, auth_token: Option<String>) -> Self {
		Self { service: Arc::new(service), auth_token: auth_token.map(Arc::from) }
	}
}
