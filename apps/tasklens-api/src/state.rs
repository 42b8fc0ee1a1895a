use std::{collections::HashMap, sync::Arc};

use tasklens_service::TaskSearchService;
use tasklens_storage::{db::Db, qdrant::QdrantStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<TaskSearchService>,
	/// Bearer token to tenant id.
	pub api_keys: Arc<HashMap<String, String>>,
}
impl AppState {
	pub async fn new(config: tasklens_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let qdrant = QdrantStore::new(&config.storage.qdrant)?;
		let service = TaskSearchService::new(config, db, qdrant);

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: TaskSearchService) -> Self {
		let api_keys = service
			.cfg
			.security
			.api_keys
			.iter()
			.map(|key| (key.token.clone(), key.tenant_id.clone()))
			.collect();

		Self { service: Arc::new(service), api_keys: Arc::new(api_keys) }
	}

	pub fn tenant_for_token(&self, token: &str) -> Option<&str> {
		self.api_keys.get(token).map(String::as_str)
	}
}
