pub mod retrievers;
pub mod search;

mod error;

pub use error::{Error, Result};
pub use retrievers::StoreRetrievers;
pub use search::{SearchMeta, SearchRequest, SearchResponse, TenantContext};

use std::{future::Future, pin::Pin, sync::Arc};

use tasklens_config::Config;
use tasklens_domain::{CanonicalStatus, TaskCandidate};
use tasklens_storage::{db::Db, qdrant::QdrantStore};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Vector retrieval scoped to one tenant. Every returned candidate carries `semantic_score`.
#[derive(Debug, Clone, Copy)]
pub struct SemanticFetch<'a> {
	pub tenant_id: &'a str,
	pub query_text: &'a str,
	pub project_id: Option<&'a str>,
	pub status: Option<CanonicalStatus>,
	pub limit: u32,
}

/// Literal retrieval scoped to one tenant. Every returned candidate carries a heuristic `score`.
#[derive(Debug, Clone, Copy)]
pub struct KeywordFetch<'a> {
	pub tenant_id: &'a str,
	pub patterns: &'a [String],
	pub project_id: Option<&'a str>,
	pub status: Option<CanonicalStatus>,
	pub limit: u32,
}

pub trait EmbeddingRetriever
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, query: SemanticFetch<'a>) -> BoxFuture<'a, Result<Vec<TaskCandidate>>>;
}

pub trait KeywordRetriever
where
	Self: Send + Sync,
{
	fn fetch<'a>(&'a self, query: KeywordFetch<'a>) -> BoxFuture<'a, Result<Vec<TaskCandidate>>>;
}

pub trait TimezoneProvider
where
	Self: Send + Sync,
{
	/// IANA zone configured for the tenant, if any.
	fn timezone<'a>(&'a self, tenant_id: &'a str) -> BoxFuture<'a, Result<Option<String>>>;
}

#[derive(Clone)]
pub struct Retrievers {
	pub embedding: Arc<dyn EmbeddingRetriever>,
	pub keyword: Arc<dyn KeywordRetriever>,
	pub timezone: Arc<dyn TimezoneProvider>,
}
impl Retrievers {
	pub fn new(
		embedding: Arc<dyn EmbeddingRetriever>,
		keyword: Arc<dyn KeywordRetriever>,
		timezone: Arc<dyn TimezoneProvider>,
	) -> Self {
		Self { embedding, keyword, timezone }
	}

	pub fn from_store(store: StoreRetrievers) -> Self {
		let store = Arc::new(store);

		Self { embedding: store.clone(), keyword: store.clone(), timezone: store }
	}
}

pub struct TaskSearchService {
	pub cfg: Config,
	pub retrievers: Retrievers,
}
impl TaskSearchService {
	pub fn new(cfg: Config, db: Db, qdrant: QdrantStore) -> Self {
		let store = StoreRetrievers::new(cfg.providers.embedding.clone(), db, qdrant);

		Self { cfg, retrievers: Retrievers::from_store(store) }
	}

	pub fn with_retrievers(cfg: Config, retrievers: Retrievers) -> Self {
		Self { cfg, retrievers }
	}
}
