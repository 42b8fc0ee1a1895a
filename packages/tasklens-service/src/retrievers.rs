//! Postgres and Qdrant backed collaborators.

use std::collections::HashMap;

use uuid::Uuid;

use crate::{
	BoxFuture, EmbeddingRetriever, KeywordFetch, KeywordRetriever, Result, SemanticFetch,
	TimezoneProvider,
};
use tasklens_config::EmbeddingProviderConfig;
use tasklens_domain::{CanonicalStatus, TaskCandidate};
use tasklens_providers::embedding;
use tasklens_storage::{
	db::Db,
	models::TaskRow,
	qdrant::{QdrantStore, TaskVectorFilter},
	queries::{self, KeywordQuery},
};

pub struct StoreRetrievers {
	pub embedding: EmbeddingProviderConfig,
	pub db: Db,
	pub qdrant: QdrantStore,
}
impl StoreRetrievers {
	pub fn new(embedding: EmbeddingProviderConfig, db: Db, qdrant: QdrantStore) -> Self {
		Self { embedding, db, qdrant }
	}

	async fn semantic(&self, query: SemanticFetch<'_>) -> Result<Vec<TaskCandidate>> {
		let vector = embedding::embed_query(&self.embedding, query.query_text).await?;
		let filter = TaskVectorFilter {
			tenant_id: query.tenant_id,
			project_id: query.project_id,
			status: query.status.map(CanonicalStatus::as_str),
		};
		let hits = self.qdrant.search_tasks(vector, filter, query.limit).await?;
		let task_ids: Vec<Uuid> = hits.iter().map(|hit| hit.task_id).collect();
		let scores: HashMap<Uuid, f64> =
			hits.iter().map(|hit| (hit.task_id, clamp_similarity(hit.score))).collect();
		let rows = queries::fetch_tasks_by_ids(&self.db.pool, query.tenant_id, &task_ids).await?;

		Ok(rows
			.into_iter()
			.map(|row| {
				let semantic_score = scores.get(&row.task_id).copied();

				candidate_from_row(row, semantic_score)
			})
			.collect())
	}

	async fn keyword(&self, query: KeywordFetch<'_>) -> Result<Vec<TaskCandidate>> {
		let rows = queries::keyword_search(
			&self.db.pool,
			KeywordQuery {
				tenant_id: query.tenant_id,
				patterns: query.patterns,
				project_id: query.project_id,
				status: query.status.map(CanonicalStatus::as_str),
				limit: query.limit,
			},
		)
		.await?;

		Ok(rows.into_iter().map(|row| candidate_from_row(row, None)).collect())
	}
}

impl EmbeddingRetriever for StoreRetrievers {
	fn fetch<'a>(&'a self, query: SemanticFetch<'a>) -> BoxFuture<'a, Result<Vec<TaskCandidate>>> {
		Box::pin(self.semantic(query))
	}
}

impl KeywordRetriever for StoreRetrievers {
	fn fetch<'a>(&'a self, query: KeywordFetch<'a>) -> BoxFuture<'a, Result<Vec<TaskCandidate>>> {
		Box::pin(self.keyword(query))
	}
}

impl TimezoneProvider for StoreRetrievers {
	fn timezone<'a>(&'a self, tenant_id: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		Box::pin(async move { Ok(queries::tenant_timezone(&self.db.pool, tenant_id).await?) })
	}
}

fn candidate_from_row(row: TaskRow, semantic_score: Option<f64>) -> TaskCandidate {
	TaskCandidate {
		id: row.task_id,
		title: row.title,
		status: row.status,
		priority: row.priority,
		due_date: row.due_date,
		project_id: row.project_id,
		project_name: row.project_name,
		semantic_score,
		score: row.score,
	}
}

// Cosine similarity can be negative.
fn clamp_similarity(score: f32) -> f64 {
	f64::from(score).clamp(0.0, 1.0)
}
