//! Seed helpers for storage-backed tests.

use std::collections::HashMap;

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, PointStruct, UpsertPointsBuilder, Vector,
		VectorParamsBuilder, VectorsConfigBuilder,
	},
};
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use crate::Result;

#[derive(Debug, Clone)]
pub struct TaskFixture {
	pub task_id: Uuid,
	pub tenant_id: String,
	pub project_id: Option<String>,
	pub title: String,
	pub description: String,
	pub status: String,
	pub priority: String,
	pub due_date: Option<Date>,
}
impl TaskFixture {
	pub fn new(tenant_id: &str, title: &str) -> Self {
		Self {
			task_id: Uuid::new_v4(),
			tenant_id: tenant_id.to_string(),
			project_id: None,
			title: title.to_string(),
			description: String::new(),
			status: "TODO".to_string(),
			priority: "MEDIUM".to_string(),
			due_date: None,
		}
	}

	pub fn project(mut self, project_id: &str) -> Self {
		self.project_id = Some(project_id.to_string());

		self
	}

	pub fn status(mut self, status: &str) -> Self {
		self.status = status.to_string();

		self
	}

	pub fn priority(mut self, priority: &str) -> Self {
		self.priority = priority.to_string();

		self
	}

	pub fn description(mut self, description: &str) -> Self {
		self.description = description.to_string();

		self
	}

	pub fn due_date(mut self, due_date: Date) -> Self {
		self.due_date = Some(due_date);

		self
	}
}

pub async fn insert_tenant(pool: &PgPool, tenant_id: &str, timezone: &str) -> Result<()> {
	sqlx::query("INSERT INTO tenants (tenant_id, timezone) VALUES ($1, $2)")
		.bind(tenant_id)
		.bind(timezone)
		.execute(pool)
		.await?;

	Ok(())
}

pub async fn insert_project(
	pool: &PgPool,
	tenant_id: &str,
	project_id: &str,
	name: &str,
) -> Result<()> {
	sqlx::query("INSERT INTO projects (tenant_id, project_id, name) VALUES ($1, $2, $3)")
		.bind(tenant_id)
		.bind(project_id)
		.bind(name)
		.execute(pool)
		.await?;

	Ok(())
}

pub async fn insert_task(pool: &PgPool, task: &TaskFixture) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO tasks (task_id, tenant_id, project_id, title, description, status, priority, due_date)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
	)
	.bind(task.task_id)
	.bind(&task.tenant_id)
	.bind(&task.project_id)
	.bind(&task.title)
	.bind(&task.description)
	.bind(&task.status)
	.bind(&task.priority)
	.bind(task.due_date)
	.execute(pool)
	.await?;

	Ok(())
}

/// Creates a cosine collection with a single named dense vector.
pub async fn create_task_collection(
	client: &Qdrant,
	collection: &str,
	vector_name: &str,
	dim: u64,
) -> Result<()> {
	let mut vectors_config = VectorsConfigBuilder::default();

	vectors_config
		.add_named_vector_params(vector_name, VectorParamsBuilder::new(dim, Distance::Cosine));

	client
		.create_collection(
			CreateCollectionBuilder::new(collection.to_string()).vectors_config(vectors_config),
		)
		.await?;

	Ok(())
}

/// Upserts one task vector with the payload fields vector queries filter on.
pub async fn upsert_task_point(
	client: &Qdrant,
	collection: &str,
	vector_name: &str,
	task: &TaskFixture,
	vector: Vec<f32>,
) -> Result<()> {
	let mut payload = Payload::new();

	payload.insert("tenant_id", task.tenant_id.clone());
	payload.insert("status", task.status.clone());

	if let Some(project_id) = &task.project_id {
		payload.insert("project_id", project_id.clone());
	}

	let mut vectors = HashMap::new();

	vectors.insert(vector_name.to_string(), Vector::from(vector));

	let point = PointStruct::new(task.task_id.to_string(), vectors, payload);

	client
		.upsert_points(UpsertPointsBuilder::new(collection.to_string(), vec![point]).wait(true))
		.await?;

	Ok(())
}
