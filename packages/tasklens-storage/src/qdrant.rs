pub const DENSE_VECTOR_NAME: &str = "dense";

use qdrant_client::qdrant::{
	Condition, Filter, PointId, Query, QueryPointsBuilder, point_id::PointIdOptions,
};
use uuid::Uuid;

use crate::{Error, Result};

/// Tenant-scoped restriction applied to every vector query.
#[derive(Debug, Clone, Copy)]
pub struct TaskVectorFilter<'a> {
	pub tenant_id: &'a str,
	pub project_id: Option<&'a str>,
	pub status: Option<&'a str>,
}
impl TaskVectorFilter<'_> {
	fn to_filter(self) -> Filter {
		let mut must = vec![Condition::matches("tenant_id", self.tenant_id.to_string())];

		if let Some(project_id) = self.project_id {
			must.push(Condition::matches("project_id", project_id.to_string()));
		}
		if let Some(status) = self.status {
			must.push(Condition::matches("status", status.to_string()));
		}

		Filter::must(must)
	}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskVectorHit {
	pub task_id: Uuid,
	pub score: f32,
}

pub struct QdrantStore {
	pub client: qdrant_client::Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl QdrantStore {
	pub fn new(cfg: &tasklens_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	/// Nearest task vectors for `vector`, best first. Points without a UUID id are skipped.
	pub async fn search_tasks(
		&self,
		vector: Vec<f32>,
		filter: TaskVectorFilter<'_>,
		limit: u32,
	) -> Result<Vec<TaskVectorHit>> {
		ensure_vector_dim(self.vector_dim, vector.len())?;

		let search = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.using(DENSE_VECTOR_NAME)
			.filter(filter.to_filter())
			.limit(limit as u64)
			.with_payload(false);
		let response = self.client.query(search).await?;
		let hits = response
			.result
			.into_iter()
			.filter_map(|point| {
				let task_id = point.id.as_ref().and_then(point_id_to_uuid)?;

				Some(TaskVectorHit { task_id, score: point.score })
			})
			.collect();

		Ok(hits)
	}
}

fn ensure_vector_dim(expected: u32, actual: usize) -> Result<()> {
	if actual != expected as usize {
		return Err(Error::InvalidArgument(format!(
			"Query vector has {actual} dimensions; the collection expects {expected}."
		)));
	}

	Ok(())
}

fn point_id_to_uuid(point_id: &PointId) -> Option<Uuid> {
	match &point_id.point_id_options {
		Some(PointIdOptions::Uuid(id)) => Uuid::parse_str(id).ok(),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn filter_always_scopes_tenant() {
		let filter =
			TaskVectorFilter { tenant_id: "t1", project_id: None, status: None }.to_filter();

		assert_eq!(filter.must.len(), 1);

		let filter =
			TaskVectorFilter { tenant_id: "t1", project_id: Some("p1"), status: Some("TODO") }
				.to_filter();

		assert_eq!(filter.must.len(), 3);
	}

	#[test]
	fn query_vector_must_match_collection_dimension() {
		assert!(ensure_vector_dim(3, 3).is_ok());
		assert!(matches!(ensure_vector_dim(3, 2), Err(Error::InvalidArgument(_))));
	}

	#[test]
	fn point_ids_must_be_uuids() {
		let id = Uuid::new_v4();
		let uuid_point = PointId { point_id_options: Some(PointIdOptions::Uuid(id.to_string())) };
		let num_point = PointId { point_id_options: Some(PointIdOptions::Num(7)) };

		assert_eq!(point_id_to_uuid(&uuid_point), Some(id));
		assert_eq!(point_id_to_uuid(&num_point), None);
	}
}
